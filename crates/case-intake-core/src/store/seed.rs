//! Default records loaded into an empty store.

use crate::models::{Case, CaseStatus, Partner};

/// The two demo cases, stamped with `submitted_at`.
pub fn seed_cases(submitted_at: &str) -> Vec<Case> {
    vec![
        Case {
            id: "case-1".into(),
            submitted_at: submitted_at.to_string(),
            full_name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            location: None,
            incident_date: None,
            injury_type: "Auto".into(),
            description: "Hit by a car at intersection and suffered whiplash injuries.".into(),
            status: CaseStatus::New,
            analysis: None,
            assigned_partner_id: None,
        },
        Case {
            id: "case-2".into(),
            submitted_at: submitted_at.to_string(),
            full_name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            phone: None,
            location: None,
            incident_date: None,
            injury_type: "Slip & Fall".into(),
            description: "Slipped on wet floor in grocery store and broke arm.".into(),
            status: CaseStatus::New,
            analysis: None,
            assigned_partner_id: None,
        },
    ]
}

/// The three demo partner firms. The last one starts inactive.
pub fn seed_partners() -> Vec<Partner> {
    vec![
        Partner {
            id: "partner-1".into(),
            name: "Auto Experts LLC".into(),
            email: "auto@example.com".into(),
            api_endpoint: None,
            specialties: vec!["Auto".into()],
            coverage: vec!["NY".into(), "NJ".into()],
            capacity: 10,
            active: true,
        },
        Partner {
            id: "partner-2".into(),
            name: "Slip & Fall Pros".into(),
            email: "slip@example.com".into(),
            api_endpoint: None,
            specialties: vec!["Slip & Fall".into()],
            coverage: vec!["CA".into()],
            capacity: 5,
            active: true,
        },
        Partner {
            id: "partner-3".into(),
            name: "General Injury Co".into(),
            email: "injury@example.com".into(),
            api_endpoint: None,
            specialties: vec!["Auto".into(), "Slip & Fall".into()],
            coverage: vec!["TX".into(), "FL".into()],
            capacity: 8,
            active: false,
        },
    ]
}

//! Intake case models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{Analysis, IntakePayload};

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    /// Submitted, not yet analyzed
    New,
    /// Analysis attached
    Analyzed,
    /// Assigned to a partner firm
    Assigned,
    /// Rejected (only reachable by editing stored data)
    Declined,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 4] = [
        CaseStatus::New,
        CaseStatus::Analyzed,
        CaseStatus::Assigned,
        CaseStatus::Declined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::New => "NEW",
            CaseStatus::Analyzed => "ANALYZED",
            CaseStatus::Assigned => "ASSIGNED",
            CaseStatus::Declined => "DECLINED",
        }
    }

    /// Position on the NEW -> ANALYZED -> ASSIGNED ladder.
    /// DECLINED sits off the ladder and ranks with NEW.
    fn rank(&self) -> u8 {
        match self {
            CaseStatus::New | CaseStatus::Declined => 0,
            CaseStatus::Analyzed => 1,
            CaseStatus::Assigned => 2,
        }
    }

    /// Move towards `target`, never backwards.
    pub fn promoted_to(self, target: CaseStatus) -> CaseStatus {
        if target.rank() > self.rank() {
            target
        } else {
            self
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(CaseStatus::New),
            "ANALYZED" => Ok(CaseStatus::Analyzed),
            "ASSIGNED" => Ok(CaseStatus::Assigned),
            "DECLINED" => Ok(CaseStatus::Declined),
            other => Err(format!("Unknown case status: {}", other)),
        }
    }
}

/// One intake submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Unique case ID (`case-<millis>`)
    pub id: String,
    /// Submission time (ISO-8601)
    pub submitted_at: String,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<String>,
    /// Free-text injury category (e.g. "Auto", "Slip & Fall")
    pub injury_type: String,
    pub description: String,
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    /// Partner the case was handed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_partner_id: Option<String>,
}

impl Case {
    /// Build a case from a submitted payload.
    ///
    /// Starts as ANALYZED only when intake analysis is enabled and produced a
    /// result; otherwise NEW so it can be analyzed from the dashboard.
    pub fn from_submission(
        id: String,
        payload: IntakePayload,
        analysis: Option<Analysis>,
        analysis_enabled: bool,
        submitted_at: String,
    ) -> Self {
        let status = if analysis.is_some() && analysis_enabled {
            CaseStatus::Analyzed
        } else {
            CaseStatus::New
        };

        Self {
            id,
            submitted_at,
            full_name: payload.full_name,
            email: payload.email,
            phone: payload.phone,
            location: payload.location,
            incident_date: payload.incident_date,
            injury_type: payload.injury_type,
            description: payload.description,
            status,
            analysis,
            assigned_partner_id: None,
        }
    }

    /// Attach an analysis and promote the status.
    pub fn attach_analysis(&mut self, analysis: Analysis) {
        self.analysis = Some(analysis);
        self.status = self.status.promoted_to(CaseStatus::Analyzed);
    }

    /// Hand the case to a partner.
    pub fn assign_to(&mut self, partner_id: &str) {
        self.assigned_partner_id = Some(partner_id.to_string());
        self.status = self.status.promoted_to(CaseStatus::Assigned);
    }

    pub fn is_assigned_to(&self, partner_id: &str) -> bool {
        self.assigned_partner_id.as_deref() == Some(partner_id)
    }
}

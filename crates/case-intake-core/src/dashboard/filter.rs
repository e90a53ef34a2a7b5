//! Case list filtering for the admin dashboard and the partner view.

use serde::{Deserialize, Serialize};

use crate::models::{Case, CaseStatus, Partner};

/// Admin case list filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    /// Case-insensitive substring of the submitter's full name
    pub search: String,
    pub status: Option<CaseStatus>,
    /// Exact injury type
    pub injury_type: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        let needle = self.search.to_lowercase();
        case.full_name.to_lowercase().contains(&needle)
            && self.status.map_or(true, |s| case.status == s)
            && self
                .injury_type
                .as_deref()
                .map_or(true, |t| case.injury_type == t)
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_none() && self.injury_type.is_none()
    }
}

/// Cases passing `filter`, in store order.
pub fn filter_cases<'a>(cases: &'a [Case], filter: &CaseFilter) -> Vec<&'a Case> {
    cases.iter().filter(|c| filter.matches(c)).collect()
}

/// Distinct injury types, in order of first appearance.
pub fn injury_type_options(cases: &[Case]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for case in cases {
        if !options.iter().any(|o| *o == case.injury_type) {
            options.push(case.injury_type.clone());
        }
    }
    options
}

/// Cases handed to `partner_id`, for the partner view.
pub fn cases_for_partner<'a>(cases: &'a [Case], partner_id: &str) -> Vec<&'a Case> {
    cases.iter().filter(|c| c.is_assigned_to(partner_id)).collect()
}

/// Partner preselected when the assignment dialog opens.
pub fn first_active_partner(partners: &[Partner]) -> Option<&Partner> {
    partners.iter().find(|p| p.active)
}

//! Dashboard counters.

use serde::{Deserialize, Serialize};

use crate::models::{Case, CaseStatus, Partner};

/// Headline numbers shown at the top of the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_new: usize,
    pub total_analyzed: usize,
    pub total_assigned: usize,
    pub active_partners: usize,
}

impl DashboardStats {
    pub fn compute(cases: &[Case], partners: &[Partner]) -> Self {
        let count = |status: CaseStatus| cases.iter().filter(|c| c.status == status).count();

        Self {
            total_new: count(CaseStatus::New),
            total_analyzed: count(CaseStatus::Analyzed),
            total_assigned: count(CaseStatus::Assigned),
            active_partners: partners.iter().filter(|p| p.active).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed_cases, seed_partners};

    #[test]
    fn test_seed_stats() {
        let stats = DashboardStats::compute(&seed_cases("t"), &seed_partners());
        assert_eq!(
            stats,
            DashboardStats {
                total_new: 2,
                total_analyzed: 0,
                total_assigned: 0,
                active_partners: 2,
            }
        );
    }

    #[test]
    fn test_declined_not_counted() {
        let mut cases = seed_cases("t");
        cases[0].status = CaseStatus::Declined;
        cases[1].status = CaseStatus::Assigned;

        let stats = DashboardStats::compute(&cases, &[]);
        assert_eq!(stats.total_new, 0);
        assert_eq!(stats.total_assigned, 1);
        assert_eq!(stats.active_partners, 0);
    }
}

//! Intake payload sent to the remote analyzer.

use serde::{Deserialize, Serialize};

/// Contact and incident details submitted through the public intake form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakePayload {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<String>,
    pub injury_type: String,
    pub description: String,
}

impl IntakePayload {
    /// Seed for the deterministic model when the remote analyzer is unreachable.
    pub fn fallback_seed(&self) -> String {
        format!("{}|{}|{}", self.full_name, self.email, self.injury_type)
    }
}

//! Partner firm models.

use serde::{Deserialize, Deserializer, Serialize};

/// A firm eligible to receive case assignments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// Unique partner ID
    pub id: String,
    /// Firm name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Intake endpoint of the firm's own system, if it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    /// Injury categories the firm handles (duplicates allowed)
    pub specialties: Vec<String>,
    /// Regions the firm covers (duplicates allowed)
    pub coverage: Vec<String>,
    /// Advertised case capacity. Any stored JSON number is accepted;
    /// fractions truncate toward zero.
    #[serde(deserialize_with = "any_number")]
    pub capacity: i64,
    /// Whether the firm is currently accepting cases
    pub active: bool,
}

impl Partner {
    /// Create an active partner with required fields.
    pub fn new(id: String, name: String, email: String) -> Self {
        Self {
            id,
            name,
            email,
            api_endpoint: None,
            specialties: Vec::new(),
            coverage: Vec::new(),
            capacity: 0,
            active: true,
        }
    }

    pub fn handles(&self, injury_type: &str) -> bool {
        self.specialties.iter().any(|s| s == injury_type)
    }

    pub fn covers(&self, region: &str) -> bool {
        self.coverage.iter().any(|c| c == region)
    }
}

fn any_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    Ok(number
        .as_i64()
        .or_else(|| number.as_f64().map(|f| f.trunc() as i64))
        .unwrap_or(0))
}

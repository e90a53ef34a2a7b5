//! "Add Partner" form.

use serde::{Deserialize, Serialize};

use crate::models::Partner;

/// Raw values of the add-partner form. List fields are comma-separated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartnerForm {
    pub name: String,
    pub email: String,
    pub specialties: String,
    pub coverage: String,
    pub capacity: u32,
}

impl PartnerForm {
    /// Build an active partner with the given ID.
    pub fn into_partner(self, id: String) -> Partner {
        Partner {
            id,
            name: self.name,
            email: self.email,
            api_endpoint: None,
            specialties: split_list(&self.specialties),
            coverage: split_list(&self.coverage),
            capacity: i64::from(self.capacity),
            active: true,
        }
    }
}

/// Split on commas, trim, drop blanks. Duplicates are kept.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

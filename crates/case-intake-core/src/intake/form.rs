//! Public intake form and its validation rules.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::IntakePayload;

/// Minimum description length, in characters, after trimming.
pub const MIN_DESCRIPTION_LEN: usize = 20;

pub const FULL_NAME_REQUIRED: &str = "Full name is required";
pub const EMAIL_INVALID: &str = "Valid email is required";
pub const DESCRIPTION_TOO_SHORT: &str = "At least 20 characters required";
pub const CONSENT_REQUIRED: &str = "Consent is required";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"))
}

/// Raw form values as typed by the submitter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub incident_date: String,
    pub injury_type: String,
    pub description: String,
    pub consent: bool,
}

/// Per-field validation messages. A `None` field passed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.description.is_none()
            && self.consent.is_none()
    }

    /// `(field, message)` pairs for every failed field.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("description", &self.description),
            ("consent", &self.consent),
        ]
        .into_iter()
        .filter_map(|(field, message)| message.as_deref().map(|m| (field, m)))
        .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields()
            .into_iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl IntakeForm {
    /// Check required fields. Optional fields never block submission.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if self.full_name.trim().is_empty() {
            errors.full_name = Some(FULL_NAME_REQUIRED.into());
        }
        if self.email.trim().is_empty() || !email_pattern().is_match(&self.email) {
            errors.email = Some(EMAIL_INVALID.into());
        }
        if self.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            errors.description = Some(DESCRIPTION_TOO_SHORT.into());
        }
        if !self.consent {
            errors.consent = Some(CONSENT_REQUIRED.into());
        }

        errors
    }

    /// Payload for the analyzer; empty optional fields become absent.
    pub fn to_payload(&self) -> IntakePayload {
        IntakePayload {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: non_empty(&self.phone),
            location: non_empty(&self.location),
            incident_date: non_empty(&self.incident_date),
            injury_type: self.injury_type.clone(),
            description: self.description.clone(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

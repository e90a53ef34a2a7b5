//! Deterministic stand-in for a real underwriting model.
//!
//! The arithmetic here is fixed: hosts compare scores across installs, so the
//! modulo and thresholds must not drift.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Lowest score the deterministic model can produce.
pub const SCORE_BASE: i64 = 50;
/// Width of the score band (`SCORE_BASE..SCORE_BASE + SCORE_SPREAD`).
pub const SCORE_SPREAD: u64 = 50;
/// Estimated value per score point.
pub const VALUE_PER_POINT: i64 = 1000;
/// Scores strictly above this are high priority.
pub const HIGH_PRIORITY_THRESHOLD: i64 = 80;

/// A scored assessment attached to a case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Score (50..=99 for the deterministic model)
    pub score: i64,
    /// Estimated monetary value
    pub estimated_value: i64,
    /// Risk factor labels
    pub risk_factors: Vec<String>,
    /// Triage recommendation
    pub recommendation: String,
    /// Generation time (ISO-8601)
    pub timestamp: String,
}

impl Analysis {
    /// True when the score is above the high-priority threshold.
    pub fn is_high_priority(&self) -> bool {
        self.score > HIGH_PRIORITY_THRESHOLD
    }
}

/// Format a UTC instant the way persisted records expect (`...T..:..:..sssZ`).
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sum of the character codes of `seed`.
///
/// Characters outside the BMP contribute their leading UTF-16 unit, which keeps
/// scores identical to those produced by the web intake form.
pub fn seed_sum(seed: &str) -> u64 {
    let mut buf = [0u16; 2];
    seed.chars()
        .map(|c| u64::from(c.encode_utf16(&mut buf)[0]))
        .sum()
}

/// Score `seed` using the current time for the timestamp.
pub fn score(seed: &str) -> Analysis {
    score_at(seed, Utc::now())
}

/// Score `seed` with an explicit clock.
pub fn score_at(seed: &str, now: DateTime<Utc>) -> Analysis {
    let score = (seed_sum(seed) % SCORE_SPREAD) as i64 + SCORE_BASE;
    let (risk, recommendation) = if score > HIGH_PRIORITY_THRESHOLD {
        ("Low risk", "High priority")
    } else {
        ("Moderate risk", "Review carefully")
    };

    Analysis {
        score,
        estimated_value: score * VALUE_PER_POINT,
        risk_factors: vec![risk.to_string()],
        recommendation: recommendation.to_string(),
        timestamp: iso_timestamp(now),
    }
}

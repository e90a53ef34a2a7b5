//! Normalization of remote analyzer responses.
//!
//! Upstream analyzers are loosely specified. Every field is optional and is
//! coerced to the expected type; a malformed field degrades the analysis
//! instead of failing it.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::scoring::{iso_timestamp, Analysis};

/// Normalization errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Parse an analyzer response body.
///
/// Fails only when the body is not JSON at all or is JSON `null`, which has no
/// fields to read. Any other value is normalized.
pub fn parse_analysis_response(body: &str, now: DateTime<Utc>) -> AnalysisResult<Analysis> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_null() {
        return Err(AnalysisError::InvalidFormat("response body is null".into()));
    }
    Ok(normalize_response(&value, now))
}

/// Coerce a decoded response into an [`Analysis`].
pub fn normalize_response(value: &Value, now: DateTime<Utc>) -> Analysis {
    let field = |name: &str| value.get(name).filter(|v| !v.is_null());

    let risk_factors = match value.get("riskFactors") {
        Some(Value::Array(items)) => items.iter().map(coerce_string).collect(),
        _ => Vec::new(),
    };

    Analysis {
        score: field("score").map(coerce_integer).unwrap_or(0),
        estimated_value: field("estimatedValue").map(coerce_integer).unwrap_or(0),
        risk_factors,
        recommendation: field("recommendation").map(coerce_string).unwrap_or_default(),
        timestamp: field("timestamp")
            .map(coerce_string)
            .unwrap_or_else(|| iso_timestamp(now)),
    }
}

/// Numbers truncate toward zero; numeric strings parse; booleans are 1/0.
/// Anything else counts as zero.
fn coerce_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return 0;
            }
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .unwrap_or(0)
        }
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

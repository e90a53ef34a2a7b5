/// Integration settings loaded from environment variables.
///
/// Everything is off by default; the store works fully offline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Base URL of the remote analyzer. `None` leaves cases unanalyzed at intake.
    pub api_url: Option<String>,
    /// Call the analyzer during submission.
    pub enable_intake_analysis: bool,
    /// Reserved for moving the store itself behind a remote backend.
    /// Not read by the core.
    pub enable_remote_db: bool,
}

pub const API_URL_VAR: &str = "INTAKE_API_URL";
pub const ENABLE_ANALYSIS_VAR: &str = "INTAKE_ENABLE_ANALYSIS";
pub const ENABLE_REMOTE_DB_VAR: &str = "INTAKE_ENABLE_REMOTE_DB";

impl IntakeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `INTAKE_API_URL`          | unset   |
    /// | `INTAKE_ENABLE_ANALYSIS`  | `false` |
    /// | `INTAKE_ENABLE_REMOTE_DB` | `false` |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load a `.env` file if present, then read the environment.
    pub fn from_dotenv() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Ignoring unreadable .env file");
            }
        }
        Self::from_env()
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            api_url,
            enable_intake_analysis: parse_flag(lookup(ENABLE_ANALYSIS_VAR)),
            enable_remote_db: parse_flag(lookup(ENABLE_REMOTE_DB_VAR)),
        }
    }

    /// Endpoint for `POST` analysis requests, if an API URL is configured.
    pub fn analyze_url(&self) -> Option<String> {
        self.api_url.as_deref().map(|base| {
            let base = base.strip_suffix('/').unwrap_or(base);
            format!("{}/analyze", base)
        })
    }
}

/// Only the literal `true` (any case) enables a flag.
fn parse_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> IntakeConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IntakeConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config, IntakeConfig::default());
        assert!(config.analyze_url().is_none());
    }

    #[test]
    fn test_flags() {
        let config = config(&[
            (ENABLE_ANALYSIS_VAR, "TRUE"),
            (ENABLE_REMOTE_DB_VAR, "yes"),
        ]);
        assert!(config.enable_intake_analysis);
        assert!(!config.enable_remote_db);
    }

    #[test]
    fn test_blank_url_is_unset() {
        assert!(config(&[(API_URL_VAR, "  ")]).api_url.is_none());
    }

    #[test]
    fn test_analyze_url_strips_one_trailing_slash() {
        let config = config(&[(API_URL_VAR, "https://analyzer.example/v1/")]);
        assert_eq!(
            config.analyze_url().as_deref(),
            Some("https://analyzer.example/v1/analyze")
        );

        let config = IntakeConfig {
            api_url: Some("http://localhost:9000".into()),
            ..Default::default()
        };
        assert_eq!(config.analyze_url().as_deref(), Some("http://localhost:9000/analyze"));
    }
}

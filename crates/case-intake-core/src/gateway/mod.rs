//! Optional remote analysis of intake submissions.
//!
//! Wraps the analyzer HTTP endpoint using [`reqwest`]. Failures never reach
//! the submitter: they fall back to the deterministic model and are reported
//! as a tagged reason on the outcome.

mod config;

pub use config::*;

use case_intake_analysis::{parse_analysis_response, score, Analysis, AnalysisError, IntakePayload};
use chrono::Utc;
use tokio_util::sync::CancellationToken;

/// Reasons a remote analysis was replaced by the local fallback.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The analyzer returned a non-2xx status code.
    #[error("Analyzer error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not usable JSON.
    #[error("Invalid analyzer response: {0}")]
    Decode(#[from] AnalysisError),

    /// The caller cancelled the request.
    #[error("Analysis request cancelled")]
    Cancelled,
}

/// What the gateway produced for a submission.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Intake analysis is switched off; nothing was attempted.
    Disabled,
    /// Analysis is on but no analyzer URL is configured.
    Unconfigured,
    /// The analyzer answered.
    Remote(Analysis),
    /// The analyzer call failed; a deterministic analysis stands in.
    Fallback {
        analysis: Analysis,
        reason: GatewayError,
    },
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            AnalysisOutcome::Remote(analysis) | AnalysisOutcome::Fallback { analysis, .. } => {
                Some(analysis)
            }
            AnalysisOutcome::Disabled | AnalysisOutcome::Unconfigured => None,
        }
    }

    pub fn into_analysis(self) -> Option<Analysis> {
        match self {
            AnalysisOutcome::Remote(analysis) | AnalysisOutcome::Fallback { analysis, .. } => {
                Some(analysis)
            }
            AnalysisOutcome::Disabled | AnalysisOutcome::Unconfigured => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback { .. })
    }

    pub fn source(&self) -> AnalysisSource {
        match self {
            AnalysisOutcome::Disabled | AnalysisOutcome::Unconfigured => AnalysisSource::None,
            AnalysisOutcome::Remote(_) => AnalysisSource::Remote,
            AnalysisOutcome::Fallback { .. } => AnalysisSource::Fallback,
        }
    }
}

/// Provenance of an attached analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    None,
    Remote,
    Fallback,
}

/// HTTP client for the remote analyzer.
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    config: IntakeConfig,
}

impl RemoteAnalyzer {
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, config: IntakeConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Analyze a submission.
    ///
    /// Sends a single `POST {api_url}/analyze`. No retries and no timeout;
    /// `cancel` is the only way to stop a pending call.
    pub async fn analyze_intake(
        &self,
        payload: &IntakePayload,
        cancel: Option<&CancellationToken>,
    ) -> AnalysisOutcome {
        if !self.config.enable_intake_analysis {
            return AnalysisOutcome::Disabled;
        }
        let Some(url) = self.config.analyze_url() else {
            tracing::debug!("Intake analysis enabled without an API URL; skipping");
            return AnalysisOutcome::Unconfigured;
        };

        match self.request(&url, payload, cancel).await {
            Ok(analysis) => AnalysisOutcome::Remote(analysis),
            Err(reason) => {
                tracing::warn!(%url, error = %reason, "Remote analysis failed; using local scoring");
                AnalysisOutcome::Fallback {
                    analysis: score(&payload.fallback_seed()),
                    reason,
                }
            }
        }
    }

    async fn request(
        &self,
        url: &str,
        payload: &IntakePayload,
        cancel: Option<&CancellationToken>,
    ) -> Result<Analysis, GatewayError> {
        let call = self.post_analyze(url, payload);
        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(GatewayError::Cancelled),
                result = call => result,
            },
            None => call.await,
        }
    }

    async fn post_analyze(&self, url: &str, payload: &IntakePayload) -> Result<Analysis, GatewayError> {
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(parse_analysis_response(&body, Utc::now())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payload() -> IntakePayload {
        IntakePayload {
            full_name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            location: None,
            incident_date: None,
            injury_type: "Auto".into(),
            description: "Hit by a car at intersection and suffered whiplash.".into(),
        }
    }

    #[tokio::test]
    async fn test_disabled_skips_call() {
        let analyzer = RemoteAnalyzer::new(IntakeConfig {
            api_url: Some("http://127.0.0.1:1".into()),
            enable_intake_analysis: false,
            enable_remote_db: false,
        });
        let outcome = analyzer.analyze_intake(&payload(), None).await;
        assert!(matches!(outcome, AnalysisOutcome::Disabled));
        assert!(outcome.into_analysis().is_none());
    }

    proptest! {
        #[test]
        fn prop_disabled_never_analyzes(
            full_name in ".*",
            email in ".*",
            phone in proptest::option::of(".*"),
            injury_type in ".*",
            description in ".*",
        ) {
            let payload = IntakePayload {
                full_name,
                email,
                phone,
                location: None,
                incident_date: None,
                injury_type,
                description,
            };
            let analyzer = RemoteAnalyzer::new(IntakeConfig {
                api_url: Some("http://127.0.0.1:1".into()),
                enable_intake_analysis: false,
                enable_remote_db: true,
            });

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let outcome = runtime.block_on(analyzer.analyze_intake(&payload, None));
            prop_assert!(matches!(outcome, AnalysisOutcome::Disabled));
            prop_assert_eq!(outcome.source(), AnalysisSource::None);
        }
    }

    #[tokio::test]
    async fn test_enabled_without_url() {
        let analyzer = RemoteAnalyzer::new(IntakeConfig {
            enable_intake_analysis: true,
            ..Default::default()
        });
        let outcome = analyzer.analyze_intake(&payload(), None).await;
        assert!(matches!(outcome, AnalysisOutcome::Unconfigured));
        assert!(outcome.analysis().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_before_send_falls_back() {
        let analyzer = RemoteAnalyzer::new(IntakeConfig {
            api_url: Some("http://127.0.0.1:1".into()),
            enable_intake_analysis: true,
            enable_remote_db: false,
        });
        let token = CancellationToken::new();
        token.cancel();

        let outcome = analyzer.analyze_intake(&payload(), Some(&token)).await;
        match outcome {
            AnalysisOutcome::Fallback { analysis, reason } => {
                assert!(matches!(reason, GatewayError::Cancelled));
                assert_eq!(analysis.score, 76);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }
}

//! Analyzer configuration.

use std::time::Duration;

use courtside_models::ReportModel;

use crate::error::{AnalysisError, AnalysisResult};
use crate::retry::RetryConfig;

/// Readiness polling configuration.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait between status queries
    pub poll_interval: Duration,
    /// Maximum status queries before giving up
    pub max_attempts: u32,
    /// Retry policy for transient status-query failures
    pub status_retry: RetryConfig,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: 60, // ~5 minutes
            status_retry: RetryConfig::new("asset_status"),
        }
    }
}

impl PollConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: std::env::var("COURTSIDE_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(defaults.poll_interval),
            max_attempts: std::env::var("COURTSIDE_POLL_MAX_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_attempts),
            status_retry: RetryConfig::new("asset_status").with_max_retries(
                std::env::var("COURTSIDE_STATUS_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.status_retry.max_retries),
            ),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_status_retry(mut self, status_retry: RetryConfig) -> Self {
        self.status_retry = status_retry;
        self
    }

    /// Upper bound on the time spent sleeping between polls.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval.saturating_mul(self.max_attempts)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.max_attempts == 0 {
            return Err(AnalysisError::config("max_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// Top-level analyzer configuration, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfig {
    pub poll: PollConfig,
    /// Model used when a request does not name one
    pub default_model: ReportModel,
}

impl AnalyzerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            poll: PollConfig::from_env(),
            default_model: std::env::var("GEMINI_MODEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

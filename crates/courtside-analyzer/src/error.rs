//! Analysis error types.

use std::time::Duration;

use courtside_models::AssetId;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Remote processing failed for {asset_id}: {message}")]
    RemoteProcessing { asset_id: AssetId, message: String },

    #[error("Asset {asset_id} not ready after {attempts} polls ({waited:?})")]
    Timeout {
        asset_id: AssetId,
        attempts: u32,
        waited: Duration,
    },

    #[error("Status query failed for {asset_id}: {message}")]
    StatusQuery { asset_id: AssetId, message: String },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable label for logs, metrics and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::Submission(_) => "submission",
            AnalysisError::RemoteProcessing { .. } => "remote_processing",
            AnalysisError::Timeout { .. } => "timeout",
            AnalysisError::StatusQuery { .. } => "status_query",
            AnalysisError::Generation(_) => "generation",
            AnalysisError::Cancelled => "cancelled",
            AnalysisError::Config(_) => "config",
        }
    }

    /// True when the service conclusively rejected the asset.
    ///
    /// A timeout is not conclusive: processing may still finish remotely.
    pub fn is_conclusive(&self) -> bool {
        matches!(self, AnalysisError::RemoteProcessing { .. })
    }
}

//! Seam over the external inference service.

use std::path::Path;

use async_trait::async_trait;
use courtside_models::{AssetId, MediaType, RemoteAsset};
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error reported by an `AssetService` call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Dropped connection, rate limit, 5xx. Worth retrying.
    #[error("transient service error: {0}")]
    Transient(String),

    #[error("service error: {0}")]
    Permanent(String),
}

impl ServiceError {
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::Permanent(msg.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Transient(_))
    }
}

/// The four calls the poller makes against the inference service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetService: Send + Sync {
    /// Upload a local file, returning the service's initial view of it.
    async fn submit(&self, path: &Path, media_type: MediaType) -> ServiceResult<RemoteAsset>;

    /// Refresh the processing state of a submitted asset.
    async fn status(&self, id: &AssetId) -> ServiceResult<RemoteAsset>;

    /// Delete a submitted asset.
    async fn delete(&self, id: &AssetId) -> ServiceResult<()>;

    /// Run a generation request against a ready asset.
    async fn generate(
        &self,
        asset: &RemoteAsset,
        prompt: &str,
        model: &str,
    ) -> ServiceResult<String>;
}

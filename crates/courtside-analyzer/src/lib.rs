//! Referee analysis pipeline.
//!
//! This crate provides:
//! - The `AssetService` seam over the external inference service
//! - `AssetPoller`: submit, wait for readiness, generate, release
//! - `AssetLease`: scoped ownership of a submitted asset
//! - Cooperative cancellation and transient-error retry
//! - Structured logging and metrics for each analysis

pub mod cancel;
pub mod config;
pub mod error;
pub mod gemini;
pub mod lease;
pub mod logging;
pub mod metrics;
pub mod poller;
pub mod retry;
pub mod service;

pub use cancel::CancelToken;
pub use config::{AnalyzerConfig, PollConfig};
pub use error::{AnalysisError, AnalysisResult};
pub use lease::AssetLease;
pub use logging::AnalysisLogger;
pub use poller::{AnalysisRequest, AssetPoller};
pub use retry::RetryConfig;
pub use service::{AssetService, ServiceError, ServiceResult};

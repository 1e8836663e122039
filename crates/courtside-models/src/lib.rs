//! Shared data models for the Courtside backend.
//!
//! This crate provides Serde-serializable types for:
//! - Remote assets held by the inference service and their processing state
//! - Supported media types
//! - Report model selection
//! - Analysis identifiers and finished reports

pub mod asset;
pub mod media;
pub mod model;
pub mod report;

// Re-export common types
pub use asset::{AssetId, AssetState, RemoteAsset};
pub use media::{MediaType, MediaTypeError};
pub use model::{ModelNameError, ReportModel};
pub use report::{AnalysisId, AnalysisReport};

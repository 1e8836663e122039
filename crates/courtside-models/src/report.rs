//! Analysis identifiers and finished reports.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{AssetId, ReportModel};

/// Unique identifier for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnalysisId(pub String);

impl AnalysisId {
    /// Generate a new random analysis ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Referee report produced by a successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub analysis_id: AnalysisId,
    /// Remote asset the report was generated from (already released)
    pub asset_id: AssetId,
    #[schemars(with = "String")]
    pub model: ReportModel,
    /// Generated report text
    pub text: String,
    /// Status queries issued while waiting for readiness
    pub polls: u32,
    pub elapsed_ms: u64,
    pub created_at: DateTime<Utc>,
}

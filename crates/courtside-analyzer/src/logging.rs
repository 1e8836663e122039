//! Structured logging for one analysis run.
//!
//! Every event carries the analysis id and operation so a run can be
//! followed across upload, polling, generation and release.

use courtside_models::AnalysisId;
use tracing::{error, info, Span};

/// Logger bound to a single analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: AnalysisId,
    operation: &'static str,
}

impl AnalysisLogger {
    pub fn new(analysis_id: &AnalysisId, operation: &'static str) -> Self {
        Self {
            analysis_id: analysis_id.clone(),
            operation,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = self.operation,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = self.operation,
            "Analysis progress: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            operation = self.operation,
            "Analysis failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = self.operation,
            "Analysis completed: {}", message
        );
    }

    /// Span wrapping the whole run; poller and lease events nest inside it.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            operation = self.operation
        )
    }
}

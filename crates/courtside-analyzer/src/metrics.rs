//! Metrics for the analysis pipeline.
//!
//! Recording is a no-op until the embedding application installs a recorder.

use courtside_models::AssetState;
use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const POLLS_TOTAL: &str = "courtside_polls_total";
    pub const ANALYSES_TOTAL: &str = "courtside_analyses_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "courtside_analysis_duration_seconds";
    pub const RELEASE_FAILURES_TOTAL: &str = "courtside_release_failures_total";
}

/// Record one status query and the state it returned.
pub fn record_poll(state: AssetState) {
    counter!(names::POLLS_TOTAL, "state" => state.as_str()).increment(1);
}

/// Record a finished analysis; `outcome` is `success` or an error kind.
pub fn record_analysis(outcome: &'static str, duration_secs: f64) {
    counter!(names::ANALYSES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::ANALYSIS_DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
}

pub fn record_release_failure() {
    counter!(names::RELEASE_FAILURES_TOTAL).increment(1);
}

//! Asset readiness poller.
//!
//! Drives one remote asset through its lifecycle:
//!
//! ```text
//! acquire ──▶ await_ready ──▶ generate
//!    │        Pending ↺ (bounded by max_attempts)
//!    │        Failed  ──▶ RemoteProcessing
//!    │        Active  ──▶ generate
//!    └──────────── release on every exit path ────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use courtside_models::{
    AnalysisId, AnalysisReport, AssetId, AssetState, MediaType, RemoteAsset, ReportModel,
};
use tracing::{debug, info, warn, Instrument};

use crate::cancel::CancelToken;
use crate::config::PollConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::lease::AssetLease;
use crate::logging::AnalysisLogger;
use crate::metrics;
use crate::retry::{retry_async, RetryResult};
use crate::service::{AssetService, ServiceError};

/// One referee-analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Local video file
    pub path: PathBuf,
    /// Inferred from the file extension when absent
    pub media_type: Option<MediaType>,
    pub prompt: String,
    pub model: ReportModel,
}

impl AnalysisRequest {
    pub fn new(path: impl Into<PathBuf>, prompt: impl Into<String>, model: ReportModel) -> Self {
        Self {
            path: path.into(),
            media_type: None,
            prompt: prompt.into(),
            model,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    fn resolve_media_type(&self) -> AnalysisResult<MediaType> {
        match self.media_type {
            Some(media_type) => Ok(media_type),
            None => MediaType::from_path(&self.path)
                .map_err(|e| AnalysisError::invalid_input(e.to_string())),
        }
    }
}

/// Submits media to the inference service and waits for it to become usable.
pub struct AssetPoller {
    service: Arc<dyn AssetService>,
    config: PollConfig,
}

impl AssetPoller {
    /// Create a poller that owns `service`.
    pub fn new<S: AssetService + 'static>(service: S, config: PollConfig) -> AnalysisResult<Self> {
        Self::from_arc(Arc::new(service), config)
    }

    /// Create a poller from a shared service handle.
    pub fn from_arc(service: Arc<dyn AssetService>, config: PollConfig) -> AnalysisResult<Self> {
        config.validate()?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Validate a local file and submit it.
    ///
    /// Missing, non-regular and empty files are rejected before the service
    /// is contacted.
    pub async fn acquire(&self, path: &Path, media_type: MediaType) -> AnalysisResult<AssetLease> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            AnalysisError::invalid_input(format!("Cannot read {}: {}", path.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(AnalysisError::invalid_input(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(AnalysisError::invalid_input(format!(
                "{} is empty",
                path.display()
            )));
        }

        debug!(
            "Submitting {} ({} bytes, {})",
            path.display(),
            metadata.len(),
            media_type
        );

        let asset = self
            .service
            .submit(path, media_type)
            .await
            .map_err(|e| AnalysisError::submission(e.to_string()))?;

        if asset.id.is_empty() {
            return Err(AnalysisError::submission(
                "Service returned an empty asset identifier",
            ));
        }

        info!(asset_id = %asset.id, state = %asset.state, "Submitted {}", path.display());
        Ok(AssetLease::new(asset, Arc::clone(&self.service)))
    }

    /// Poll until the leased asset is ready, using the configured bound.
    pub async fn await_ready(
        &self,
        lease: &mut AssetLease,
        cancel: &CancelToken,
    ) -> AnalysisResult<RemoteAsset> {
        self.await_ready_with(
            lease,
            self.config.poll_interval,
            self.config.max_attempts,
            cancel,
        )
        .await
    }

    /// Poll until the leased asset is ready.
    ///
    /// Sleeps `poll_interval` before each of at most `max_attempts` status
    /// queries. An asset already terminal at submission is not polled.
    pub async fn await_ready_with(
        &self,
        lease: &mut AssetLease,
        poll_interval: Duration,
        max_attempts: u32,
        cancel: &CancelToken,
    ) -> AnalysisResult<RemoteAsset> {
        if max_attempts == 0 {
            return Err(AnalysisError::config("max_attempts must be at least 1"));
        }

        if lease.asset().state.is_terminal() {
            return settle(lease.asset());
        }

        let started = Instant::now();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            }

            // A hung status request or retry backoff must not outlive a cancel.
            let refreshed = tokio::select! {
                refreshed = self.query_status(lease.id()) => refreshed?,
                _ = cancel.cancelled() => return Err(AnalysisError::Cancelled),
            };
            lease.record_poll(refreshed);

            let asset = lease.asset();
            metrics::record_poll(asset.state);
            debug!(
                asset_id = %asset.id,
                attempt,
                max_attempts,
                state = %asset.state,
                "Polled asset status"
            );

            if asset.state.is_terminal() {
                if asset.state == AssetState::Active {
                    info!(
                        asset_id = %asset.id,
                        polls = attempt,
                        "Asset ready after {:?}",
                        started.elapsed()
                    );
                }
                return settle(asset);
            }
        }

        Err(AnalysisError::Timeout {
            asset_id: lease.id().clone(),
            attempts: max_attempts,
            waited: started.elapsed(),
        })
    }

    /// Run a generation request against a ready asset. Never retried.
    pub async fn generate(
        &self,
        asset: &RemoteAsset,
        prompt: &str,
        model: &ReportModel,
    ) -> AnalysisResult<String> {
        if prompt.trim().is_empty() {
            return Err(AnalysisError::invalid_input("Prompt must not be empty"));
        }

        debug!(asset_id = %asset.id, model = %model, "Requesting generation");
        self.service
            .generate(asset, prompt, model.as_str())
            .await
            .map_err(|e| AnalysisError::generation(e.to_string()))
    }

    /// Best-effort deletion of the leased asset. Never fails.
    pub async fn release(&self, lease: &mut AssetLease) {
        lease.release().await;
    }

    /// Analyze a video end to end.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AnalysisReport> {
        self.analyze_with_cancel(request, &CancelToken::new()).await
    }

    /// Analyze a video end to end, stopping early if `cancel` fires.
    ///
    /// The remote asset is released exactly once on every path after a
    /// successful `acquire`; the release outcome never replaces the result.
    pub async fn analyze_with_cancel(
        &self,
        request: &AnalysisRequest,
        cancel: &CancelToken,
    ) -> AnalysisResult<AnalysisReport> {
        let analysis_id = AnalysisId::new();
        let logger = AnalysisLogger::new(&analysis_id, "referee_report");
        let span = logger.create_span();
        let started = Instant::now();

        let result = self
            .run(&analysis_id, &logger, request, cancel, started)
            .instrument(span)
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        metrics::record_analysis(outcome, started.elapsed().as_secs_f64());
        result
    }

    async fn run(
        &self,
        analysis_id: &AnalysisId,
        logger: &AnalysisLogger,
        request: &AnalysisRequest,
        cancel: &CancelToken,
        started: Instant,
    ) -> AnalysisResult<AnalysisReport> {
        logger.log_start(&format!("{} with {}", request.path.display(), request.model));

        let media_type = request.resolve_media_type()?;
        if request.prompt.trim().is_empty() {
            return Err(AnalysisError::invalid_input("Prompt must not be empty"));
        }
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let mut lease = self.acquire(&request.path, media_type).await.map_err(|e| {
            logger.log_error(&e.to_string());
            e
        })?;

        let outcome = self.ready_and_generate(&mut lease, request, cancel, logger).await;
        self.release(&mut lease).await;

        match outcome {
            Ok(text) => {
                let elapsed = started.elapsed();
                logger.log_completion(&format!(
                    "{} chars after {} polls in {:?}",
                    text.len(),
                    lease.polls(),
                    elapsed
                ));
                Ok(AnalysisReport {
                    analysis_id: analysis_id.clone(),
                    asset_id: lease.id().clone(),
                    model: request.model.clone(),
                    text,
                    polls: lease.polls(),
                    elapsed_ms: elapsed.as_millis() as u64,
                    created_at: Utc::now(),
                })
            }
            Err(e) => {
                logger.log_error(&format!("{} ({})", e, e.kind()));
                Err(e)
            }
        }
    }

    async fn ready_and_generate(
        &self,
        lease: &mut AssetLease,
        request: &AnalysisRequest,
        cancel: &CancelToken,
        logger: &AnalysisLogger,
    ) -> AnalysisResult<String> {
        logger.log_progress(&format!("waiting for {}", lease.id()));
        let ready = self.await_ready(lease, cancel).await?;

        logger.log_progress(&format!("generating report with {}", request.model));
        tokio::select! {
            text = self.generate(&ready, &request.prompt, &request.model) => text,
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled),
        }
    }

    /// Status query with bounded retry for transient transport failures.
    async fn query_status(&self, id: &AssetId) -> AnalysisResult<RemoteAsset> {
        let result = retry_async(
            &self.config.status_retry,
            || self.service.status(id),
            ServiceError::is_transient,
        )
        .await;

        match result {
            RetryResult::Success(asset) => Ok(asset),
            RetryResult::Failed { error, attempts } => {
                warn!(asset_id = %id, attempts, "Status query failed: {}", error);
                Err(AnalysisError::StatusQuery {
                    asset_id: id.clone(),
                    message: format!("{} (after {} attempts)", error, attempts),
                })
            }
        }
    }
}

/// Outcome for an asset the service has finished with.
fn settle(asset: &RemoteAsset) -> AnalysisResult<RemoteAsset> {
    match asset.state {
        AssetState::Failed => Err(AnalysisError::RemoteProcessing {
            asset_id: asset.id.clone(),
            message: asset
                .error
                .clone()
                .unwrap_or_else(|| "service reported FAILED".to_string()),
        }),
        _ => Ok(asset.clone()),
    }
}

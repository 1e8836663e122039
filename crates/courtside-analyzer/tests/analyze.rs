//! End-to-end tests for the analysis pipeline against a scripted service.

use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courtside_analyzer::{
    AnalysisError, AnalysisRequest, AssetPoller, AssetService, CancelToken, PollConfig,
    RetryConfig, ServiceError, ServiceResult,
};
use courtside_models::{AssetId, AssetState, MediaType, RemoteAsset, ReportModel};

const ASSET_NAME: &str = "files/referee-clip";

/// Scripted service that records every call.
struct FakeService {
    initial_state: AssetState,
    statuses: Mutex<VecDeque<ServiceResult<AssetState>>>,
    generation: ServiceResult<String>,
    delete_fails: bool,
    status_hangs: bool,
    submit_calls: AtomicU32,
    status_calls: AtomicU32,
    generate_calls: AtomicU32,
    deleted: Mutex<Vec<AssetId>>,
}

impl FakeService {
    fn new(statuses: Vec<ServiceResult<AssetState>>) -> Self {
        Self {
            initial_state: AssetState::Pending,
            statuses: Mutex::new(statuses.into()),
            generation: Ok("Report: CC at 01:23".to_string()),
            delete_fails: false,
            status_hangs: false,
            submit_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            generate_calls: AtomicU32::new(0),
            deleted: Mutex::new(Vec::new()),
        }
    }

    fn states(states: &[AssetState]) -> Self {
        Self::new(states.iter().copied().map(Ok).collect())
    }

    fn with_generation(mut self, generation: ServiceResult<String>) -> Self {
        self.generation = generation;
        self
    }

    fn with_failing_delete(mut self) -> Self {
        self.delete_fails = true;
        self
    }

    fn with_hanging_status(mut self) -> Self {
        self.status_hangs = true;
        self
    }

    fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn generate_calls(&self) -> u32 {
        self.generate_calls.load(Ordering::SeqCst)
    }

    fn deleted(&self) -> Vec<AssetId> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetService for FakeService {
    async fn submit(&self, _path: &Path, media_type: MediaType) -> ServiceResult<RemoteAsset> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(RemoteAsset::new(
            AssetId::from_string(ASSET_NAME),
            self.initial_state,
            media_type.mime_type(),
        ))
    }

    async fn status(&self, id: &AssetId) -> ServiceResult<RemoteAsset> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_hangs {
            std::future::pending::<()>().await;
        }
        // Once the script runs out the asset stays pending.
        let next = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(AssetState::Pending));

        next.map(|state| {
            let asset = RemoteAsset::new(id.clone(), state, "video/mp4");
            if state == AssetState::Failed {
                asset.with_error("video could not be decoded")
            } else {
                asset
            }
        })
    }

    async fn delete(&self, id: &AssetId) -> ServiceResult<()> {
        self.deleted.lock().unwrap().push(id.clone());
        if self.delete_fails {
            return Err(ServiceError::permanent("delete rejected"));
        }
        Ok(())
    }

    async fn generate(
        &self,
        asset: &RemoteAsset,
        _prompt: &str,
        _model: &str,
    ) -> ServiceResult<String> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(asset.state, AssetState::Active, "generation requires a ready asset");
        self.generation.clone()
    }
}

fn config(max_attempts: u32) -> PollConfig {
    PollConfig::default()
        .with_poll_interval(Duration::from_millis(1))
        .with_max_attempts(max_attempts)
        .with_status_retry(
            RetryConfig::new("asset_status")
                .with_max_retries(2)
                .with_base_delay(Duration::from_millis(1)),
        )
}

fn poller(service: &Arc<FakeService>, max_attempts: u32) -> AssetPoller {
    AssetPoller::from_arc(service.clone(), config(max_attempts)).unwrap()
}

fn video_file(len: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
    file.write_all(&vec![7u8; len]).unwrap();
    file
}

fn request(file: &tempfile::NamedTempFile) -> AnalysisRequest {
    AnalysisRequest::new(file.path(), "Grade the officials", ReportModel::Gemini25Flash)
}

#[tokio::test]
async fn acquire_returns_non_empty_identifier() {
    let service = Arc::new(FakeService::states(&[]));
    let poller = poller(&service, 3);
    let file = video_file(1024);

    let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    assert!(!lease.id().is_empty());
    assert_eq!(service.submit_calls(), 1);

    poller.release(&mut lease).await;
}

#[tokio::test]
async fn ready_after_exactly_three_polls() {
    use AssetState::*;
    let service = Arc::new(FakeService::states(&[Pending, Pending, Active, Failed]));
    let poller = poller(&service, 10);
    let file = video_file(1024);

    let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    let ready = poller.await_ready(&mut lease, &CancelToken::new()).await.unwrap();

    assert_eq!(ready.state, Active);
    assert_eq!(service.status_calls(), 3);
    assert_eq!(lease.polls(), 3);

    poller.release(&mut lease).await;
}

#[tokio::test]
async fn failed_state_stops_polling_at_its_position() {
    for position in 1..=4usize {
        let mut script = vec![AssetState::Pending; position - 1];
        script.push(AssetState::Failed);
        script.push(AssetState::Active);

        let service = Arc::new(FakeService::states(&script));
        let poller = poller(&service, 10);
        let file = video_file(1024);

        let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
        let err = poller
            .await_ready(&mut lease, &CancelToken::new())
            .await
            .unwrap_err();

        assert!(
            matches!(err, AnalysisError::RemoteProcessing { .. }),
            "position {}: {:?}",
            position,
            err
        );
        assert_eq!(service.status_calls() as usize, position);

        poller.release(&mut lease).await;
    }
}

#[tokio::test]
async fn timeout_at_exactly_max_attempts() {
    let service = Arc::new(FakeService::states(&[]));
    let poller = poller(&service, 4);
    let file = video_file(1024);

    let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    let err = poller
        .await_ready(&mut lease, &CancelToken::new())
        .await
        .unwrap_err();

    match &err {
        AnalysisError::Timeout { attempts, asset_id, .. } => {
            assert_eq!(*attempts, 4);
            assert_eq!(asset_id.as_str(), ASSET_NAME);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert!(!err.is_conclusive());
    assert_eq!(service.status_calls(), 4);

    poller.release(&mut lease).await;
}

#[tokio::test]
async fn explicit_bound_overrides_config() {
    let service = Arc::new(FakeService::states(&[]));
    let poller = poller(&service, 60);
    let file = video_file(1024);

    let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    let err = poller
        .await_ready_with(&mut lease, Duration::from_millis(1), 2, &CancelToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Timeout { attempts: 2, .. }));
    assert_eq!(service.status_calls(), 2);

    poller.release(&mut lease).await;
}

#[tokio::test]
async fn transient_status_errors_do_not_consume_attempts() {
    let service = Arc::new(FakeService::new(vec![
        Err(ServiceError::transient("connection reset")),
        Ok(AssetState::Pending),
        Err(ServiceError::transient("503")),
        Err(ServiceError::transient("503")),
        Ok(AssetState::Active),
    ]));
    let poller = poller(&service, 2);
    let file = video_file(1024);

    let mut lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    let ready = poller.await_ready(&mut lease, &CancelToken::new()).await.unwrap();

    assert_eq!(ready.state, AssetState::Active);
    assert_eq!(lease.polls(), 2);
    assert_eq!(service.status_calls(), 5);

    poller.release(&mut lease).await;
}

#[tokio::test]
async fn release_once_on_every_exit_path() {
    use AssetState::*;

    let cases: Vec<(&str, FakeService, u32)> = vec![
        ("success", FakeService::states(&[Pending, Active]), 5),
        ("remote_processing", FakeService::states(&[Pending, Failed]), 5),
        ("timeout", FakeService::states(&[]), 3),
        (
            "generation",
            FakeService::states(&[Active])
                .with_generation(Err(ServiceError::permanent("model overloaded"))),
            5,
        ),
        (
            "status_query",
            FakeService::new(vec![Err(ServiceError::permanent("401 unauthorized"))]),
            5,
        ),
    ];

    for (expected, service, max_attempts) in cases {
        let service = Arc::new(service);
        let poller = poller(&service, max_attempts);
        let file = video_file(2048);

        let outcome = match poller.analyze(&request(&file)).await {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };

        assert_eq!(outcome, expected);
        assert_eq!(
            service.deleted(),
            vec![AssetId::from_string(ASSET_NAME)],
            "{} should release exactly once",
            expected
        );
    }
}

#[tokio::test]
async fn generation_failure_is_not_retried() {
    let service = Arc::new(
        FakeService::states(&[AssetState::Active])
            .with_generation(Err(ServiceError::transient("socket closed"))),
    );
    let poller = poller(&service, 5);
    let file = video_file(2048);

    let err = poller.analyze(&request(&file)).await.unwrap_err();

    assert!(matches!(err, AnalysisError::Generation(_)));
    assert_eq!(service.generate_calls(), 1);
    assert_eq!(service.deleted().len(), 1);
}

#[tokio::test]
async fn release_failure_does_not_mask_success() {
    let service = Arc::new(
        FakeService::states(&[AssetState::Pending, AssetState::Active]).with_failing_delete(),
    );
    let poller = poller(&service, 5);
    let file = video_file(2048);

    let report = poller.analyze(&request(&file)).await.unwrap();

    assert_eq!(report.text, "Report: CC at 01:23");
    assert_eq!(service.deleted().len(), 1);
}

#[tokio::test]
async fn release_failure_does_not_mask_error() {
    let service = Arc::new(
        FakeService::states(&[AssetState::Failed]).with_failing_delete(),
    );
    let poller = poller(&service, 5);
    let file = video_file(2048);

    let err = poller.analyze(&request(&file)).await.unwrap_err();

    assert!(matches!(err, AnalysisError::RemoteProcessing { .. }));
    assert_eq!(service.deleted().len(), 1);
}

#[tokio::test]
async fn empty_file_rejected_before_submission() {
    let service = Arc::new(FakeService::states(&[AssetState::Active]));
    let poller = poller(&service, 5);
    let file = video_file(0);

    let err = poller.analyze(&request(&file)).await.unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidInput(_)));
    assert_eq!(service.submit_calls(), 0);
    assert!(service.deleted().is_empty());
}

#[tokio::test]
async fn missing_file_rejected_before_submission() {
    let service = Arc::new(FakeService::states(&[AssetState::Active]));
    let poller = poller(&service, 5);
    let dir = tempfile::tempdir().unwrap();

    let missing = AnalysisRequest::new(
        dir.path().join("missing.mp4"),
        "Grade the officials",
        ReportModel::Gemini25Pro,
    );
    let err = poller.analyze(&missing).await.unwrap_err();

    assert!(matches!(err, AnalysisError::InvalidInput(_)));
    assert_eq!(service.submit_calls(), 0);
}

#[tokio::test]
async fn cancellation_during_polling_releases_asset() {
    let service = Arc::new(FakeService::states(&[]));
    let poller = AssetPoller::from_arc(
        service.clone(),
        config(10_000).with_poll_interval(Duration::from_millis(5)),
    )
    .unwrap();
    let file = video_file(2048);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let err = poller
        .analyze_with_cancel(&request(&file), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Cancelled));
    assert!(service.status_calls() < 10_000);
    assert_eq!(service.deleted().len(), 1);
}

#[tokio::test]
async fn cancellation_interrupts_hung_status_query() {
    let service = Arc::new(FakeService::states(&[]).with_hanging_status());
    let poller = poller(&service, 5);
    let file = video_file(2048);
    let cancel = CancelToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        poller.analyze_with_cancel(&request(&file), &cancel),
    )
    .await
    .expect("cancel should interrupt the status query")
    .unwrap_err();

    assert!(matches!(err, AnalysisError::Cancelled));
    assert_eq!(service.status_calls(), 1);
    assert_eq!(service.deleted(), vec![AssetId::from_string(ASSET_NAME)]);
}

#[tokio::test]
async fn cancelled_before_start_submits_nothing() {
    let service = Arc::new(FakeService::states(&[AssetState::Active]));
    let poller = poller(&service, 5);
    let file = video_file(2048);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = poller
        .analyze_with_cancel(&request(&file), &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Cancelled));
    assert_eq!(service.submit_calls(), 0);
}

#[tokio::test]
async fn dropped_lease_is_released_in_background() {
    let service = Arc::new(FakeService::states(&[]));
    let poller = poller(&service, 5);
    let file = video_file(1024);

    let lease = poller.acquire(file.path(), MediaType::Mp4).await.unwrap();
    drop(lease);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(service.deleted(), vec![AssetId::from_string(ASSET_NAME)]);
}

#[tokio::test]
async fn end_to_end_referee_report() {
    let service = Arc::new(FakeService::states(&[AssetState::Pending, AssetState::Active]));
    let poller = poller(&service, 60);
    let file = video_file(500 * 1024);

    let report = poller.analyze(&request(&file)).await.unwrap();

    assert_eq!(report.text, "Report: CC at 01:23");
    assert_eq!(report.asset_id.as_str(), ASSET_NAME);
    assert_eq!(report.model, ReportModel::Gemini25Flash);
    assert_eq!(report.polls, 2);
    assert_eq!(service.deleted(), vec![AssetId::from_string(ASSET_NAME)]);
}

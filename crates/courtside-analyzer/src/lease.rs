//! Scoped ownership of a submitted asset.

use std::sync::Arc;

use courtside_models::{AssetId, RemoteAsset};
use tracing::{debug, warn};

use crate::metrics;
use crate::service::AssetService;

/// Exclusive handle on a remote asset between `acquire` and `release`.
///
/// `release` deletes the remote copy at most once. A lease dropped without
/// being released schedules the deletion on the current Tokio runtime.
pub struct AssetLease {
    asset: RemoteAsset,
    service: Arc<dyn AssetService>,
    polls: u32,
    released: bool,
}

impl AssetLease {
    pub(crate) fn new(asset: RemoteAsset, service: Arc<dyn AssetService>) -> Self {
        Self {
            asset,
            service,
            polls: 0,
            released: false,
        }
    }

    pub fn asset(&self) -> &RemoteAsset {
        &self.asset
    }

    pub fn id(&self) -> &AssetId {
        &self.asset.id
    }

    /// Status queries recorded against this lease.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Store a refreshed view of the asset from a status query.
    pub(crate) fn record_poll(&mut self, mut refreshed: RemoteAsset) {
        self.polls += 1;

        // Status responses may omit fields the submission returned.
        if refreshed.id.is_empty() {
            refreshed.id = self.asset.id.clone();
        }
        if refreshed.mime_type.is_empty() {
            refreshed.mime_type = self.asset.mime_type.clone();
        }
        if refreshed.uri.is_none() {
            refreshed.uri = self.asset.uri.clone();
        }
        self.asset = refreshed;
    }

    /// Best-effort deletion of the remote asset.
    ///
    /// Returns `true` if this call deleted the asset. Deletion errors are
    /// logged and swallowed; later calls are no-ops.
    pub async fn release(&mut self) -> bool {
        if self.released {
            debug!(asset_id = %self.asset.id, "Asset already released");
            return false;
        }
        self.released = true;

        match self.service.delete(&self.asset.id).await {
            Ok(()) => {
                debug!(asset_id = %self.asset.id, "Released remote asset");
                true
            }
            Err(e) => {
                metrics::record_release_failure();
                warn!(asset_id = %self.asset.id, "Failed to release remote asset: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Debug for AssetLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLease")
            .field("asset", &self.asset)
            .field("polls", &self.polls)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for AssetLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let id = self.asset.id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(
                    asset_id = %id,
                    "Asset lease dropped without release, deleting in background"
                );
                let service = Arc::clone(&self.service);
                handle.spawn(async move {
                    if let Err(e) = service.delete(&id).await {
                        metrics::record_release_failure();
                        warn!(asset_id = %id, "Background release failed: {}", e);
                    }
                });
            }
            Err(_) => {
                warn!(asset_id = %id, "Asset lease dropped outside a runtime, remote asset leaked");
            }
        }
    }
}

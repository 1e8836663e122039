//! `AssetService` backed by the Gemini Files API.

use std::path::Path;

use async_trait::async_trait;
use courtside_gemini::{FileResource, GeminiClient, GeminiError};
use courtside_models::{AssetId, AssetState, MediaType, RemoteAsset};

use crate::service::{AssetService, ServiceError, ServiceResult};

impl From<GeminiError> for ServiceError {
    fn from(err: GeminiError) -> Self {
        if err.is_retryable() {
            ServiceError::Transient(err.to_string())
        } else {
            ServiceError::Permanent(err.to_string())
        }
    }
}

/// Convert a Files API resource into the shared asset model.
pub fn to_remote_asset(file: FileResource, fallback_mime: &str) -> RemoteAsset {
    let state = AssetState::from_service_state(file.state.as_str());
    let size_bytes = file.size_bytes();
    RemoteAsset {
        id: AssetId::from_string(file.name),
        state,
        uri: file.uri,
        mime_type: file.mime_type.unwrap_or_else(|| fallback_mime.to_string()),
        display_name: file.display_name,
        size_bytes,
        error: file
            .error
            .map(|e| e.message)
            .filter(|m| !m.is_empty()),
    }
}

#[async_trait]
impl AssetService for GeminiClient {
    async fn submit(&self, path: &Path, media_type: MediaType) -> ServiceResult<RemoteAsset> {
        let file = self.upload_file(path, media_type.mime_type()).await?;
        Ok(to_remote_asset(file, media_type.mime_type()))
    }

    async fn status(&self, id: &AssetId) -> ServiceResult<RemoteAsset> {
        let file = self.get_file(id.as_str()).await?;
        Ok(to_remote_asset(file, ""))
    }

    async fn delete(&self, id: &AssetId) -> ServiceResult<()> {
        self.delete_file(id.as_str()).await?;
        Ok(())
    }

    async fn generate(
        &self,
        asset: &RemoteAsset,
        prompt: &str,
        model: &str,
    ) -> ServiceResult<String> {
        let text = self
            .generate_content(model, asset.reference(), &asset.mime_type, prompt)
            .await?;
        Ok(text)
    }
}

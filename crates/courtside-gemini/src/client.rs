//! Gemini HTTP client.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Body, Client, Response, StatusCode};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::error::{GeminiError, GeminiResult};
use crate::types::{
    ApiErrorEnvelope, Content, FileData, FileResource, GenerateContentRequest,
    GenerateContentResponse, Part, UploadMetadata, UploadResponse, UploadStartRequest,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Base URL for file metadata and generation calls
    pub base_url: String,
    /// Base URL for the resumable upload endpoint
    pub upload_base_url: String,
    /// Per-request timeout (uploads included)
    pub timeout: Duration,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("upload_base_url", &self.upload_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a config for the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300), // 5 minutes for large uploads
        }
    }

    /// Point both the API and upload endpoints at `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        self.upload_base_url = base_url.clone();
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GeminiError::config("GEMINI_API_KEY not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Client for the Gemini Files and generation APIs.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiError::config("API key must not be empty"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeminiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GeminiResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Upload a local file using the resumable upload protocol.
    ///
    /// The file is streamed from disk, never buffered whole.
    pub async fn upload_file(&self, path: &Path, mime_type: &str) -> GeminiResult<FileResource> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        debug!(
            "Starting upload of {} ({} bytes, {})",
            path.display(),
            len,
            mime_type
        );

        let start_url = format!("{}/upload/v1beta/files", self.config.upload_base_url);
        let response = self
            .http
            .post(&start_url)
            .query(&[("key", self.config.api_key.as_str())])
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", len.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadMetadata { display_name },
            })
            .send()
            .await?;
        let response = check_status(response).await?;

        let upload_url = response
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| GeminiError::invalid_response("Upload start returned no upload URL"))?;

        let response = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(CONTENT_LENGTH, len)
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        let response = check_status(response).await?;

        let uploaded: UploadResponse = response.json().await?;
        info!(
            "Uploaded {} as {} (state {})",
            path.display(),
            uploaded.file.name,
            uploaded.file.state.as_str()
        );
        Ok(uploaded.file)
    }

    /// Fetch the current metadata of an uploaded file.
    pub async fn get_file(&self, name: &str) -> GeminiResult<FileResource> {
        let url = self.file_url(name)?;
        let response = self
            .http
            .get(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;
        let response = check_status(response).await?;

        let file: FileResource = response.json().await?;
        debug!("File {} is {}", file.name, file.state.as_str());
        Ok(file)
    }

    /// Delete an uploaded file. A file that no longer exists counts as deleted.
    pub async fn delete_file(&self, name: &str) -> GeminiResult<()> {
        let url = self.file_url(name)?;
        let response = self
            .http
            .delete(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("File {} already gone", name);
            return Ok(());
        }
        check_status(response).await?;

        debug!("Deleted file {}", name);
        Ok(())
    }

    /// Generate text from an uploaded file and a prompt.
    pub async fn generate_content(
        &self,
        model: &str,
        file_uri: &str,
        mime_type: &str,
        prompt: &str,
    ) -> GeminiResult<String> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::File {
                        file_data: FileData {
                            mime_type: mime_type.to_string(),
                            file_uri: file_uri.to_string(),
                        },
                    },
                    Part::Text {
                        text: prompt.to_string(),
                    },
                ],
            }],
        };

        debug!("Sending generateContent request to model {}", model);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body: GenerateContentResponse = response.json().await?;
        extract_text(body)
    }

    fn file_url(&self, name: &str) -> GeminiResult<String> {
        let name = name.trim().trim_start_matches('/');
        if name.is_empty() {
            return Err(GeminiError::config("File name must not be empty"));
        }
        Ok(format!("{}/v1beta/{}", self.config.base_url, name))
    }
}

/// Turn a non-success response into `GeminiError::Api`.
async fn check_status(response: Response) -> GeminiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    Err(GeminiError::Api { status, message })
}

fn extract_text(body: GenerateContentResponse) -> GeminiResult<String> {
    if let Some(reason) = body
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(GeminiError::invalid_response(format!(
            "Prompt was blocked: {}",
            reason
        )));
    }

    let candidate = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GeminiError::invalid_response("No candidates in Gemini response"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GeminiError::invalid_response(format!(
            "No text in Gemini response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

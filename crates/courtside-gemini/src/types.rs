//! Gemini API request/response types.

use serde::{Deserialize, Serialize};

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    /// Forward compatibility with states added later
    #[serde(other)]
    Unknown,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::StateUnspecified => "STATE_UNSPECIFIED",
            FileState::Processing => "PROCESSING",
            FileState::Active => "ACTIVE",
            FileState::Failed => "FAILED",
            FileState::Unknown => "UNKNOWN",
        }
    }
}

/// Error status attached to a failed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

/// File resource as returned by the Files API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// int64 encoded as a decimal string
    #[serde(default)]
    pub size_bytes: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub state: FileState,
    #[serde(default)]
    pub error: Option<FileStatus>,
}

impl FileResource {
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Metadata sent when starting a resumable upload.
#[derive(Debug, Serialize)]
pub(crate) struct UploadStartRequest {
    pub file: UploadMetadata,
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadMetadata {
    pub display_name: String,
}

/// Body returned when an upload is finalized.
#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub file: FileResource,
}

/// `generateContent` request.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Part {
    File { file_data: FileData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// `generateContent` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Error envelope used by Google APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: FileStatus,
}

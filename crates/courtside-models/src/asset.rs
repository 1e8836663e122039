//! Remote asset definitions.
//!
//! A remote asset is a media file that has been submitted to the inference
//! service and is held there until it is deleted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle assigned by the service at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Processing state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    /// Service is still processing the asset
    #[default]
    Pending,
    /// Asset can be referenced in a generation request
    Active,
    /// Service gave up on the asset
    Failed,
}

impl AssetState {
    /// Map the service vocabulary onto the three states.
    ///
    /// `PROCESSING`, `STATE_UNSPECIFIED` and anything unrecognised stay
    /// `Pending` so the caller keeps polling until its attempt bound.
    pub fn from_service_state(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => AssetState::Active,
            "FAILED" => AssetState::Failed,
            _ => AssetState::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetState::Pending => "pending",
            AssetState::Active => "active",
            AssetState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AssetState::Active | AssetState::Failed)
    }
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media object held by the external processing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RemoteAsset {
    /// Service-assigned identifier
    pub id: AssetId,
    /// Last known processing state
    pub state: AssetState,
    /// URI used to reference the asset from a generation request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Declared content type
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Failure reason reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteAsset {
    /// Create an asset with only the fields every service returns.
    pub fn new(id: AssetId, state: AssetState, mime_type: impl Into<String>) -> Self {
        Self {
            id,
            state,
            uri: None,
            mime_type: mime_type.into(),
            display_name: None,
            size_bytes: None,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// URI for generation requests, falling back to the identifier.
    pub fn reference(&self) -> &str {
        self.uri.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}

//! Supported media types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaTypeError {
    #[error("File has no extension: {0}")]
    MissingExtension(String),

    #[error("Unsupported media type: {0} (expected mp4 or mov)")]
    Unsupported(String),
}

/// Video container accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Mp4,
    QuickTime,
}

impl MediaType {
    /// Infer the media type from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaTypeError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| MediaTypeError::MissingExtension(path.display().to_string()))?;

        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => Ok(MediaType::Mp4),
            "mov" | "qt" => Ok(MediaType::QuickTime),
            other => Err(MediaTypeError::Unsupported(other.to_string())),
        }
    }

    /// MIME type declared to the service.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaType::Mp4 => "video/mp4",
            MediaType::QuickTime => "video/quicktime",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    /// Accepts a MIME type or a bare extension.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video/mp4" | "mp4" | "m4v" => Ok(MediaType::Mp4),
            "video/quicktime" | "mov" | "qt" => Ok(MediaType::QuickTime),
            other => Err(MediaTypeError::Unsupported(other.to_string())),
        }
    }
}

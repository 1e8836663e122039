//! Client for the Gemini REST API.
//!
//! Covers the subset needed to analyze a video: the resumable Files API
//! upload, file status lookups, file deletion and `generateContent` with a
//! file reference.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GeminiClient, GeminiConfig};
pub use error::{GeminiError, GeminiResult};
pub use reqwest::StatusCode;
pub use types::{FileResource, FileState, FileStatus};

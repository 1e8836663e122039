//! Generation model selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Model name must not be empty")]
pub struct ModelNameError;

/// Model used to write the referee report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(into = "String", try_from = "String")]
pub enum ReportModel {
    /// Fast default
    #[default]
    Gemini25Flash,
    /// Slower, more thorough
    Gemini25Pro,
    /// Any other model id accepted by the service
    Custom(String),
}

impl ReportModel {
    pub fn as_str(&self) -> &str {
        match self {
            ReportModel::Gemini25Flash => "gemini-2.5-flash",
            ReportModel::Gemini25Pro => "gemini-2.5-pro",
            ReportModel::Custom(name) => name,
        }
    }
}

impl fmt::Display for ReportModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportModel {
    type Err = ModelNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The REST API also accepts the `models/` prefix.
        let name = s.trim();
        let name = name.strip_prefix("models/").unwrap_or(name);
        match name {
            "" => Err(ModelNameError),
            "flash" | "gemini-2.5-flash" => Ok(ReportModel::Gemini25Flash),
            "pro" | "gemini-2.5-pro" => Ok(ReportModel::Gemini25Pro),
            other => Ok(ReportModel::Custom(other.to_string())),
        }
    }
}

impl From<ReportModel> for String {
    fn from(model: ReportModel) -> Self {
        model.as_str().to_string()
    }
}

impl TryFrom<String> for ReportModel {
    type Error = ModelNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//! Error types for the storefront harness
//!
//! Only harness setup can fail with these errors (bad config, bad URL,
//! unreadable scenario). Failures of the server under test are recorded as
//! step results instead and never surface here.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // === HTTP Client Errors ===
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // === Scenario Errors ===
    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Failed to parse scenario '{path}': {error}")]
    ScenarioParse { path: String, error: String },

    // === File Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

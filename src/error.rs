//! Unified error types for the popular-posts report client.

use reqwest::StatusCode;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Token request failed with status {status}: {body}")]
    TokenRequestFailed { status: StatusCode, body: String },

    #[error("Token parse error: {0}")]
    TokenParse(String),

    #[error("Assertion signing error: {0}")]
    Signing(String),

    #[error("No token available")]
    NoToken,
}

/// API request/response errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Reporting API error [{code}]: {message}")]
    Service {
        status: StatusCode,
        code: String,
        message: String,
    },

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to create HTTP client: {0}")]
    HttpClientInit(String),
}

/// Errors returned by `ReportFetcher::fetch_report`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FetchError {
    /// True if the failure happened before any network call was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, FetchError::Config(_))
    }
}

use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for the search, fetch and report pipeline
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// An article in the EFetch response carries no PMID
    #[error("Article #{index} in the EFetch response has no PMID")]
    MissingPmid { index: usize },

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// IO error for file or console output
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration value is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = result::Result<T, PubMedError>;

impl RetryableError for PubMedError {
    fn is_retryable(&self) -> bool {
        match self {
            PubMedError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            PubMedError::ApiError { status, .. } => {
                (500..600).contains(status) || *status == 429
            }

            PubMedError::JsonError(_)
            | PubMedError::XmlError(_)
            | PubMedError::MissingPmid { .. }
            | PubMedError::CsvError(_)
            | PubMedError::IoError(_)
            | PubMedError::InvalidConfig(_) => false,
        }
    }

    fn retry_reason(&self) -> &str {
        match self {
            PubMedError::RequestError(err) if err.is_timeout() => "Request timeout",
            PubMedError::RequestError(err) if err.is_connect() => "Connection error",
            PubMedError::RequestError(_) => "Network error",
            PubMedError::ApiError { status: 429, .. } => "Rate limit exceeded",
            PubMedError::ApiError { status: 500..=599, .. } => "Server error",
            PubMedError::ApiError { .. } => "Client error",
            PubMedError::JsonError(_) => "Invalid JSON response",
            PubMedError::XmlError(_) | PubMedError::MissingPmid { .. } => "Invalid XML response",
            PubMedError::CsvError(_) | PubMedError::IoError(_) => "Output error",
            PubMedError::InvalidConfig(_) => "Invalid configuration",
        }
    }
}

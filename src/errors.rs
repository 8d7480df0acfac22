/*!
 * Error types for the transheet application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry with backoff has any chance of succeeding
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimitExceeded(_))
    }
}

/// Errors that make the application unable to start
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading a configuration or glossary file
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error
    },

    /// Error parsing configuration or glossary content
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// Path of the malformed file
        path: String,
        /// Parser diagnostic
        message: String
    },

    /// A required field is missing or empty
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// No API key available for the configured provider
    #[error("No API key configured for {0}; set it in the config file or environment")]
    MissingApiKey(String),

    /// A language code could not be resolved
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// The provider endpoint is not a valid URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// Errors that can occur while rewriting a sheet
#[derive(Error, Debug)]
pub enum SheetError {
    /// The reconciled translation count does not match the extracted fragment count
    #[error("Sheet '{sheet}' integrity check failed: expected {expected} fragments, got {actual}")]
    IntegrityMismatch {
        /// Sheet name
        sheet: String,
        /// Number of extracted fragments
        expected: usize,
        /// Number of reconciled translations
        actual: usize
    },

    /// A scanned location does not exist in the sheet being rewritten
    #[error("Location {location} out of range in sheet '{sheet}'")]
    InvalidLocation {
        /// Sheet name
        sheet: String,
        /// The offending coordinates
        location: String
    },

    /// Processing was cancelled before completion
    #[error("Processing cancelled")]
    Cancelled,
}

/// Errors that can occur while delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification command could not be spawned
    #[error("Failed to spawn notification command: {0}")]
    Spawn(String),

    /// The artifact to attach could not be read
    #[error("Failed to read attachment: {0}")]
    Attachment(String),

    /// The notification command exited unsuccessfully
    #[error("Notification command failed: {0}")]
    CommandFailed(String),

    /// The notification command did not finish in time
    #[error("Notification timed out after {0}ms")]
    Timeout(u64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from sheet processing
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Error from notification delivery
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

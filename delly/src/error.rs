//! Error types for the Dell lookup tool.
//!
//! - [`ClientError`] - Warranty API errors (authentication, requests)
//! - [`CsvError`] - CSV reading and writing errors
//! - [`ConfigError`] - Configuration store errors
//! - [`EnrichError`] - Per-file enrichment errors
//!
//! A service tag missing from an API response is not an error: lookups
//! return an empty result (`None`) instead.

use thiserror::Error;

// =============================================================================
// Warranty API Errors
// =============================================================================

/// Errors from the warranty API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Neither the environment nor the config file holds credentials.
    #[error("Missing API credentials: set CLIENT_ID and CLIENT_SECRET or run 'delly config edit'")]
    MissingCredentials,

    /// Token exchange failed (bad credentials or unreachable auth endpoint).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A data endpoint answered with a non-2xx status.
    #[error("Request to '{endpoint}' failed with HTTP {status}: {body}")]
    Request {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV files.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write the file.
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Invalid CSV format: {0}")]
    Parse(String),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Required column absent from the header row.
    #[error("No '{0}' column found")]
    MissingColumn(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::Parse(err.to_string())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors from the configuration store.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error.
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML.
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization failure.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform config directory could be determined.
    #[error("Could not determine a configuration directory")]
    NoConfigDir,

    /// External editor failed to launch or exited non-zero.
    #[error("Editor error: {0}")]
    Editor(String),

    /// File browser failed to launch.
    #[error("Failed to open file browser: {0}")]
    Browser(String),
}

// =============================================================================
// Enrichment Errors
// =============================================================================

/// Errors that abort enrichment of a single file.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// API client error.
    #[error("API error: {0}")]
    Client(#[from] ClientError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for API client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for enrichment operations.
pub type EnrichResult<T> = Result<T, EnrichError>;

//! Core error types for routinely-core.
//!
//! The hierarchy mirrors the user-visible error kinds: local validation
//! failures that never reach the network, failed requests, an unreachable
//! service, and an unavailable catalog (which callers degrade instead of
//! surfacing). Storage and configuration errors sit next to them.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when the service rejects a request without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Message shown when a 2xx response body cannot be decoded.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

/// Message shown when the service cannot be reached at all.
pub const CONNECTION_FAILED_MESSAGE: &str = "Failed to connect to server";

/// Core error type for routinely-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication and password reset errors
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Routine catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Local key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing database
    #[error("Failed to open storage at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Storage is locked")]
    Locked,

    /// Value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {message}")]
    Encode { key: String, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Local form validation errors. These block submission before any request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// New password and its confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password shorter than the minimum
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    /// Required form field left empty
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

/// Errors from the auth/reset endpoint.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Rejected locally, no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-2xx response (message from the server when it gave one), or a
    /// 2xx response whose body could not be decoded
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// The request could not be sent or its response could not be read
    #[error("Failed to connect to server")]
    NetworkUnavailable(#[source] reqwest::Error),
}

impl AuthError {
    /// True when the server rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::RequestFailed { status: 401, .. })
    }
}

/// Reasons the remote catalog could not be used.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No catalog endpoint configured
    #[error("catalog endpoint not configured")]
    NotConfigured,

    /// Request failed before a response arrived
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Service answered with a non-2xx status
    #[error("catalog request returned HTTP {0}")]
    Status(u16),

    /// Body did not match the catalog schema
    #[error("malformed catalog response: {0}")]
    Malformed(#[from] serde_json::Error),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) if e.code == rusqlite::ErrorCode::DatabaseLocked => {
                StorageError::Locked
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

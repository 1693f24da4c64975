//! Error types for Meal Finder
//!
//! This module defines the error types for all components of the application.
//! Errors are designed to carry enough context to be turned into a readable
//! message at the coordinator boundary, where they become observable state
//! rather than propagating further.

use std::path::PathBuf;
use thiserror::Error;

/// Recipe API and HTTP client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request error (connection, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned a non-success status
    #[error("Server error: HTTP {status}")]
    ServerError { status: u16 },

    /// Response body could not be decoded
    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Invalid URL built from configuration
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Rate limit configured as zero
    #[error("Rate limit must be non-zero")]
    InvalidRateLimit,
}

/// Favorites persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error from sqlx
    #[error("Favorites database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row contained a value that cannot be mapped back to a favorite
    #[error("Invalid favorites row for {id}: {reason}")]
    InvalidRow { id: String, reason: String },

    /// Database directory could not be created
    #[error("Cannot create favorites database directory {path}")]
    DirectoryNotAccessible { path: PathBuf },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Missing required configuration field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Recipe API error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Favorites store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is worth a user-initiated retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Api(ApiError::Http(_)) => true,
            AppError::Api(ApiError::ServerError { status }) => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Api(_) => "api",
            AppError::Store(_) => "favorites",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Recipe API result type alias
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Favorites store result type alias
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

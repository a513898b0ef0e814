//! Custom error types for fieldsales
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every error reduces to a single display
//! string; the binary prints it and exits non-zero.

use thiserror::Error;

/// The main error type for fieldsales operations
#[derive(Error, Debug)]
pub enum FieldSalesError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON/YAML serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors raised before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The backend answered, but rejected the request
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Missing or rejected credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Spreadsheet/CSV export errors
    #[error("Export error: {0}")]
    Export(String),

    /// PDF report errors
    #[error("Report error: {0}")]
    Report(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),
}

impl FieldSalesError {
    /// Create a "not found" error for a record of the given kind
    pub fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether running the same command again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Hint shown under the error message in the terminal
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Auth(_) | Self::Api { status: 401, .. } => {
                Some("Run 'fieldsales auth login' to store a fresh token.")
            }
            e if e.is_retryable() => Some("The backend may be unavailable. Retry the command."),
            _ => None,
        }
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for FieldSalesError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FieldSalesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for FieldSalesError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Json(format!("YAML: {}", err))
    }
}

impl From<csv::Error> for FieldSalesError {
    fn from(err: csv::Error) -> Self {
        Self::Export(format!("CSV: {}", err))
    }
}

impl From<reqwest::Error> for FieldSalesError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 401 => Self::Auth(err.to_string()),
            Some(status) => Self::Api {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => Self::Json(err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for FieldSalesError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export(format!("XLSX: {}", err))
    }
}

impl From<lopdf::Error> for FieldSalesError {
    fn from(err: lopdf::Error) -> Self {
        Self::Report(format!("PDF: {}", err))
    }
}

/// Result type alias for fieldsales operations
pub type FieldSalesResult<T> = Result<T, FieldSalesError>;

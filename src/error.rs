//! Error types for the Manila dashboard
//!
//! Provides structured error types for the API client adapter, form
//! handling, and page rendering. Handlers branch on [`Error::kind`]
//! rather than on message text.

use thiserror::Error;

/// Unified error type for the dashboard
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Service Catalog Errors
    // =========================================================================
    #[error("No '{service_type}' service configured in the service catalog")]
    ServiceCatalog { service_type: String },

    // =========================================================================
    // Input Validation Errors
    // =========================================================================
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    // =========================================================================
    // Remote API Errors
    // =========================================================================
    #[error("Remote API authentication failed")]
    Authentication,

    #[error("Resource not found: {kind}/{id}")]
    NotFound { kind: String, id: String },

    #[error("Remote API error: {service} returned {status}: {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Remote API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // =========================================================================
    // Parse / Render Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Template render error: {0}")]
    Template(#[from] askama::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a failure should be surfaced to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service is missing from the catalog; show an empty capability
    ServiceUnavailable,
    /// Malformed input; keep the form and show a field error
    Validation,
    /// Any other failure; flash one generic message
    Remote,
}

impl Error {
    /// Build a validation error bound to a form field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Build a validation error not bound to any single field
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ServiceCatalog { .. } => ErrorKind::ServiceUnavailable,
            Error::Validation { .. } => ErrorKind::Validation,
            _ => ErrorKind::Remote,
        }
    }

    /// Check if this error came from malformed user input
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation)
    }

    /// Check if the backing service is simply not configured
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self.kind(), ErrorKind::ServiceUnavailable)
    }
}

/// Result type alias for the dashboard
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::ServiceCatalog {
            service_type: "share".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(err.is_service_unavailable());
        assert!(!err.is_validation());

        let err = Error::field("extra_specs", "Expected only pairs of key=value.");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Expected only pairs of key=value.");

        let err = Error::Remote {
            service: "share".into(),
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Remote);
        assert_eq!(err.kind(), Error::Authentication.kind());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            kind: "share".into(),
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "Resource not found: share/abc");
        assert!(!err.is_validation());
    }
}

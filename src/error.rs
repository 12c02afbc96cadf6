//! Application error types.
//!
//! These errors are serializable so the UI layer can receive structured
//! failures from the command handlers.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors.
///
/// All variants serialize to a structured JSON object for frontend consumption.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Notification API responded with a failure status.
    #[error("Notification API error: {message}")]
    Api {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },

    /// Network request failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Bearer credential rejected.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Requested resource not found.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Server payload failed shape validation.
    #[error("Malformed snapshot: {message}")]
    MalformedSnapshot { message: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create an API error with status code and endpoint.
    pub fn api_full(message: impl Into<String>, status_code: u16, endpoint: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// Create a malformed snapshot error.
    pub fn malformed_snapshot(message: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Network, server or credential failure. Recoverable on the next refresh.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Api { .. } | Self::Authentication { .. }
        )
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Conversions from common error types

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_status() {
            Self::api(format!("HTTP error: {}", err))
        } else if err.is_decode() {
            Self::malformed_snapshot(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = AppError::network("connection refused");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"Network\""));
        assert!(json.contains("connection refused"));
    }

    #[test]
    fn test_api_error_full() {
        let err = AppError::api_full("Bad Gateway", 502, "/notifications/");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"status_code\":502"));
        assert!(json.contains("/notifications/"));
    }

    #[test]
    fn test_not_found_with_id() {
        let err = AppError::not_found_with_id("Notification", "42");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"resource\":\"Notification\""));
        assert!(json.contains("\"id\":\"42\""));
    }

    #[test]
    fn test_optional_fields_not_serialized() {
        let err = AppError::api("error");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("status_code"));
        assert!(!json.contains("endpoint"));
    }

    #[test]
    fn test_error_classes() {
        assert!(AppError::network("down").is_transport());
        assert!(AppError::authentication("expired").is_transport());
        assert!(AppError::api_full("boom", 500, "/x").is_transport());
        assert!(!AppError::not_found("Notification").is_transport());
        assert!(AppError::not_found("Notification").is_not_found());
        assert!(!AppError::malformed_snapshot("bad").is_transport());
    }

    #[test]
    fn test_display_impl() {
        let err = AppError::authentication("invalid token");
        assert_eq!(format!("{}", err), "Authentication error: invalid token");
    }
}

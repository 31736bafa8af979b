//! Typed error handling for the relay
//!
//! Every failure in the relay is local to one frame, one peer or one HTTP
//! request. The variants below let callers decide how to resolve each of
//! them (log and drop, skip the peer, answer 404) instead of matching on
//! opaque `anyhow::Error` strings.
//!
//! # Error Categories
//!
//! - [`RelayError::Decode`]: an inbound frame that does not follow the wire encoding
//! - [`RelayError::Config`]: an invalid configuration value
//! - [`RelayError::Asset`]: the static page could not be served
//! - [`RelayError::Io`]: bind / serve failures

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Inbound frame is not a valid protocol message
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Static asset could not be read
    #[error("static asset {path} unavailable: {source}")]
    Asset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Socket level failure (bind, accept, serve)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a text frame is rejected by the codec
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame is not JSON at all
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame is JSON but not an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The `type` discriminator is present but not a string
    #[error("`type` must be a string")]
    InvalidType,

    /// A field required by the message variant is missing or mistyped
    #[error("`{field}` must be a string in a `{message_type}` message")]
    InvalidField {
        message_type: &'static str,
        field: &'static str,
    },
}

impl RelayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Asset { .. } => StatusCode::NOT_FOUND,
            RelayError::Decode(_) => StatusCode::BAD_REQUEST,
            RelayError::Config(_) | RelayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayError::Decode(_) => "MALFORMED_FRAME",
            RelayError::Config(_) => "CONFIG_ERROR",
            RelayError::Asset { .. } => "ASSET_NOT_FOUND",
            RelayError::Io(_) => "IO_ERROR",
        }
    }
}

/// Plain-text responses, matching what browsers get from the static endpoint
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RelayError::Asset { .. } => "File not found",
            _ => "Internal server error",
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_error_maps_to_not_found() {
        let err = RelayError::Asset {
            path: PathBuf::from("missing/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "ASSET_NOT_FOUND");
        assert!(err.to_string().contains("missing/index.html"));
    }

    #[test]
    fn test_decode_error_wraps_into_relay_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: RelayError = DecodeError::from(json_err).into();

        assert_eq!(err.error_code(), "MALFORMED_FRAME");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("malformed frame: invalid JSON"));
    }

    #[test]
    fn test_invalid_field_message() {
        let err = DecodeError::InvalidField {
            message_type: "join",
            field: "room",
        };
        assert_eq!(err.to_string(), "`room` must be a string in a `join` message");
    }

    #[test]
    fn test_config_error_is_internal() {
        let err = RelayError::Config("peer_buffer must be at least 1".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "invalid configuration: peer_buffer must be at least 1"
        );
    }
}

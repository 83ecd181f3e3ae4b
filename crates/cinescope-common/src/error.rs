//! Unified error type for cinescope.
//!
//! The API clients map transport, status, and decoding failures into
//! [`Error`], which carries enough context for HTTP handlers to derive a
//! status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering every failure mode in cinescope.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "movie", "person").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An upstream API answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Upstream {
        /// Upstream service name ("tmdb", "trakt").
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("{service} request failed: {message}")]
    Http {
        service: &'static str,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Upstream { .. } => 502,
            Error::Http { .. } => 502,
            Error::Decode { .. } => 502,
            Error::Config(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Upstream { .. } => "upstream_error",
            Error::Http { .. } => "http_error",
            Error::Decode { .. } => "decode_error",
            Error::Config(_) => "config_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Http`].
    pub fn http(service: &'static str, message: impl fmt::Display) -> Self {
        Error::Http {
            service,
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Decode`].
    pub fn decode(service: &'static str, message: impl fmt::Display) -> Self {
        Error::Decode {
            service,
            message: message.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//! Unified error type for the reelquest application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`]
//! and a display-ready text via [`Error::user_message`].

use std::fmt;

/// Unified error type covering all failure modes in reelquest.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote service could not be reached (connection refused, timeout, DNS).
    #[error("{service} unavailable: {message}")]
    RemoteUnavailable {
        /// Name of the remote service (e.g. "overseerr", "tmdb").
        service: String,
        /// Transport-level error description.
        message: String,
    },

    /// A remote service answered with a non-success status.
    #[error("{service} rejected the request ({status}): {message}")]
    RemoteRejected {
        /// Name of the remote service.
        service: String,
        /// HTTP status returned by the remote service.
        status: u16,
        /// Message extracted from the response body, or a generic fallback.
        message: String,
    },

    /// A remote service answered with a body that does not have the expected shape.
    #[error("Malformed response from {service}: {message}")]
    MalformedResponse {
        /// Name of the remote service.
        service: String,
        /// Parse error description.
        message: String,
    },

    /// Required settings are absent. Fatal at startup.
    #[error("Missing configuration: {}", .0.join(", "))]
    ConfigurationMissing(Vec<String>),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::RemoteUnavailable { .. } => 502,
            Error::RemoteRejected { status, .. } if (400..600).contains(status) => *status,
            Error::RemoteRejected { .. } => 502,
            Error::MalformedResponse { .. } => 502,
            Error::ConfigurationMissing(_) => 500,
            Error::Validation(_) => 400,
            Error::Internal(_) => 500,
        }
    }

    /// Text suitable for showing to an end user in a notification.
    ///
    /// For remote rejections this is the message the remote service provided,
    /// without the service name or status prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::RemoteRejected { message, .. } => message.clone(),
            Error::Validation(message) => message.clone(),
            Error::RemoteUnavailable { service, .. } => format!("{service} is unreachable"),
            Error::MalformedResponse { service, .. } => format!("Invalid response from {service}"),
            other => other.to_string(),
        }
    }

    /// Convenience constructor for [`Error::RemoteUnavailable`].
    pub fn remote_unavailable(service: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::RemoteUnavailable {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::RemoteRejected`].
    pub fn remote_rejected(
        service: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Error::RemoteRejected {
            service: service.into(),
            status,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::MalformedResponse`].
    pub fn malformed(service: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::MalformedResponse {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

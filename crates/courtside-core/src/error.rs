//! Unified client error types for the Courtside connection layer.
//!
//! All crates map their internal failures into [`ClientError`] for
//! consistent propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the connection layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Transport-level failure; no response was received.
    Network,
    /// The session is no longer valid: the refresh flow was exhausted or
    /// the refresh call itself failed.
    AuthExpired,
    /// The backend answered with a non-2xx status other than 401.
    Upstream,
    /// A failure on the persistent duplex channel. Recovered internally
    /// by the reconnect loop; never propagated to callers.
    Channel,
    /// The reconnect attempt ceiling was reached.
    ReconnectExhausted,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A configuration error occurred.
    Configuration,
    /// The durable credential backend failed to read or write.
    Credential,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "NETWORK"),
            Self::AuthExpired => write!(f, "AUTH_EXPIRED"),
            Self::Upstream => write!(f, "UPSTREAM"),
            Self::Channel => write!(f, "CHANNEL"),
            Self::ReconnectExhausted => write!(f, "RECONNECT_EXHAUSTED"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Credential => write!(f, "CREDENTIAL"),
        }
    }
}

/// The unified error used throughout the Courtside connection layer.
///
/// Crate-specific failures are mapped into `ClientError` using `From`
/// impls or explicit `.map_err()` calls so the application boundary deals
/// with a single type.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// HTTP status of the failing response, when one was received.
    pub status: Option<u16>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ClientError {
    /// Create a new client error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create a new client error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a network (no response) error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Create an expired-session error.
    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthExpired, message)
    }

    /// Create an upstream error carrying the response status.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Upstream,
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Create a duplex channel error.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Channel, message)
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a credential storage error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    /// Stable user-presentable description of the failure.
    ///
    /// Screens show this string directly, so the wording stays coarse:
    /// transient transport blips, dead sessions, and upstream failures
    /// each collapse to one consistent message.
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Network => "Network error. Please check your connection.",
            ErrorKind::AuthExpired => "Session expired. Please sign in again.",
            ErrorKind::Upstream => match self.status {
                Some(403) => "You do not have permission to perform this action.",
                Some(404) => "Resource not found.",
                Some(s) if s >= 500 => "Server error. Please try again later.",
                _ => "Request failed. Please try again.",
            },
            ErrorKind::ReconnectExhausted => "Real-time updates are unavailable right now.",
            _ => "An unexpected error occurred.",
        }
    }
}

impl Clone for ClientError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            status: self.status,
            source: None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

//! Error taxonomy and failure classification for the viewer session.
//!
//! DESIGN
//! ======
//! Negotiation and transport failures arrive as text (an HTTP status line, a
//! peer-connection message, "Connection lost"). [`FailureKind::classify`]
//! buckets that text once, and the bucket decides which lifecycle event the
//! host sees. Every error carries a stable grepable code through
//! [`ErrorCode`] plus a retryable flag.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::host::TransportState;
use crate::transport::NegotiationError;

/// Stable code and retry hint for an error, for logs and host payloads.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Bucket a raw failure falls into. Each bucket has its own lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Forbidden,
    ServerError,
    Generic,
}

impl FailureKind {
    /// Classify by substring, first match wins: `404`/`Not Found`, `403`, `500`.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.contains("404") || raw.contains("Not Found") {
            Self::NotFound
        } else if raw.contains("403") {
            Self::Forbidden
        } else if raw.contains("500") {
            Self::ServerError
        } else {
            Self::Generic
        }
    }
}

/// Errors surfaced by the viewer session.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Required configuration is missing. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The endpoint does not know the stream.
    #[error("stream not found: {0}")]
    NotFound(String),

    /// The endpoint refused access.
    #[error("stream access forbidden: {0}")]
    Forbidden(String),

    /// The endpoint failed internally.
    #[error("server error: {0}")]
    ServerError(String),

    /// Any other negotiation failure.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The transport dropped after connecting.
    #[error("transport {0}")]
    TransportDisconnected(TransportState),

    /// The layer event channel never became available.
    #[error("layer event stream unavailable after {attempts} polls")]
    LayerStreamUnavailable { attempts: u32 },

    /// The host could not start playback.
    #[error("playback failed: {0}")]
    Playback(String),

    /// No advertised layer has this encoding id.
    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    /// A layer was selected with no live session.
    #[error("no active session")]
    NotConnected,

    /// The server rejected a layer selection.
    #[error("layer selection failed: {0}")]
    LayerSelection(#[source] NegotiationError),

    /// The retry ceiling was reached.
    #[error("gave up after {attempts} retries: {error}")]
    GaveUp { attempts: u32, error: String },

    /// The session was stopped and cannot be restarted.
    #[error("session stopped")]
    Stopped,
}

impl ViewerError {
    /// Wrap a raw negotiation failure in the variant its text classifies to.
    #[must_use]
    pub fn from_failure(raw: &str) -> Self {
        let raw = raw.to_owned();
        match FailureKind::classify(&raw) {
            FailureKind::NotFound => Self::NotFound(raw),
            FailureKind::Forbidden => Self::Forbidden(raw),
            FailureKind::ServerError => Self::ServerError(raw),
            FailureKind::Generic => Self::Connection(raw),
        }
    }
}

impl ErrorCode for ViewerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "E_CONFIGURATION",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Forbidden(_) => "E_FORBIDDEN",
            Self::ServerError(_) => "E_SERVER_ERROR",
            Self::Connection(_) => "E_CONNECTION",
            Self::TransportDisconnected(_) => "E_TRANSPORT_DISCONNECTED",
            Self::LayerStreamUnavailable { .. } => "E_LAYER_STREAM_UNAVAILABLE",
            Self::Playback(_) => "E_PLAYBACK",
            Self::UnknownLayer(_) => "E_UNKNOWN_LAYER",
            Self::NotConnected => "E_NOT_CONNECTED",
            Self::LayerSelection(_) => "E_LAYER_SELECTION",
            Self::GaveUp { .. } => "E_GAVE_UP",
            Self::Stopped => "E_STOPPED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Forbidden(_)
                | Self::ServerError(_)
                | Self::Connection(_)
                | Self::TransportDisconnected(_)
        )
    }
}

//! Lifecycle events and the connection phase the host renders from them.
//!
//! ARCHITECTURE
//! ============
//! The session controller reports everything the chrome needs as a
//! [`ViewerEvent`]. Hosts either react to the raw events (each has a stable
//! `whep:*` name and a JSON detail) or fold them through
//! [`ConnectionPhase::apply`] to get the loading / connected / reconnecting /
//! error state with a display message.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use layers::QualityMenu;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::FailureKind;
use crate::host::TransportState;

/// Event emitted to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// First successful negotiation.
    Connected { url: String },
    /// Any later successful negotiation.
    Recovered { url: String },
    /// The transport dropped after connecting.
    Disconnected { state: TransportState, url: String },
    NotFound { error: String, url: String },
    Forbidden { error: String, url: String },
    ServerError { error: String, url: String },
    Error { error: String, url: String },
    /// Missing configuration; nothing was attempted.
    ConfigError { error: String },
    /// New layer snapshot, already shaped as a quality menu.
    Layers { menu: QualityMenu },
    /// The retry ceiling was reached.
    GaveUp { error: String, url: String, attempts: u32 },
}

impl ViewerEvent {
    /// Event for a classified negotiation failure.
    #[must_use]
    pub fn failure(kind: FailureKind, error: &str, url: &str) -> Self {
        let (error, url) = (error.to_owned(), url.to_owned());
        match kind {
            FailureKind::NotFound => Self::NotFound { error, url },
            FailureKind::Forbidden => Self::Forbidden { error, url },
            FailureKind::ServerError => Self::ServerError { error, url },
            FailureKind::Generic => Self::Error { error, url },
        }
    }

    /// Name the host listens for.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "whep:connected",
            Self::Recovered { .. } => "whep:recovered",
            Self::Disconnected { .. } => "whep:disconnected",
            Self::NotFound { .. } => "whep:notfound",
            Self::Forbidden { .. } => "whep:forbidden",
            Self::ServerError { .. } => "whep:servererror",
            Self::Error { .. } => "whep:error",
            Self::ConfigError { .. } => "whep:configerror",
            Self::Layers { .. } => "whep:layers",
            Self::GaveUp { .. } => "whep:gaveup",
        }
    }

    /// Event payload as the host receives it.
    #[must_use]
    pub fn detail(&self) -> Value {
        match self {
            Self::Connected { url } | Self::Recovered { url } => json!({ "url": url }),
            Self::Disconnected { state, url } => json!({ "state": state, "url": url }),
            Self::NotFound { error, url }
            | Self::Forbidden { error, url }
            | Self::ServerError { error, url }
            | Self::Error { error, url } => json!({ "error": error, "url": url }),
            Self::ConfigError { error } => json!({ "error": error }),
            Self::Layers { menu } => json!({ "menu": menu, "title": menu.title() }),
            Self::GaveUp { error, url, attempts } => json!({ "error": error, "url": url, "attempts": attempts }),
        }
    }
}

/// Display strings for the chrome, overridable per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub loading: String,
    pub reconnecting: String,
    pub stream_error: String,
    pub retry: String,
    pub connection_failed: String,
    pub stream_not_found: String,
    pub access_forbidden: String,
    pub server_error: String,
    pub whep_url_required: String,
    pub failed_to_initialize: String,
    pub video_player_error: String,
    pub connection_lost: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            loading: "Loading stream...".into(),
            reconnecting: "Reconnecting...".into(),
            stream_error: "Stream Error".into(),
            retry: "Retry".into(),
            connection_failed: "Connection failed".into(),
            stream_not_found: "Stream not found".into(),
            access_forbidden: "Stream access forbidden (403)".into(),
            server_error: "Server error (500)".into(),
            whep_url_required: "WHEP URL is required".into(),
            failed_to_initialize: "Failed to initialize WHEP stream".into(),
            video_player_error: "Video player error".into(),
            connection_lost: "Connection lost".into(),
        }
    }
}

/// What the chrome should show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Loading,
    Connected,
    Reconnecting,
    /// Terminal for the chrome until the host retries; carries the message.
    Error(String),
}

impl ConnectionPhase {
    /// Next phase after `event`. Events that do not affect the phase keep it.
    #[must_use]
    pub fn apply(&self, event: &ViewerEvent, messages: &Messages) -> Self {
        match event {
            ViewerEvent::Connected { .. } | ViewerEvent::Recovered { .. } => Self::Connected,
            ViewerEvent::NotFound { .. } | ViewerEvent::Error { .. } | ViewerEvent::Disconnected { .. } => {
                Self::Reconnecting
            }
            ViewerEvent::Forbidden { .. } => Self::Error(messages.access_forbidden.clone()),
            ViewerEvent::ServerError { .. } => Self::Error(messages.server_error.clone()),
            ViewerEvent::ConfigError { .. } => Self::Error(messages.whep_url_required.clone()),
            ViewerEvent::GaveUp { .. } => Self::Error(messages.connection_failed.clone()),
            ViewerEvent::Layers { .. } => self.clone(),
        }
    }

    /// Spinner caption, if the phase shows a spinner.
    #[must_use]
    pub fn spinner_label<'a>(&self, messages: &'a Messages) -> Option<&'a str> {
        match self {
            Self::Loading => Some(&messages.loading),
            Self::Reconnecting => Some(&messages.reconnecting),
            Self::Connected | Self::Error(_) => None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

//! Capabilities the embedding host hands to a viewer.
//!
//! The session controller never touches a video element or a WebRTC stack
//! directly. It is given a [`HostSurface`] for playback and lifecycle events,
//! and a [`PeerFactory`] that builds a fresh [`PeerConnection`] per attempt.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::events::ViewerEvent;
use crate::transport::NegotiationError;

/// Kind of a receive-only transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// ICE connection state as reported by the peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// States that mean the media path is gone.
    #[must_use]
    pub fn is_lost(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Checking => "checking",
            Self::Connected => "connected",
            Self::Completed => "completed",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming media stream, identified by the id the host tracks it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub id: String,
}

impl MediaStream {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self { id: id.to_owned() }
    }
}

/// Peer connection for one negotiation attempt.
#[async_trait(?Send)]
pub trait PeerConnection {
    /// Add a receive-only transceiver.
    fn add_transceiver(&self, kind: MediaKind) -> Result<(), NegotiationError>;

    /// Create the local SDP offer.
    async fn create_offer(&self) -> Result<String, NegotiationError>;

    /// Apply the remote SDP answer.
    async fn apply_answer(&self, sdp: &str) -> Result<(), NegotiationError>;

    /// Release the connection. Must be safe to call more than once.
    fn close(&self);
}

/// Builds a fresh peer connection per attempt.
pub trait PeerFactory {
    fn create(&self) -> Result<Rc<dyn PeerConnection>, NegotiationError>;
}

/// Rendering widget and UI chrome.
#[async_trait(?Send)]
pub trait HostSurface {
    /// Show `stream` on the video surface.
    fn attach_stream(&self, stream: &MediaStream);

    /// Start playback.
    async fn play(&self) -> Result<(), ViewerError>;

    fn pause(&self);

    /// Deliver a lifecycle event to the host.
    fn emit(&self, event: &ViewerEvent);
}

//! Negotiation transport seams.
//!
//! A [`Negotiator`] turns a fresh peer connection plus an endpoint URL into a
//! live [`SignalingSession`]. The session can be stopped, can hand over its
//! layer event channel once the server has opened one, and forwards layer
//! selections. [`crate::whep::WhepClient`] is the HTTP implementation; tests
//! substitute scripted ones.

use std::rc::Rc;

use async_trait::async_trait;
use layers::LayerSelection;

use crate::error::ErrorCode;
use crate::host::PeerConnection;

/// Failure talking to the signaling endpoint or driving the peer connection.
///
/// The `Display` text is what failure classification inspects, so status
/// failures render as `"<code> <reason>"`, e.g. `404 Not Found`.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// The endpoint answered with a non-success status.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String, body: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// The response was missing something the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The peer connection rejected an offer or answer.
    #[error("peer connection error: {0}")]
    Peer(String),
}

impl From<reqwest::Error> for NegotiationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl ErrorCode for NegotiationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "E_NEGOTIATION_STATUS",
            Self::Request(_) => "E_NEGOTIATION_REQUEST",
            Self::Protocol(_) => "E_NEGOTIATION_PROTOCOL",
            Self::Peer(_) => "E_PEER_CONNECTION",
        }
    }

    fn retryable(&self) -> bool {
        !matches!(self, Self::Status { status: 400..=499, .. })
    }
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseEvent {
    #[must_use]
    pub fn new(event: &str, data: &str) -> Self {
        Self { event: event.to_owned(), data: data.to_owned() }
    }
}

/// Open server-sent event channel for a session.
#[async_trait(?Send)]
pub trait LayerEventSource {
    /// Next event, or `None` once the channel has closed.
    async fn next_event(&mut self) -> Option<Result<SseEvent, NegotiationError>>;
}

/// Live signaling session returned by a successful negotiation.
#[async_trait(?Send)]
pub trait SignalingSession {
    /// Opaque session id. For WHEP, the session resource URL.
    fn id(&self) -> &str;

    /// Terminate the session on the server. Best effort.
    async fn stop(&self) -> Result<(), NegotiationError>;

    /// Hand over the layer event channel once it is available.
    ///
    /// Returns `None` until the server has opened it, and again after it has
    /// been handed over.
    async fn event_source(&self) -> Option<Box<dyn LayerEventSource>>;

    /// Ask the server to forward `selection`.
    async fn select_layer(&self, selection: &LayerSelection) -> Result<(), NegotiationError>;
}

/// Performs the offer/answer exchange against an endpoint.
#[async_trait(?Send)]
pub trait Negotiator {
    /// Negotiate `peer` against `url`, applying the answer to `peer`.
    async fn negotiate(
        &self,
        peer: Rc<dyn PeerConnection>,
        url: &str,
    ) -> Result<Rc<dyn SignalingSession>, NegotiationError>;
}

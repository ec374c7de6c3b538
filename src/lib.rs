//! WHEP viewer core.
//!
//! Negotiates a receive-only WebRTC session against a WHEP endpoint, recovers
//! from failures with a single pending retry, follows the server's simulcast
//! layer announcements and switches layers on request. Rendering, the peer
//! connection itself and UI chrome belong to the host and are reached through
//! the traits in [`host`] and [`transport`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | `SessionController`: lifecycle, failure handling, layer selection |
//! | [`retry`] | Single-slot retry timer |
//! | [`layer_stream`] | Waits for the layer event channel and decodes `layers` events |
//! | [`whep`] | `reqwest` WHEP transport with SSE and layer extensions |
//! | [`transport`] | Negotiation and signaling session traits |
//! | [`host`] | Peer connection and host surface traits, transport states |
//! | [`events`] | Lifecycle events, UI messages and connection phase |
//! | [`error`] | Failure classification and error types |
//! | [`config`] | Retry, poll and zoom configuration |
//! | [`style`] | Stylesheet registry and spinner sheet |
//!
//! Layer parsing lives in the [`layers`] crate and zoom/pan in [`viewport`];
//! both are re-exported.

pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod layer_stream;
pub mod retry;
pub mod session;
pub mod style;
pub mod transport;
pub mod whep;

#[cfg(test)]
mod test_helpers;

pub use config::{LayerPollPolicy, RetryPolicy, ViewerConfig};
pub use error::{ErrorCode, FailureKind, ViewerError};
pub use events::{ConnectionPhase, Messages, ViewerEvent};
pub use host::{HostSurface, MediaKind, MediaStream, PeerConnection, PeerFactory, TransportState};
pub use session::{SessionController, SessionState};
pub use transport::{LayerEventSource, NegotiationError, Negotiator, SignalingSession, SseEvent};
pub use whep::WhepClient;

pub use layers;
pub use viewport;

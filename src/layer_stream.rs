//! Layer stream: waits for a session's event channel and republishes the
//! `layers` snapshots it carries.
//!
//! The channel usually opens shortly after negotiation, so it is polled on a
//! fixed interval until the session hands it over. Nothing here is fatal: a
//! channel that never appears or a payload that does not decode only costs
//! the viewer its quality switching.

#[cfg(test)]
#[path = "layer_stream_test.rs"]
mod layer_stream_test;

use layers::{LAYERS_EVENT, MediaLayers, decode_layer_event};
use tracing::{debug, info, warn};

use crate::config::LayerPollPolicy;
use crate::error::ViewerError;
use crate::transport::{LayerEventSource, SignalingSession};

/// Subscriber to one session's layer events.
#[derive(Debug, Clone, Copy)]
pub struct LayerStream {
    policy: LayerPollPolicy,
}

impl LayerStream {
    #[must_use]
    pub fn new(policy: LayerPollPolicy) -> Self {
        Self { policy }
    }

    /// Poll `session` until it hands over its event channel.
    ///
    /// Checks immediately, then once per interval.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::LayerStreamUnavailable`] when the poll cap is
    /// reached. Without a cap this only returns once the channel exists.
    pub async fn wait_for_source(
        &self,
        session: &dyn SignalingSession,
    ) -> Result<Box<dyn LayerEventSource>, ViewerError> {
        let mut attempts: u32 = 0;
        loop {
            if let Some(source) = session.event_source().await {
                debug!(session = %session.id(), attempts, "layer event channel available");
                return Ok(source);
            }
            attempts = attempts.saturating_add(1);
            if self.policy.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(ViewerError::LayerStreamUnavailable { attempts });
            }
            tokio::time::sleep(self.policy.interval).await;
        }
    }

    /// Wait for the channel, then call `on_layers` for every decodable
    /// `layers` event until the channel closes.
    pub async fn run<F>(self, session: &dyn SignalingSession, mut on_layers: F)
    where
        F: FnMut(MediaLayers),
    {
        let mut source = match self.wait_for_source(session).await {
            Ok(source) => source,
            Err(e) => {
                warn!(session = %session.id(), error = %e, "quality switching disabled");
                return;
            }
        };

        while let Some(next) = source.next_event().await {
            let event = match next {
                Ok(event) => event,
                Err(e) => {
                    warn!(session = %session.id(), error = %e, "layer event channel failed");
                    return;
                }
            };
            if event.event != LAYERS_EVENT {
                continue;
            }
            match decode_layer_event(&event.data) {
                Ok(media) => on_layers(media),
                Err(e) => warn!(session = %session.id(), error = %e, "malformed layers event"),
            }
        }
        info!(session = %session.id(), "layer event channel closed");
    }
}

//! Session controller: negotiation, failure recovery, and layer switching
//! for one viewer.
//!
//! SYSTEM CONTEXT
//! ==============
//! The host builds one controller per viewer and hands it its capabilities
//! (surface, peer factory, negotiator). The host forwards ICE state changes
//! and incoming streams; the controller reports progress back as
//! [`ViewerEvent`]s.
//!
//! ARCHITECTURE
//! ============
//! State lives behind `Rc<RefCell<..>>` and every suspension point (the
//! negotiation itself, the retry timer, the layer poll) runs on the current
//! `LocalSet`. A borrow is never held across an `.await` or across a call
//! into the host.
//!
//! DESIGN
//! ======
//! - Every `start` bumps a generation counter and owns the peer connection and
//!   signaling session it creates. A completion whose generation is no longer
//!   current closes what it created and is otherwise ignored.
//! - At most one retry timer exists. While it is armed, failures and
//!   transport drops are ignored.
//! - `stop` is final: it aborts the timer and the layer task and closes every
//!   resource.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use layers::{MediaLayers, select_layer};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::error::{FailureKind, ViewerError};
use crate::events::ViewerEvent;
use crate::host::{HostSurface, MediaKind, MediaStream, PeerConnection, PeerFactory, TransportState};
use crate::layer_stream::LayerStream;
use crate::retry::RetryGuard;
use crate::transport::{NegotiationError, Negotiator, SignalingSession};

/// Error text used when the transport drops after connecting.
pub const CONNECTION_LOST: &str = "Connection lost";

/// Lifecycle position of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing started yet.
    Idle,
    /// Offer/answer exchange in flight.
    Negotiating,
    Connected,
    /// Waiting for the retry timer.
    Reconnecting,
    /// The retry ceiling was reached. `start` may be called again.
    Failed,
    /// Stopped for good.
    Terminated,
}

/// Resources owned by one generation.
#[derive(Default)]
struct Resources {
    peer: Option<Rc<dyn PeerConnection>>,
    session: Option<Rc<dyn SignalingSession>>,
    layer_task: Option<JoinHandle<()>>,
}

impl Resources {
    /// Release everything, stopping the signaling session in the background.
    fn dispose(self) {
        let session = self.release();
        if let Some(session) = session {
            tokio::task::spawn_local(async move { stop_session(session.as_ref()).await });
        }
    }

    /// Release everything, waiting for the signaling session to stop.
    async fn close(self) {
        if let Some(session) = self.release() {
            stop_session(session.as_ref()).await;
        }
    }

    fn release(self) -> Option<Rc<dyn SignalingSession>> {
        if let Some(task) = self.layer_task {
            task.abort();
        }
        if let Some(peer) = self.peer {
            peer.close();
        }
        self.session
    }
}

struct Shared {
    state: SessionState,
    url: String,
    generation: u64,
    connected_once: bool,
    /// Consecutive retries since the last successful negotiation.
    retries: u32,
    resources: Resources,
    layers: Option<MediaLayers>,
    retry: RetryGuard,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && !matches!(self.state, SessionState::Terminated | SessionState::Failed)
    }

    fn take_resources(&mut self) -> Resources {
        self.layers = None;
        std::mem::take(&mut self.resources)
    }
}

struct Inner {
    config: ViewerConfig,
    host: Rc<dyn HostSurface>,
    peers: Rc<dyn PeerFactory>,
    negotiator: Rc<dyn Negotiator>,
    shared: RefCell<Shared>,
}

/// Drives one viewer's session. Cloning yields another handle to the same
/// session.
///
/// Must be used from within a `tokio::task::LocalSet`.
#[derive(Clone)]
pub struct SessionController {
    inner: Rc<Inner>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        config: ViewerConfig,
        host: Rc<dyn HostSurface>,
        peers: Rc<dyn PeerFactory>,
        negotiator: Rc<dyn Negotiator>,
    ) -> Self {
        let shared = Shared {
            state: SessionState::Idle,
            url: config.url.clone(),
            generation: 0,
            connected_once: false,
            retries: 0,
            resources: Resources::default(),
            layers: None,
            retry: RetryGuard::new(),
        };
        Self { inner: Rc::new(Inner { config, host, peers, negotiator, shared: RefCell::new(shared) }) }
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.shared.borrow().state
    }

    /// Endpoint of the current (or last) attempt.
    #[must_use]
    pub fn url(&self) -> String {
        self.inner.shared.borrow().url.clone()
    }

    /// Id of the live signaling session, if connected.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.inner.shared.borrow().resources.session.as_ref().map(|s| s.id().to_owned())
    }

    /// Latest layer snapshot for the live session.
    #[must_use]
    pub fn layers(&self) -> Option<MediaLayers> {
        self.inner.shared.borrow().layers.clone()
    }

    #[must_use]
    pub fn retry_pending(&self) -> bool {
        self.inner.shared.borrow().retry.is_pending()
    }

    // --- Lifecycle ---

    /// Start against the configured endpoint.
    ///
    /// # Errors
    ///
    /// See [`SessionController::start`].
    pub async fn connect(&self) -> Result<(), ViewerError> {
        let url = self.inner.config.url.clone();
        self.start(&url).await
    }

    /// Negotiate a new session against `url`.
    ///
    /// Resolves once this attempt has settled: connected, failed with a retry
    /// scheduled, or superseded by a newer attempt (which is `Ok`).
    ///
    /// # Errors
    ///
    /// - [`ViewerError::Configuration`] for an empty URL. Nothing is attempted
    ///   and no retry is scheduled.
    /// - [`ViewerError::Stopped`] after [`SessionController::stop`].
    /// - The classified failure when negotiation fails. A retry has been
    ///   scheduled unless the variant is [`ViewerError::GaveUp`].
    pub async fn start(&self, url: &str) -> Result<(), ViewerError> {
        let url = url.trim();
        if url.is_empty() {
            let error = self.inner.config.messages.whep_url_required.clone();
            warn!("start requested without an endpoint URL");
            self.inner.host.emit(&ViewerEvent::ConfigError { error: error.clone() });
            return Err(ViewerError::Configuration(error));
        }

        let (generation, previous) = {
            let mut shared = self.inner.shared.borrow_mut();
            if shared.state == SessionState::Terminated {
                return Err(ViewerError::Stopped);
            }
            if shared.state == SessionState::Failed {
                shared.retries = 0;
            }
            shared.retry.cancel();
            shared.generation += 1;
            shared.url = url.to_owned();
            shared.state = SessionState::Negotiating;
            (shared.generation, shared.take_resources())
        };
        previous.dispose();
        info!(url = %url, generation, "negotiating session");

        let peer = match self.inner.peers.create() {
            Ok(peer) => peer,
            Err(e) => return Err(self.fail(&e.to_string())),
        };
        self.inner.shared.borrow_mut().resources.peer = Some(peer.clone());
        if let Err(e) = add_receivers(peer.as_ref()) {
            return Err(self.fail(&e.to_string()));
        }

        let result = self.inner.negotiator.negotiate(peer.clone(), url).await;

        if !self.inner.shared.borrow().is_current(generation) {
            debug!(url = %url, generation, "discarding superseded negotiation");
            peer.close();
            if let Ok(session) = result {
                stop_session(session.as_ref()).await;
            }
            return Ok(());
        }

        match result {
            Ok(session) => {
                self.on_negotiated(generation, url, session).await;
                Ok(())
            }
            Err(e) => Err(self.fail(&e.to_string())),
        }
    }

    /// Tear the session down for good. Idempotent.
    pub async fn stop(&self) {
        let (url, resources) = {
            let mut shared = self.inner.shared.borrow_mut();
            if shared.state == SessionState::Terminated {
                return;
            }
            shared.state = SessionState::Terminated;
            shared.generation += 1;
            shared.retry.cancel();
            (shared.url.clone(), shared.take_resources())
        };
        info!(url = %url, "session stopped");
        resources.close().await;
    }

    // --- Failures ---

    /// Handle a failure described by `raw`.
    ///
    /// Returns the classification, or `None` when the failure was ignored
    /// because a retry is already scheduled or the session is not running.
    pub fn handle_error(&self, raw: &str) -> Option<FailureKind> {
        let kind = FailureKind::classify(raw);
        let policy = self.inner.config.retry;

        let (url, resources, retries, gave_up) = {
            let mut shared = self.inner.shared.borrow_mut();
            if shared.retry.is_pending() {
                debug!(error = %raw, "retry already scheduled, ignoring failure");
                return None;
            }
            if matches!(shared.state, SessionState::Idle | SessionState::Terminated | SessionState::Failed) {
                debug!(error = %raw, state = ?shared.state, "failure outside a running session, ignoring");
                return None;
            }
            shared.generation += 1;
            let resources = shared.take_resources();
            let gave_up = policy.exhausted(shared.retries);
            if gave_up {
                shared.state = SessionState::Failed;
            } else {
                shared.retries += 1;
                shared.state = SessionState::Reconnecting;
                let delay = policy.delay_for(shared.retries);
                shared.retry.schedule(delay, fire_retry(Rc::downgrade(&self.inner)));
            }
            (shared.url.clone(), resources, shared.retries, gave_up)
        };

        warn!(url = %url, error = %raw, kind = ?kind, "session failed");
        self.inner.host.pause();
        self.inner.host.emit(&ViewerEvent::failure(kind, raw, &url));
        resources.dispose();

        if gave_up {
            warn!(url = %url, attempts = retries, "retry limit reached, giving up");
            self.inner.host.emit(&ViewerEvent::GaveUp { error: raw.to_owned(), url, attempts: retries });
        } else {
            let delay_ms = policy.delay_for(retries).as_millis();
            info!(url = %url, attempt = retries, delay_ms, "reconnect scheduled");
        }
        Some(kind)
    }

    /// React to an ICE connection state change of the current peer.
    pub fn handle_transport_state_change(&self, state: TransportState) {
        let url = {
            let shared = self.inner.shared.borrow();
            if shared.retry.is_pending() {
                return;
            }
            if !state.is_lost() {
                debug!(state = %state, "transport state changed");
                return;
            }
            if !matches!(shared.state, SessionState::Negotiating | SessionState::Connected) {
                return;
            }
            shared.url.clone()
        };
        warn!(url = %url, state = %state, "transport lost");
        self.inner.host.emit(&ViewerEvent::Disconnected { state, url });
        self.handle_error(CONNECTION_LOST);
    }

    /// Attach a stream the peer connection received.
    pub fn on_incoming_stream(&self, stream: &MediaStream) {
        debug!(stream = %stream.id, "incoming stream");
        self.inner.host.attach_stream(stream);
    }

    // --- Layers ---

    /// Switch to the layer with `encoding_id`, or `"auto"`.
    ///
    /// # Errors
    ///
    /// - [`ViewerError::NotConnected`] without a live session.
    /// - [`ViewerError::UnknownLayer`] when no advertised layer matches; the
    ///   server is not contacted.
    /// - [`ViewerError::LayerSelection`] when the server rejects the request.
    pub async fn select_layer(&self, encoding_id: &str) -> Result<(), ViewerError> {
        let (session, selection) = {
            let shared = self.inner.shared.borrow();
            let session = match (&shared.state, &shared.resources.session) {
                (SessionState::Connected, Some(session)) => session.clone(),
                _ => return Err(ViewerError::NotConnected),
            };
            let available = shared.layers.as_ref().map_or(&[][..], |media| media.layers.as_slice());
            let selection = select_layer(available, encoding_id)
                .map_err(|_| ViewerError::UnknownLayer(encoding_id.to_owned()))?;
            (session, selection)
        };
        info!(session = %session.id(), layer = %encoding_id, "selecting layer");
        session.select_layer(&selection).await.map_err(ViewerError::LayerSelection)
    }

    // --- Internals ---

    fn fail(&self, raw: &str) -> ViewerError {
        self.handle_error(raw);
        let shared = self.inner.shared.borrow();
        if shared.state == SessionState::Failed {
            return ViewerError::GaveUp { attempts: shared.retries, error: raw.to_owned() };
        }
        ViewerError::from_failure(raw)
    }

    async fn on_negotiated(&self, generation: u64, url: &str, session: Rc<dyn SignalingSession>) {
        let first = {
            let mut shared = self.inner.shared.borrow_mut();
            shared.resources.session = Some(session.clone());
            shared.state = SessionState::Connected;
            shared.retries = 0;
            let first = !shared.connected_once;
            shared.connected_once = true;
            first
        };
        info!(url = %url, session = %session.id(), recovered = !first, "session connected");
        let event = if first {
            ViewerEvent::Connected { url: url.to_owned() }
        } else {
            ViewerEvent::Recovered { url: url.to_owned() }
        };
        self.inner.host.emit(&event);

        if let Err(e) = self.inner.host.play().await {
            warn!(url = %url, error = %e, "playback did not start");
        }

        if !self.inner.shared.borrow().is_current(generation) {
            return;
        }
        self.spawn_layer_stream(generation, session);
    }

    fn spawn_layer_stream(&self, generation: u64, session: Rc<dyn SignalingSession>) {
        let stream = LayerStream::new(self.inner.config.layer_poll);
        let weak = Rc::downgrade(&self.inner);
        let task = tokio::task::spawn_local(async move {
            stream
                .run(session.as_ref(), |media| {
                    if let Some(inner) = weak.upgrade() {
                        SessionController { inner }.publish_layers(generation, media);
                    }
                })
                .await;
        });
        let mut shared = self.inner.shared.borrow_mut();
        if let Some(previous) = shared.resources.layer_task.replace(task) {
            previous.abort();
        }
    }

    fn publish_layers(&self, generation: u64, media: MediaLayers) {
        let menu = {
            let mut shared = self.inner.shared.borrow_mut();
            if !shared.is_current(generation) {
                return;
            }
            let menu = media.menu();
            shared.layers = Some(media);
            menu
        };
        debug!(enabled = menu.enabled, options = menu.options.len(), "layers updated");
        self.inner.host.emit(&ViewerEvent::Layers { menu });
    }
}

fn add_receivers(peer: &dyn PeerConnection) -> Result<(), NegotiationError> {
    peer.add_transceiver(MediaKind::Video)?;
    peer.add_transceiver(MediaKind::Audio)
}

async fn stop_session(session: &dyn SignalingSession) {
    if let Err(e) = session.stop().await {
        debug!(session = %session.id(), error = %e, "session stop failed");
    }
}

async fn fire_retry(inner: Weak<Inner>) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let url = {
        let mut shared = inner.shared.borrow_mut();
        shared.retry.clear();
        shared.url.clone()
    };
    info!(url = %url, "reconnecting");
    if let Err(e) = (SessionController { inner }).start(&url).await {
        debug!(url = %url, error = %e, "reconnect attempt failed");
    }
}

//! Scripted host, peer, and transport doubles for controller tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use layers::LayerSelection;
use serde_json::Value;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::events::ViewerEvent;
use crate::host::{HostSurface, MediaKind, MediaStream, PeerConnection, PeerFactory};
use crate::session::SessionController;
use crate::transport::{LayerEventSource, NegotiationError, Negotiator, SignalingSession, SseEvent};

pub const URL: &str = "https://edge.test/whep/cam1";

/// Let spawned local tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Advance paused time by `ms` and let woken tasks run.
pub async fn advance_ms(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    settle().await;
}

pub fn not_found() -> NegotiationError {
    NegotiationError::Status { status: 404, reason: "Not Found".into(), body: String::new() }
}

pub fn layers_payload() -> String {
    serde_json::json!({
        "medias": [{
            "active": [
                { "id": "h", "bitrate": 2_500_000 },
                { "id": "l", "bitrate": 500_000 }
            ],
            "layers": [
                { "encodingId": "h", "bitrate": 2_500_000, "width": 1280 },
                { "encodingId": "l", "bitrate": 500_000, "width": 640 }
            ]
        }]
    })
    .to_string()
}

// =============================================================================
// Host
// =============================================================================

#[derive(Default)]
pub struct MockHost {
    pub events: RefCell<Vec<ViewerEvent>>,
    pub attached: RefCell<Vec<MediaStream>>,
    pub plays: Cell<u32>,
    pub pauses: Cell<u32>,
    pub play_fails: Cell<bool>,
}

impl MockHost {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(ViewerEvent::name).collect()
    }
}

#[async_trait(?Send)]
impl HostSurface for MockHost {
    fn attach_stream(&self, stream: &MediaStream) {
        self.attached.borrow_mut().push(stream.clone());
    }

    async fn play(&self) -> Result<(), ViewerError> {
        self.plays.set(self.plays.get() + 1);
        if self.play_fails.get() {
            return Err(ViewerError::Playback("autoplay blocked".into()));
        }
        Ok(())
    }

    fn pause(&self) {
        self.pauses.set(self.pauses.get() + 1);
    }

    fn emit(&self, event: &ViewerEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// =============================================================================
// Peer
// =============================================================================

#[derive(Default)]
pub struct MockPeer {
    pub transceivers: RefCell<Vec<MediaKind>>,
    pub answer: RefCell<Option<String>>,
    pub closes: Cell<u32>,
}

#[async_trait(?Send)]
impl PeerConnection for MockPeer {
    fn add_transceiver(&self, kind: MediaKind) -> Result<(), NegotiationError> {
        self.transceivers.borrow_mut().push(kind);
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, NegotiationError> {
        Ok("v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\n".into())
    }

    async fn apply_answer(&self, sdp: &str) -> Result<(), NegotiationError> {
        *self.answer.borrow_mut() = Some(sdp.to_owned());
        Ok(())
    }

    fn close(&self) {
        self.closes.set(self.closes.get() + 1);
    }
}

#[derive(Default)]
pub struct MockPeerFactory {
    pub peers: RefCell<Vec<Rc<MockPeer>>>,
    pub fail: Cell<bool>,
}

impl MockPeerFactory {
    pub fn peer(&self, index: usize) -> Rc<MockPeer> {
        self.peers.borrow()[index].clone()
    }
}

impl PeerFactory for MockPeerFactory {
    fn create(&self) -> Result<Rc<dyn PeerConnection>, NegotiationError> {
        if self.fail.get() {
            return Err(NegotiationError::Peer("RTCPeerConnection unavailable".into()));
        }
        let peer = Rc::new(MockPeer::default());
        self.peers.borrow_mut().push(peer.clone());
        Ok(peer)
    }
}

// =============================================================================
// Transport
// =============================================================================

pub struct MockSource {
    events: VecDeque<SseEvent>,
    hold_open: bool,
}

#[async_trait(?Send)]
impl LayerEventSource for MockSource {
    async fn next_event(&mut self) -> Option<Result<SseEvent, NegotiationError>> {
        if let Some(event) = self.events.pop_front() {
            return Some(Ok(event));
        }
        if self.hold_open {
            std::future::pending::<()>().await;
        }
        None
    }
}

pub struct MockSession {
    pub id: String,
    pub stops: Cell<u32>,
    pub polls: Cell<u32>,
    pub selections: RefCell<Vec<Value>>,
    /// Polls that return no channel before it becomes available.
    pub source_after: Cell<Option<u32>>,
    events: RefCell<Option<Vec<SseEvent>>>,
    hold_open: bool,
}

impl MockSession {
    fn new(id: String, source_after: Option<u32>, events: Vec<SseEvent>, hold_open: bool) -> Self {
        Self {
            id,
            stops: Cell::new(0),
            polls: Cell::new(0),
            selections: RefCell::new(Vec::new()),
            source_after: Cell::new(source_after),
            events: RefCell::new(Some(events)),
            hold_open,
        }
    }
}

#[async_trait(?Send)]
impl SignalingSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn stop(&self) -> Result<(), NegotiationError> {
        self.stops.set(self.stops.get() + 1);
        Ok(())
    }

    async fn event_source(&self) -> Option<Box<dyn LayerEventSource>> {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        let ready_after = self.source_after.get()?;
        if polls <= ready_after {
            return None;
        }
        let events = self.events.borrow_mut().take()?;
        Some(Box::new(MockSource { events: events.into(), hold_open: self.hold_open }))
    }

    async fn select_layer(&self, selection: &LayerSelection) -> Result<(), NegotiationError> {
        self.selections.borrow_mut().push(selection.to_json());
        Ok(())
    }
}

/// Negotiator that replays scripted outcomes, then succeeds.
#[derive(Default)]
pub struct MockNegotiator {
    pub script: RefCell<VecDeque<Result<(), NegotiationError>>>,
    pub calls: RefCell<Vec<String>>,
    pub sessions: RefCell<Vec<Rc<MockSession>>>,
    /// How long each negotiation takes.
    pub latency: Cell<Duration>,
    /// Channel availability for new sessions: `None` never opens.
    pub source_after: Cell<Option<u32>>,
    pub layer_events: RefCell<Vec<SseEvent>>,
    pub hold_open: Cell<bool>,
}

impl MockNegotiator {
    pub fn push(&self, outcome: Result<(), NegotiationError>) {
        self.script.borrow_mut().push_back(outcome);
    }

    pub fn session(&self, index: usize) -> Rc<MockSession> {
        self.sessions.borrow()[index].clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait(?Send)]
impl Negotiator for MockNegotiator {
    async fn negotiate(
        &self,
        peer: Rc<dyn PeerConnection>,
        url: &str,
    ) -> Result<Rc<dyn SignalingSession>, NegotiationError> {
        self.calls.borrow_mut().push(url.to_owned());
        let latency = self.latency.get();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let outcome = self.script.borrow_mut().pop_front().unwrap_or(Ok(()));
        outcome?;

        peer.create_offer().await?;
        peer.apply_answer("v=0\r\n").await?;
        let index = self.sessions.borrow().len();
        let session = Rc::new(MockSession::new(
            format!("{url}/sessions/{index}"),
            self.source_after.get(),
            self.layer_events.borrow().clone(),
            self.hold_open.get(),
        ));
        self.sessions.borrow_mut().push(session.clone());
        Ok(session)
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub host: Rc<MockHost>,
    pub peers: Rc<MockPeerFactory>,
    pub negotiator: Rc<MockNegotiator>,
    pub controller: SessionController,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ViewerConfig::new(URL))
    }

    pub fn with_config(config: ViewerConfig) -> Self {
        let host = Rc::new(MockHost::default());
        let peers = Rc::new(MockPeerFactory::default());
        let negotiator = Rc::new(MockNegotiator::default());
        let controller = SessionController::new(config, host.clone(), peers.clone(), negotiator.clone());
        Self { host, peers, negotiator, controller }
    }
}

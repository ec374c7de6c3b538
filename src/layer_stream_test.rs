use std::rc::Rc;
use std::time::Duration;

use tokio::task::LocalSet;

use super::*;
use crate::config::LayerPollPolicy;
use crate::host::PeerConnection;
use crate::test_helpers::*;
use crate::transport::{Negotiator, SseEvent};

async fn session_with(source_after: Option<u32>, events: Vec<SseEvent>) -> Rc<dyn SignalingSession> {
    let negotiator = MockNegotiator::default();
    negotiator.source_after.set(source_after);
    *negotiator.layer_events.borrow_mut() = events;
    let peer: Rc<dyn PeerConnection> = Rc::new(MockPeer::default());
    negotiator.negotiate(peer, URL).await.unwrap()
}

fn capped(max: u32) -> LayerPollPolicy {
    LayerPollPolicy { interval: Duration::from_millis(1000), max_attempts: Some(max) }
}

#[tokio::test(start_paused = true)]
async fn channel_available_immediately() {
    let session = session_with(Some(0), Vec::new()).await;
    let stream = LayerStream::new(LayerPollPolicy::default());
    assert!(stream.wait_for_source(session.as_ref()).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn poll_cap_reports_unavailable() {
    let session = session_with(None, Vec::new()).await;
    let started = tokio::time::Instant::now();

    let err = LayerStream::new(capped(3)).wait_for_source(session.as_ref()).await.err().unwrap();

    assert!(matches!(err, ViewerError::LayerStreamUnavailable { attempts: 3 }));
    // Three checks, two waits between them.
    assert_eq!(started.elapsed(), Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn run_republishes_layers_until_channel_closes() {
    LocalSet::new()
        .run_until(async {
            let session = session_with(
                Some(1),
                vec![
                    SseEvent::new("layers", &layers_payload()),
                    SseEvent::new("ping", ""),
                    SseEvent::new("layers", r#"{"medias":[]}"#),
                    SseEvent::new("layers", r#"{"medias":[{"active":[],"layers":[]}]}"#),
                ],
            )
            .await;
            let mut seen = Vec::new();

            LayerStream::new(LayerPollPolicy::default()).run(session.as_ref(), |media| seen.push(media)).await;

            assert_eq!(seen.len(), 2);
            assert_eq!(seen[0].active.len(), 2);
            assert!(seen[1].active.is_empty());
            assert!(!seen[1].menu().enabled);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn run_without_channel_returns_quietly_when_capped() {
    let session = session_with(None, Vec::new()).await;
    let mut calls = 0;
    LayerStream::new(capped(2)).run(session.as_ref(), |_| calls += 1).await;
    assert_eq!(calls, 0);
}

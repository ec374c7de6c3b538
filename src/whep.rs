//! WHEP over HTTP: the `reqwest` implementation of the negotiation transport.
//!
//! PROTOCOL
//! ========
//! - `POST <endpoint>` with the SDP offer (`application/sdp`). A success
//!   status carries the SDP answer and a `Location` naming the session
//!   resource. `DELETE <resource>` ends the session.
//! - `Link` headers advertise extensions. The server-sent-events link is
//!   subscribed by `POST`ing the JSON list of wanted events and then `GET`ting
//!   the `Location` it returns as `text/event-stream`. The layer link accepts
//!   a `POST` of the layer selection JSON.
//! - All URLs are resolved against the URL of the response that named them.

#[cfg(test)]
#[path = "whep_test.rs"]
mod whep_test;

use std::cell::Cell;
use std::pin::Pin;
use std::rc::Rc;

use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use layers::{LAYERS_EVENT, LayerSelection};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, LINK, LOCATION};
use reqwest::{RequestBuilder, Response, Url};
use tracing::{debug, info};

use crate::host::PeerConnection;
use crate::transport::{LayerEventSource, NegotiationError, Negotiator, SignalingSession, SseEvent};

/// Link relation of the server-sent events extension.
pub const SSE_LINK_REL: &str = "urn:ietf:params:whep:ext:core:server-sent-events";
/// Link relation of the layer selection extension.
pub const LAYER_LINK_REL: &str = "urn:ietf:params:whep:ext:core:layer";

const SDP_CONTENT_TYPE: &str = "application/sdp";
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Extension URLs a WHEP endpoint advertised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhepLinks {
    pub sse: Option<Url>,
    pub layer: Option<Url>,
}

impl WhepLinks {
    /// Collect the known extension links from `headers`, resolved against `base`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, base: &Url) -> Self {
        let mut links = Self::default();
        for value in headers.get_all(LINK) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for (target, rels) in parse_link_header(value) {
                let Ok(url) = base.join(&target) else {
                    debug!(target = %target, "ignoring unresolvable link");
                    continue;
                };
                for rel in rels.split_whitespace() {
                    match rel {
                        SSE_LINK_REL => links.sse = Some(url.clone()),
                        LAYER_LINK_REL => links.layer = Some(url.clone()),
                        _ => {}
                    }
                }
            }
        }
        links
    }
}

/// Split a `Link` header value into `(target, rel)` pairs.
///
/// Links without a `rel` parameter are dropped.
#[must_use]
pub fn parse_link_header(value: &str) -> Vec<(String, String)> {
    value
        .split('<')
        .skip(1)
        .filter_map(|link| {
            let (target, params) = link.split_once('>')?;
            let rel = params.split(';').find_map(|param| {
                let (key, value) = param.split_once('=')?;
                (key.trim().eq_ignore_ascii_case("rel"))
                    .then(|| value.trim().trim_end_matches(',').trim().trim_matches('"').to_owned())
            })?;
            Some((target.trim().to_owned(), rel))
        })
        .collect()
}

/// WHEP HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct WhepClient {
    http: reqwest::Client,
    token: Option<String>,
}

impl WhepClient {
    /// Build a client, optionally sending `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns [`NegotiationError::Request`] if the HTTP client cannot be built.
    pub fn new(token: Option<String>) -> Result<Self, NegotiationError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http(http, token))
    }

    #[must_use]
    pub fn with_http(http: reqwest::Client, token: Option<String>) -> Self {
        Self { http, token }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Subscribe to `events` on the SSE extension and open the stream.
    async fn open_events(&self, sse: &Url, events: &[&str]) -> Result<WhepEventSource, NegotiationError> {
        let response = self.authorize(self.http.post(sse.clone())).json(events).send().await?;
        let response = check_status(response).await?;
        let stream_url = location(&response, sse)?;

        let response = self
            .authorize(self.http.get(stream_url.clone()))
            .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
            .send()
            .await?;
        let response = check_status(response).await?;
        info!(url = %stream_url, "layer event stream opened");
        Ok(WhepEventSource { stream: Box::pin(response.bytes_stream().eventsource()) })
    }
}

#[async_trait(?Send)]
impl Negotiator for WhepClient {
    async fn negotiate(
        &self,
        peer: Rc<dyn PeerConnection>,
        url: &str,
    ) -> Result<Rc<dyn SignalingSession>, NegotiationError> {
        let endpoint =
            Url::parse(url).map_err(|e| NegotiationError::Protocol(format!("invalid endpoint URL {url}: {e}")))?;
        let offer = peer.create_offer().await?;

        let response = self
            .authorize(self.http.post(endpoint.clone()))
            .header(CONTENT_TYPE, SDP_CONTENT_TYPE)
            .body(offer)
            .send()
            .await?;
        let response = check_status(response).await?;
        let resource = location(&response, &endpoint)?;
        let links = WhepLinks::from_headers(response.headers(), &endpoint);
        let answer = response.text().await?;
        peer.apply_answer(&answer).await?;

        info!(
            url = %endpoint,
            resource = %resource,
            sse = links.sse.is_some(),
            layer = links.layer.is_some(),
            "whep session created"
        );
        Ok(Rc::new(WhepSession { client: self.clone(), resource, links, handed_over: Cell::new(false) }))
    }
}

/// Live WHEP session resource.
#[derive(Debug)]
pub struct WhepSession {
    client: WhepClient,
    resource: Url,
    links: WhepLinks,
    handed_over: Cell<bool>,
}

impl WhepSession {
    #[must_use]
    pub fn links(&self) -> &WhepLinks {
        &self.links
    }
}

#[async_trait(?Send)]
impl SignalingSession for WhepSession {
    fn id(&self) -> &str {
        self.resource.as_str()
    }

    async fn stop(&self) -> Result<(), NegotiationError> {
        let response = self.client.authorize(self.client.http.delete(self.resource.clone())).send().await?;
        check_status(response).await?;
        info!(resource = %self.resource, "whep session deleted");
        Ok(())
    }

    async fn event_source(&self) -> Option<Box<dyn LayerEventSource>> {
        if self.handed_over.get() {
            return None;
        }
        let sse = self.links.sse.as_ref()?;
        match self.client.open_events(sse, &[LAYERS_EVENT]).await {
            Ok(source) => {
                self.handed_over.set(true);
                Some(Box::new(source))
            }
            Err(e) => {
                debug!(url = %sse, error = %e, "layer event stream not ready");
                None
            }
        }
    }

    async fn select_layer(&self, selection: &LayerSelection) -> Result<(), NegotiationError> {
        let Some(layer) = &self.links.layer else {
            return Err(NegotiationError::Protocol("endpoint does not support layer selection".into()));
        };
        let response = self.client.authorize(self.client.http.post(layer.clone())).json(selection).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

type EventStream = Pin<Box<dyn Stream<Item = Result<eventsource_stream::Event, EventStreamError<reqwest::Error>>>>>;

/// Open `text/event-stream` response.
pub struct WhepEventSource {
    stream: EventStream,
}

#[async_trait(?Send)]
impl LayerEventSource for WhepEventSource {
    async fn next_event(&mut self) -> Option<Result<SseEvent, NegotiationError>> {
        let next = self.stream.next().await?;
        Some(
            next.map(|event| SseEvent { event: event.event, data: event.data })
                .map_err(|e| NegotiationError::Request(e.to_string())),
        )
    }
}

async fn check_status(response: Response) -> Result<Response, NegotiationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NegotiationError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_owned(),
        body,
    })
}

fn location(response: &Response, base: &Url) -> Result<Url, NegotiationError> {
    let value = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| NegotiationError::Protocol("response has no Location header".into()))?;
    base.join(value)
        .map_err(|e| NegotiationError::Protocol(format!("invalid Location {value}: {e}")))
}

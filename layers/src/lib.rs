//! Simulcast layer model for the WHEP `layers` server-sent event.
//!
//! This crate owns the wire representation of the layer events a WHEP
//! endpoint pushes over its event stream, plus the pure policy derived from
//! them (quality menu labels, bitrate formatting, selection payloads). It has
//! no I/O so the session controller and host UI code can share it.
//!
//! Layer entries keep every field the server sent. A selection echoes the
//! chosen entry back verbatim, so fields this crate does not model (spatial or
//! temporal layer ids, resolution) survive the round trip.

pub mod menu;

pub use menu::{QualityMenu, QualityOption, format_bitrate, quality_labels, quality_menu};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Name of the server-sent event carrying layer updates.
pub const LAYERS_EVENT: &str = "layers";

/// Encoding id that asks the server to pick the layer itself.
pub const AUTO_LAYER_ID: &str = "auto";

/// Error returned by layer decoding and selection.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// The event payload is not valid JSON of the expected shape.
    #[error("failed to decode layer event: {0}")]
    Decode(#[from] serde_json::Error),
    /// The event decoded but its `medias` list is empty.
    #[error("layer event carries no media descriptors")]
    NoMedia,
    /// No layer in the current list carries the requested encoding id.
    #[error("unknown encoding id: {0}")]
    UnknownEncoding(String),
}

/// One encoding the server is able to forward (`layers[]` entry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Layer {
    /// Value of the `encodingId` field (empty when absent).
    pub encoding_id: String,
    /// Bitrate in bits per second (0 when absent).
    pub bitrate: f64,
    raw: Map<String, Value>,
}

impl Layer {
    /// Build a layer carrying only `encodingId` and `bitrate`.
    #[must_use]
    pub fn new(encoding_id: &str, bitrate: f64) -> Self {
        let mut raw = Map::new();
        raw.insert("encodingId".to_owned(), Value::from(encoding_id));
        raw.insert("bitrate".to_owned(), Value::from(bitrate));
        Self::from(raw)
    }

    /// The entry exactly as the server sent it.
    #[must_use]
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl From<Map<String, Value>> for Layer {
    fn from(raw: Map<String, Value>) -> Self {
        Self {
            encoding_id: id_field(&raw, "encodingId"),
            bitrate: bitrate_field(&raw),
            raw,
        }
    }
}

impl From<Layer> for Map<String, Value> {
    fn from(layer: Layer) -> Self {
        layer.raw
    }
}

/// One encoding currently being forwarded (`active[]` entry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct ActiveLayer {
    /// Value of the `id` field; matches a [`Layer::encoding_id`].
    pub id: String,
    /// Bitrate in bits per second (0 when absent).
    pub bitrate: f64,
    raw: Map<String, Value>,
}

impl ActiveLayer {
    /// Build an active entry carrying only `id` and `bitrate`.
    #[must_use]
    pub fn new(id: &str, bitrate: f64) -> Self {
        let mut raw = Map::new();
        raw.insert("id".to_owned(), Value::from(id));
        raw.insert("bitrate".to_owned(), Value::from(bitrate));
        Self::from(raw)
    }
}

impl From<Map<String, Value>> for ActiveLayer {
    fn from(raw: Map<String, Value>) -> Self {
        Self { id: id_field(&raw, "id"), bitrate: bitrate_field(&raw), raw }
    }
}

impl From<ActiveLayer> for Map<String, Value> {
    fn from(layer: ActiveLayer) -> Self {
        layer.raw
    }
}

/// Per-media layer descriptor inside a `layers` event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaLayers {
    /// Encodings currently forwarded to this viewer.
    #[serde(default)]
    pub active: Vec<ActiveLayer>,
    /// Every encoding the server can forward.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl MediaLayers {
    /// Resolve `encoding_id` against the available layers.
    ///
    /// `"auto"` always resolves to [`LayerSelection::Auto`]. Otherwise the
    /// first layer whose `encodingId` matches is selected.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::UnknownEncoding`] when nothing matches.
    pub fn select(&self, encoding_id: &str) -> Result<LayerSelection, LayerError> {
        select_layer(&self.layers, encoding_id)
    }

    /// Quality menu for the currently active encodings.
    #[must_use]
    pub fn menu(&self) -> QualityMenu {
        quality_menu(&self.active)
    }
}

#[derive(Debug, Deserialize)]
struct LayerEvent {
    #[serde(default)]
    medias: Vec<MediaLayers>,
}

/// Decode the `data` of a `layers` event and return its first media.
///
/// # Errors
///
/// Returns [`LayerError::Decode`] for malformed JSON and
/// [`LayerError::NoMedia`] when `medias` is empty or missing.
pub fn decode_layer_event(data: &str) -> Result<MediaLayers, LayerError> {
    let event: LayerEvent = serde_json::from_str(data)?;
    event.medias.into_iter().next().ok_or(LayerError::NoMedia)
}

/// Payload sent to the server's layer endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerSelection {
    /// Let the server choose (`{}` on the wire).
    Auto,
    /// Forward exactly this layer.
    Layer(Layer),
}

impl LayerSelection {
    /// JSON body for the selection request.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Auto => Value::Object(Map::new()),
            Self::Layer(layer) => Value::Object(layer.raw.clone()),
        }
    }
}

impl Serialize for LayerSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => Map::new().serialize(serializer),
            Self::Layer(layer) => layer.raw.serialize(serializer),
        }
    }
}

/// Resolve `encoding_id` against `layers`. See [`MediaLayers::select`].
///
/// # Errors
///
/// Returns [`LayerError::UnknownEncoding`] when nothing matches.
pub fn select_layer(layers: &[Layer], encoding_id: &str) -> Result<LayerSelection, LayerError> {
    if encoding_id == AUTO_LAYER_ID {
        return Ok(LayerSelection::Auto);
    }
    layers
        .iter()
        .find(|layer| layer.encoding_id == encoding_id)
        .cloned()
        .map(LayerSelection::Layer)
        .ok_or_else(|| LayerError::UnknownEncoding(encoding_id.to_owned()))
}

fn id_field(raw: &Map<String, Value>, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn bitrate_field(raw: &Map<String, Value>) -> f64 {
    raw.get("bitrate").and_then(Value::as_f64).unwrap_or(0.0)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

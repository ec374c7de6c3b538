//! Host-facing zoom/pan configuration.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_ZOOM, DEFAULT_ZOOM_STEP, DOUBLE_CLICK_WINDOW_MS, DOUBLE_CLICK_ZOOM, ZOOM_ANIMATION_MS,
};

/// Zoom/pan behaviour for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Interactive zoom/pan is off unless the host opts in.
    pub enabled: bool,
    /// Upper bound on the scale factor.
    pub max_zoom: f64,
    /// Fractional scale change per wheel tick.
    pub zoom_step: f64,
    /// Scale a double-click toggles to from 1:1.
    pub double_click_zoom: f64,
    /// Maximum gap between two pointer-downs forming a double-click.
    pub double_click_window_ms: f64,
    /// Duration of animated zooms.
    pub animation_ms: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            double_click_zoom: DOUBLE_CLICK_ZOOM,
            double_click_window_ms: DOUBLE_CLICK_WINDOW_MS,
            animation_ms: ZOOM_ANIMATION_MS,
        }
    }
}

impl ZoomConfig {
    /// Defaults with zoom/pan switched on.
    #[must_use]
    pub fn enabled() -> Self {
        Self { enabled: true, ..Self::default() }
    }
}

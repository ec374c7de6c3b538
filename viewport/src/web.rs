//! Browser binding: drives a [`GestureRouter`] from DOM events.
//!
//! The host page forwards raw event coordinates (client space) and calls
//! `animation_frame` whenever a handler reports that another frame is wanted.
//! This module is the only place that touches the DOM; everything it applies
//! comes from the router's [`Action`]s.

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::config::ZoomConfig;
use crate::gesture::{Action, GestureRouter};
use crate::transform::{Point, Size};

/// Zoom/pan controller bound to a container, its content, and an optional
/// zoom indicator element.
#[wasm_bindgen]
pub struct Viewport {
    container: HtmlElement,
    content: HtmlElement,
    indicator: Option<HtmlElement>,
    router: GestureRouter,
}

#[wasm_bindgen]
impl Viewport {
    /// Bind to the given elements. `None` limits fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the initial style cannot be written.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: HtmlElement,
        content: HtmlElement,
        indicator: Option<HtmlElement>,
        enabled: bool,
        max_zoom: Option<f64>,
        zoom_step: Option<f64>,
    ) -> Result<Viewport, JsValue> {
        let defaults = ZoomConfig::default();
        let config = ZoomConfig {
            enabled,
            max_zoom: max_zoom.unwrap_or(defaults.max_zoom),
            zoom_step: zoom_step.unwrap_or(defaults.zoom_step),
            ..defaults
        };
        let mut viewport = Self { container, content, indicator, router: GestureRouter::new(config) };
        viewport.content.style().set_property("transform-origin", "center center")?;
        viewport.resize()?;
        Ok(viewport)
    }

    /// Current scale factor.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.router.transform().scale
    }

    /// Re-read the container size. Call after layout changes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn resize(&mut self) -> Result<bool, JsValue> {
        let rect = self.container.get_bounding_client_rect();
        let actions = self.router.set_size(Size::new(rect.width(), rect.height()));
        self.apply(&actions)
    }

    /// Wheel event. Returns `true` when the host should request a frame.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn wheel(&mut self, client_x: f64, client_y: f64, delta_y: f64) -> Result<bool, JsValue> {
        let point = self.local(client_x, client_y);
        let actions = self.router.on_wheel(point, delta_y);
        self.apply(&actions)
    }

    /// Mouse button press.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn pointer_down(&mut self, client_x: f64, client_y: f64) -> Result<bool, JsValue> {
        let point = self.local(client_x, client_y);
        let actions = self.router.on_pointer_down(point, now_ms());
        self.apply(&actions)
    }

    /// Mouse move.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn pointer_move(&mut self, client_x: f64, client_y: f64) -> Result<bool, JsValue> {
        let point = self.local(client_x, client_y);
        let actions = self.router.on_pointer_move(point);
        self.apply(&actions)
    }

    /// Mouse release or the pointer leaving the container.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn pointer_up(&mut self) -> Result<bool, JsValue> {
        let actions = self.router.on_pointer_up();
        self.apply(&actions)
    }

    /// Touch start. `coords` is a flat `[x0, y0, x1, y1, ...]` list of every
    /// active touch in client space.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn touch_start(&mut self, coords: &[f64]) -> Result<bool, JsValue> {
        let touches = self.touches(coords);
        let actions = self.router.on_touch_start(&touches);
        self.apply(&actions)
    }

    /// Touch move, same encoding as [`Viewport::touch_start`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn touch_move(&mut self, coords: &[f64]) -> Result<bool, JsValue> {
        let touches = self.touches(coords);
        let actions = self.router.on_touch_move(&touches);
        self.apply(&actions)
    }

    /// Touch end or cancel, with the touches still down.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn touch_end(&mut self, coords: &[f64]) -> Result<bool, JsValue> {
        let touches = self.touches(coords);
        let actions = self.router.on_touch_end(&touches);
        self.apply(&actions)
    }

    /// Advance the running zoom animation.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn animation_frame(&mut self) -> Result<bool, JsValue> {
        let actions = self.router.on_animation_frame(now_ms());
        self.apply(&actions)
    }

    /// Toggle interactive zoom/pan. Disabling snaps back to 1:1.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<bool, JsValue> {
        let actions = self.router.set_enabled(enabled);
        self.apply(&actions)
    }

    /// Return to 1:1.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a style write fails.
    pub fn reset(&mut self) -> Result<bool, JsValue> {
        let actions = self.router.reset();
        self.apply(&actions)
    }
}

impl Viewport {
    /// Borrow the router, e.g. to inspect the transform.
    #[must_use]
    pub fn router(&self) -> &GestureRouter {
        &self.router
    }

    fn local(&self, client_x: f64, client_y: f64) -> Point {
        let rect = self.container.get_bounding_client_rect();
        Point::new(client_x - rect.left(), client_y - rect.top())
    }

    fn touches(&self, coords: &[f64]) -> Vec<Point> {
        coords.chunks_exact(2).map(|pair| self.local(pair[0], pair[1])).collect()
    }

    /// Carry out the router's actions. Returns whether a frame was requested.
    fn apply(&self, actions: &[Action]) -> Result<bool, JsValue> {
        let mut wants_frame = false;
        for action in actions {
            match action {
                Action::TransformChanged(transform) => {
                    self.content.style().set_property("transform", &transform.css())?;
                    if let Some(indicator) = &self.indicator {
                        let label = transform.zoom_label();
                        indicator.set_text_content(label.as_deref());
                        indicator
                            .style()
                            .set_property("display", if label.is_some() { "block" } else { "none" })?;
                    }
                }
                Action::AnimationFrameRequested => wants_frame = true,
                Action::SetCursor(cursor) => {
                    self.container.style().set_property("cursor", cursor.as_css())?;
                }
            }
        }
        Ok(wants_frame)
    }
}

fn now_ms() -> f64 {
    web_sys::window().and_then(|w| w.performance()).map_or(0.0, |p| p.now())
}

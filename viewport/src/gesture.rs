//! Gesture router: wheel, mouse and touch input mapped onto the transform.
//!
//! `GestureRouter` owns the committed [`Transform`], the container size, and
//! the short-lived state of the gesture in progress. Every handler returns the
//! [`Action`]s the host must carry out (apply a transform, schedule an
//! animation frame, change the cursor). Gesture state never outlives the
//! pointer-up or touch-end that ends it, and any direct input cancels a running
//! zoom animation so only one writer updates the transform at a time.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::animation::{ZoomAnimation, animate_zoom};
use crate::config::ZoomConfig;
use crate::consts::MIN_ZOOM;
use crate::transform::{Point, Size, Transform};

/// Cursor hint for the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Work the host must do after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Apply this transform to the content element.
    TransformChanged(Transform),
    /// Call [`GestureRouter::on_animation_frame`] on the next frame.
    AnimationFrameRequested,
    /// Update the container cursor.
    SetCursor(Cursor),
}

/// Gesture in progress between a press and its release.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum GestureState {
    /// No gesture; waiting for the next press.
    #[default]
    Idle,
    /// Mouse drag. Moves are applied relative to `start`, never compounded.
    Dragging {
        /// Pointer position at press time.
        origin: Point,
        /// Committed transform at press time.
        start: Transform,
    },
    /// Single-finger pan, same rule as `Dragging`.
    TouchPanning { origin: Point, start: Transform },
    /// Two-finger pinch.
    Pinching {
        /// Distance between the two touches when the pinch began.
        baseline_distance: f64,
        /// Scale when the pinch began.
        baseline_scale: f64,
    },
}

/// Interprets raw input into transform updates for one viewer.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    config: ZoomConfig,
    transform: Transform,
    size: Size,
    state: GestureState,
    last_press_ms: Option<f64>,
    animation: Option<ZoomAnimation>,
}

impl GestureRouter {
    #[must_use]
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            transform: Transform::IDENTITY,
            size: Size::default(),
            state: GestureState::Idle,
            last_press_ms: None,
            animation: None,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    #[must_use]
    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Cursor for the current state.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        if !self.config.enabled {
            return Cursor::Default;
        }
        match self.state {
            GestureState::Dragging { .. } => Cursor::Grabbing,
            _ if self.transform.scale > MIN_ZOOM => Cursor::Grab,
            _ => Cursor::Default,
        }
    }

    // --- Host state ---

    /// Record the container size and re-clamp the transform against it.
    pub fn set_size(&mut self, size: Size) -> Vec<Action> {
        self.size = size;
        self.commit(self.transform.clamped(size))
    }

    /// Turn interactive zoom/pan on or off. Turning it off resets the view.
    pub fn set_enabled(&mut self, enabled: bool) -> Vec<Action> {
        self.config.enabled = enabled;
        if enabled {
            return Vec::new();
        }
        self.reset()
    }

    /// Drop all gesture and animation state and return to 1:1.
    pub fn reset(&mut self) -> Vec<Action> {
        self.state = GestureState::Idle;
        self.last_press_ms = None;
        self.animation = None;
        let mut actions = self.commit(Transform::IDENTITY);
        actions.push(Action::SetCursor(self.cursor()));
        actions
    }

    // --- Wheel ---

    /// Zoom in (`delta_y < 0`) or out (`delta_y > 0`) by one step at `point`.
    pub fn on_wheel(&mut self, point: Point, delta_y: f64) -> Vec<Action> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.animation = None;
        let factor = if delta_y > 0.0 { 1.0 - self.config.zoom_step } else { 1.0 + self.config.zoom_step };
        let next = self
            .transform
            .zoom_to_point(self.transform.scale * factor, point, self.size, self.config.max_zoom);
        let mut actions = self.commit(next);
        if !actions.is_empty() {
            actions.push(Action::SetCursor(self.cursor()));
        }
        actions
    }

    // --- Mouse ---

    /// Mouse press at `point`. Two presses within the double-click window
    /// toggle between 1:1 and the double-click zoom instead of dragging.
    pub fn on_pointer_down(&mut self, point: Point, now_ms: f64) -> Vec<Action> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.animation = None;

        let is_double = self
            .last_press_ms
            .is_some_and(|last| now_ms - last < self.config.double_click_window_ms);
        if is_double {
            self.last_press_ms = None;
            self.state = GestureState::Idle;
            let target = if self.transform.scale > MIN_ZOOM { MIN_ZOOM } else { self.config.double_click_zoom };
            return self.animate_to(target, point, now_ms);
        }
        self.last_press_ms = Some(now_ms);

        if self.transform.scale <= MIN_ZOOM {
            self.state = GestureState::Idle;
            return Vec::new();
        }
        self.state = GestureState::Dragging { origin: point, start: self.transform };
        vec![Action::SetCursor(Cursor::Grabbing)]
    }

    /// Mouse move. Only has an effect while dragging.
    pub fn on_pointer_move(&mut self, point: Point) -> Vec<Action> {
        let GestureState::Dragging { origin, start } = self.state else {
            return Vec::new();
        };
        self.commit(start.panned(point.x - origin.x, point.y - origin.y, self.size))
    }

    /// Mouse release. Ends any drag.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !matches!(self.state, GestureState::Dragging { .. }) {
            return Vec::new();
        }
        self.state = GestureState::Idle;
        vec![Action::SetCursor(self.cursor())]
    }

    // --- Touch ---

    /// Touches went down; `touches` lists every active touch.
    pub fn on_touch_start(&mut self, touches: &[Point]) -> Vec<Action> {
        if !self.config.enabled {
            return Vec::new();
        }
        self.animation = None;
        self.begin_touch(touches);
        Vec::new()
    }

    /// Touches moved; `touches` lists every active touch.
    ///
    /// A change in the number of touches re-baselines from the current
    /// transform instead of carrying pinch state into a pan or back.
    pub fn on_touch_move(&mut self, touches: &[Point]) -> Vec<Action> {
        if !self.config.enabled {
            return Vec::new();
        }
        match (self.state, touches) {
            (GestureState::TouchPanning { origin, start }, [touch]) => {
                self.commit(start.panned(touch.x - origin.x, touch.y - origin.y, self.size))
            }
            (GestureState::Pinching { baseline_distance, baseline_scale }, [a, b]) => {
                let scale = a.distance(*b) / baseline_distance * baseline_scale;
                let next = self
                    .transform
                    .zoom_to_point(scale, a.midpoint(*b), self.size, self.config.max_zoom);
                self.commit(next)
            }
            _ => {
                self.begin_touch(touches);
                Vec::new()
            }
        }
    }

    /// Touches lifted; `remaining` lists the touches still down.
    pub fn on_touch_end(&mut self, remaining: &[Point]) -> Vec<Action> {
        if remaining.is_empty() {
            self.state = GestureState::Idle;
        } else {
            self.begin_touch(remaining);
        }
        Vec::new()
    }

    // --- Animation ---

    /// Animate to `target_scale` about `point`, cancelling any running animation.
    pub fn animate_to(&mut self, target_scale: f64, point: Point, now_ms: f64) -> Vec<Action> {
        self.animation = Some(animate_zoom(
            self.transform,
            target_scale,
            point,
            self.size,
            self.config.max_zoom,
            now_ms,
            self.config.animation_ms,
        ));
        vec![Action::AnimationFrameRequested]
    }

    /// Advance the running animation to `now_ms`.
    pub fn on_animation_frame(&mut self, now_ms: f64) -> Vec<Action> {
        let Some(animation) = self.animation else {
            return Vec::new();
        };
        self.transform = animation.sample(now_ms);
        let mut actions = vec![Action::TransformChanged(self.transform)];
        if animation.is_finished(now_ms) {
            self.animation = None;
            actions.push(Action::SetCursor(self.cursor()));
        } else {
            actions.push(Action::AnimationFrameRequested);
        }
        actions
    }

    fn begin_touch(&mut self, touches: &[Point]) {
        self.state = match touches {
            [touch] if self.transform.scale > MIN_ZOOM => {
                GestureState::TouchPanning { origin: *touch, start: self.transform }
            }
            [a, b] if a.distance(*b) > 0.0 => GestureState::Pinching {
                baseline_distance: a.distance(*b),
                baseline_scale: self.transform.scale,
            },
            _ => GestureState::Idle,
        };
    }

    fn commit(&mut self, next: Transform) -> Vec<Action> {
        if next == self.transform {
            return Vec::new();
        }
        self.transform = next;
        vec![Action::TransformChanged(next)]
    }
}

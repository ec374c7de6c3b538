//! Animated zoom: ease-out cubic interpolation between two transforms.
//!
//! An animation is a pure function of the frame timestamp. The owner samples
//! it once per animation frame and drops it when finished; replacing it with
//! a new one is how an in-flight animation is cancelled.

#[cfg(test)]
#[path = "animation_test.rs"]
mod animation_test;

use crate::transform::{Point, Size, Transform};

/// Ease-out cubic: fast start, decelerating finish.
#[must_use]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// A zoom animation from one transform to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnimation {
    from: Transform,
    to: Transform,
    start_ms: f64,
    duration_ms: f64,
}

impl ZoomAnimation {
    #[must_use]
    pub fn new(from: Transform, to: Transform, start_ms: f64, duration_ms: f64) -> Self {
        Self { from, to, start_ms, duration_ms: duration_ms.max(0.0) }
    }

    /// Transform the animation ends on.
    #[must_use]
    pub fn target(&self) -> Transform {
        self.to
    }

    /// Linear progress in `[0, 1]` at `now_ms`.
    #[must_use]
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }

    /// Transform to display at `now_ms`.
    ///
    /// Returns the exact target once finished so a snap to identity stays
    /// exactly identity.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> Transform {
        let progress = self.progress(now_ms);
        if progress >= 1.0 {
            return self.to;
        }
        let eased = ease_out_cubic(progress);
        Transform {
            scale: lerp(self.from.scale, self.to.scale, eased),
            translate_x: lerp(self.from.translate_x, self.to.translate_x, eased),
            translate_y: lerp(self.from.translate_y, self.to.translate_y, eased),
        }
    }
}

/// Build an animation towards what [`Transform::zoom_to_point`] would produce.
#[must_use]
pub fn animate_zoom(
    current: Transform,
    target_scale: f64,
    point: Point,
    size: Size,
    max_zoom: f64,
    start_ms: f64,
    duration_ms: f64,
) -> ZoomAnimation {
    let to = current.zoom_to_point(target_scale, point, size, max_zoom);
    ZoomAnimation::new(current, to, start_ms, duration_ms)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

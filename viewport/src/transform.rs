#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_ZOOM;

/// A point in either screen (container-local CSS pixels) or content space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }
}

/// Size of the content region in CSS pixels, read from the host container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn half(self) -> Point {
        Point { x: self.width * 0.5, y: self.height * 0.5 }
    }
}

/// Zoom/pan state applied to the content element.
///
/// The content is scaled about the center of its own box, then translated.
/// `scale` is never below 1, and at exactly 1 the translation is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// 1:1, no panning.
    pub const IDENTITY: Self = Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 };

    #[must_use]
    pub fn new(scale: f64, translate_x: f64, translate_y: f64) -> Self {
        Self { scale, translate_x, translate_y }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// CSS `transform` value for the content element.
    #[must_use]
    pub fn css(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }

    /// Zoom indicator text such as `"150%"`, or `None` at 1:1.
    #[must_use]
    pub fn zoom_label(&self) -> Option<String> {
        if self.scale <= MIN_ZOOM {
            return None;
        }
        Some(format!("{}%", (self.scale * 100.0).round()))
    }

    /// Map a screen point back to the content point drawn under it.
    #[must_use]
    pub fn screen_to_content(&self, screen: Point, size: Size) -> Point {
        let half = size.half();
        Point {
            x: (screen.x - self.translate_x - half.x) / self.scale + half.x,
            y: (screen.y - self.translate_y - half.y) / self.scale + half.y,
        }
    }

    /// Map a content point to where it is drawn on screen.
    #[must_use]
    pub fn content_to_screen(&self, content: Point, size: Size) -> Point {
        let half = size.half();
        Point {
            x: (content.x - half.x) * self.scale + half.x + self.translate_x,
            y: (content.y - half.y) * self.scale + half.y + self.translate_y,
        }
    }

    /// Zoom to `new_scale` keeping the content under `point` fixed on screen.
    ///
    /// `new_scale` is clamped to `[1, max_zoom]`. A clamped scale of exactly 1
    /// snaps back to [`Transform::IDENTITY`] wherever the point is. The
    /// resulting translation is clamped to the pan boundary.
    #[must_use]
    pub fn zoom_to_point(&self, new_scale: f64, point: Point, size: Size, max_zoom: f64) -> Transform {
        let scale = clamp_scale(new_scale, max_zoom);
        if scale <= MIN_ZOOM {
            return Self::IDENTITY;
        }
        let content = self.screen_to_content(point, size);
        let half = size.half();
        let landed_x = (content.x - half.x) * scale + half.x;
        let landed_y = (content.y - half.y) * scale + half.y;
        let (translate_x, translate_y) = clamp(point.x - landed_x, point.y - landed_y, scale, size);
        Transform { scale, translate_x, translate_y }
    }

    /// Translate by `(dx, dy)` from this transform and clamp.
    #[must_use]
    pub fn panned(&self, dx: f64, dy: f64, size: Size) -> Transform {
        let (translate_x, translate_y) = clamp(self.translate_x + dx, self.translate_y + dy, self.scale, size);
        Transform { scale: self.scale, translate_x, translate_y }
    }

    /// Re-clamp the translation, e.g. after the container was resized.
    #[must_use]
    pub fn clamped(&self, size: Size) -> Transform {
        self.panned(0.0, 0.0, size)
    }
}

/// Allowed translation range for a scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PanBoundary {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl PanBoundary {
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

/// Translation range that keeps the scaled content covering the container.
///
/// At scale 1 or below nothing may move.
#[must_use]
pub fn pan_boundary(scale: f64, size: Size) -> PanBoundary {
    if scale <= MIN_ZOOM {
        return PanBoundary::default();
    }
    let max_x = ((size.width * scale - size.width) / 2.0).max(0.0);
    let max_y = ((size.height * scale - size.height) / 2.0).max(0.0);
    PanBoundary { min_x: -max_x, max_x, min_y: -max_y, max_y }
}

/// Clamp each axis of a translation into [`pan_boundary`].
#[must_use]
pub fn clamp(translate_x: f64, translate_y: f64, scale: f64, size: Size) -> (f64, f64) {
    if scale <= MIN_ZOOM {
        return (0.0, 0.0);
    }
    let bounds = pan_boundary(scale, size);
    (
        translate_x.clamp(bounds.min_x, bounds.max_x),
        translate_y.clamp(bounds.min_y, bounds.max_y),
    )
}

/// Clamp a scale into `[1, max_zoom]`.
#[must_use]
pub fn clamp_scale(scale: f64, max_zoom: f64) -> f64 {
    scale.clamp(MIN_ZOOM, max_zoom.max(MIN_ZOOM))
}

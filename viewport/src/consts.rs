//! Shared numeric constants for the viewport crate.

// ── Zoom limits ─────────────────────────────────────────────────

/// Smallest allowed scale; the content never shrinks below 1:1.
pub const MIN_ZOOM: f64 = 1.0;

/// Default upper bound on the scale factor.
pub const DEFAULT_MAX_ZOOM: f64 = 10.0;

/// Default fractional scale change per wheel tick.
pub const DEFAULT_ZOOM_STEP: f64 = 0.05;

// ── Double-click ────────────────────────────────────────────────

/// Scale a double-click zooms into from 1:1.
pub const DOUBLE_CLICK_ZOOM: f64 = 2.0;

/// Two pointer-downs closer together than this form a double-click.
pub const DOUBLE_CLICK_WINDOW_MS: f64 = 300.0;

// ── Animation ───────────────────────────────────────────────────

/// Default duration of an animated zoom.
pub const ZOOM_ANIMATION_MS: f64 = 300.0;

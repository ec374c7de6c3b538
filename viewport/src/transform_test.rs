#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn size() -> Size {
    Size::new(640.0, 360.0)
}

// --- Point ---

#[test]
fn point_distance() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    assert_eq!(Point::new(0.0, 10.0).midpoint(Point::new(20.0, 30.0)), Point::new(10.0, 20.0));
}

// --- Transform basics ---

#[test]
fn default_is_identity() {
    assert!(Transform::default().is_identity());
    assert_eq!(Transform::default(), Transform::new(1.0, 0.0, 0.0));
}

#[test]
fn css_renders_translate_then_scale() {
    let t = Transform::new(2.5, -10.0, 4.5);
    assert_eq!(t.css(), "translate(-10px, 4.5px) scale(2.5)");
}

#[test]
fn zoom_label_hidden_at_one() {
    assert_eq!(Transform::IDENTITY.zoom_label(), None);
}

#[test]
fn zoom_label_rounds_percentage() {
    assert_eq!(Transform::new(1.05, 0.0, 0.0).zoom_label().as_deref(), Some("105%"));
    assert_eq!(Transform::new(2.0, 0.0, 0.0).zoom_label().as_deref(), Some("200%"));
}

// --- screen_to_content / content_to_screen ---

#[test]
fn screen_to_content_identity() {
    let p = Transform::IDENTITY.screen_to_content(Point::new(50.0, 75.0), size());
    assert!(point_approx_eq(p, Point::new(50.0, 75.0)));
}

#[test]
fn screen_to_content_scales_about_center() {
    let t = Transform::new(2.0, 0.0, 0.0);
    // The container center is a fixed point of a pure scale.
    let center = t.screen_to_content(Point::new(320.0, 180.0), size());
    assert!(point_approx_eq(center, Point::new(320.0, 180.0)));
    let corner = t.screen_to_content(Point::new(0.0, 0.0), size());
    assert!(point_approx_eq(corner, Point::new(160.0, 90.0)));
}

#[test]
fn screen_to_content_accounts_for_translation() {
    let t = Transform::new(2.0, 40.0, -20.0);
    let p = t.screen_to_content(Point::new(360.0, 160.0), size());
    assert!(point_approx_eq(p, Point::new(320.0, 180.0)));
}

#[test]
fn round_trip_holds_across_scales() {
    for scale in [1.0, 1.05, 2.0, 3.7, 10.0] {
        let bounds = pan_boundary(scale, size());
        let t = Transform::new(scale, bounds.max_x * 0.5, bounds.min_y * 0.25);
        for p in [Point::new(0.0, 0.0), Point::new(123.4, 56.7), Point::new(640.0, 360.0), Point::new(-20.0, 400.0)] {
            let back = t.screen_to_content(t.content_to_screen(p, size()), size());
            assert!(point_approx_eq(back, p), "scale {scale}: {p:?} -> {back:?}");
        }
    }
}

// --- pan_boundary / clamp ---

#[test]
fn pan_boundary_is_zero_at_scale_one() {
    assert_eq!(pan_boundary(1.0, size()), PanBoundary::default());
}

#[test]
fn pan_boundary_is_zero_below_scale_one() {
    assert_eq!(pan_boundary(0.5, size()), PanBoundary::default());
}

#[test]
fn pan_boundary_grows_with_scale() {
    let b = pan_boundary(2.0, size());
    assert!(approx_eq(b.max_x, 320.0));
    assert!(approx_eq(b.min_x, -320.0));
    assert!(approx_eq(b.max_y, 180.0));
    assert!(approx_eq(b.min_y, -180.0));
}

#[test]
fn clamp_at_scale_one_is_origin() {
    assert_eq!(clamp(500.0, -500.0, 1.0, size()), (0.0, 0.0));
    assert_eq!(clamp(1.0, 1.0, 1.0, size()), (0.0, 0.0));
}

#[test]
fn clamp_limits_each_axis_independently() {
    let (x, y) = clamp(1000.0, -5.0, 2.0, size());
    assert!(approx_eq(x, 320.0));
    assert!(approx_eq(y, -5.0));
}

#[test]
fn clamp_output_always_within_boundary() {
    for scale in [1.0, 1.5, 4.0, 10.0] {
        let bounds = pan_boundary(scale, size());
        for (tx, ty) in [(-1e6, 1e6), (0.0, 0.0), (33.0, -77.0), (1e6, -1e6)] {
            let (x, y) = clamp(tx, ty, scale, size());
            assert!(bounds.contains(x, y), "scale {scale}: ({x}, {y}) outside {bounds:?}");
        }
    }
}

#[test]
fn clamp_scale_limits() {
    assert_eq!(clamp_scale(0.2, 10.0), 1.0);
    assert_eq!(clamp_scale(20.0, 10.0), 10.0);
    assert_eq!(clamp_scale(3.0, 10.0), 3.0);
}

// --- zoom_to_point ---

#[test]
fn zoom_to_point_snaps_to_identity_at_one() {
    let zoomed = Transform::new(3.0, 100.0, -50.0);
    for p in [Point::new(0.0, 0.0), Point::new(600.0, 10.0), Point::new(-5.0, 900.0)] {
        assert!(zoomed.zoom_to_point(0.9, p, size(), 10.0).is_identity());
        assert!(zoomed.zoom_to_point(1.0, p, size(), 10.0).is_identity());
    }
}

#[test]
fn zoom_to_point_keeps_point_fixed() {
    let p = Point::new(100.0, 50.0);
    let before = Transform::IDENTITY.screen_to_content(p, size());
    let t = Transform::IDENTITY.zoom_to_point(1.05, p, size(), 10.0);
    assert!(approx_eq(t.scale, 1.05));
    let after = t.screen_to_content(p, size());
    assert!(point_approx_eq(before, after));
}

#[test]
fn zoom_to_point_at_center_has_no_translation() {
    let t = Transform::IDENTITY.zoom_to_point(4.0, Point::new(320.0, 180.0), size(), 10.0);
    assert!(approx_eq(t.translate_x, 0.0));
    assert!(approx_eq(t.translate_y, 0.0));
}

#[test]
fn zoom_to_point_clamps_scale_to_max() {
    let t = Transform::IDENTITY.zoom_to_point(50.0, Point::new(320.0, 180.0), size(), 10.0);
    assert_eq!(t.scale, 10.0);
}

#[test]
fn zoom_to_point_result_is_clamped() {
    // Zooming in at a corner from an already panned state must stay in bounds.
    let start = Transform::new(2.0, 320.0, 180.0);
    let t = start.zoom_to_point(3.0, Point::new(0.0, 0.0), size(), 10.0);
    assert!(pan_boundary(t.scale, size()).contains(t.translate_x, t.translate_y));
}

#[test]
fn zoom_to_point_composes_from_non_identity() {
    let start = Transform::IDENTITY.zoom_to_point(2.0, Point::new(200.0, 100.0), size(), 10.0);
    let p = Point::new(250.0, 140.0);
    let before = start.screen_to_content(p, size());
    let t = start.zoom_to_point(2.5, p, size(), 10.0);
    assert!(point_approx_eq(t.screen_to_content(p, size()), before));
}

// --- panned / clamped ---

#[test]
fn panned_moves_and_clamps() {
    let t = Transform::new(2.0, 0.0, 0.0).panned(50.0, 1000.0, size());
    assert!(approx_eq(t.translate_x, 50.0));
    assert!(approx_eq(t.translate_y, 180.0));
}

#[test]
fn clamped_after_shrinking_container() {
    let t = Transform::new(2.0, 300.0, 0.0).clamped(Size::new(100.0, 100.0));
    assert!(approx_eq(t.translate_x, 50.0));
}

use approx::assert_relative_eq;
use proptest::prelude::*;

use folio_core::transform::geometry::{available_area, fit_scale, pan_bound};
use folio_core::transform::{
    Overlay, PointerEvent, Rotation, Size, TransformSettings, TransformState, Vec2,
};

/// 800x600 content in a 400x400 container with 50px strips top and bottom,
/// leaving a 400x300 content area.
fn state() -> TransformState {
    let mut t = TransformState::new(TransformSettings::default());
    t.set_container_size(Size::new(400.0, 400.0));
    t.set_overlay(Overlay::new(50.0, 50.0));
    t.set_natural_size(Size::new(800.0, 600.0));
    t
}

fn drag(t: &mut TransformState, from: Vec2, to: Vec2) {
    t.handle_pointer(PointerEvent::Down(from));
    t.handle_pointer(PointerEvent::Move(to));
    t.handle_pointer(PointerEvent::Up);
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn test_available_area_subtracts_overlay() {
    let area = available_area(Size::new(400.0, 400.0), Overlay::new(50.0, 30.0));
    assert_relative_eq!(area.w, 400.0);
    assert_relative_eq!(area.h, 320.0);
}

#[test]
fn test_available_height_never_below_one() {
    let area = available_area(Size::new(400.0, 60.0), Overlay::new(50.0, 50.0));
    assert_relative_eq!(area.h, 1.0);
}

#[test]
fn test_fit_scale_unknown_content_is_one() {
    assert_relative_eq!(fit_scale(None, Size::new(400.0, 300.0)), 1.0);
    assert_relative_eq!(fit_scale(Some(Size::new(0.0, 10.0)), Size::new(400.0, 300.0)), 1.0);
}

#[test]
fn test_base_scale_fits_content() {
    let t = state();
    assert_relative_eq!(t.base_scale(), 0.5);
    assert_relative_eq!(t.effective_scale(), 0.5);
}

#[test]
fn test_rotation_transposes_displayed_size() {
    let mut t = state();
    t.rotate_clockwise();
    let displayed = t.displayed_size().unwrap();
    assert_relative_eq!(displayed.w, 600.0);
    assert_relative_eq!(displayed.h, 800.0);
    assert_relative_eq!(t.base_scale(), 0.375);
}

#[test]
fn test_pan_bound_includes_padding() {
    let mut t = state();
    t.set_zoom(200.0);
    let bound = t.pan_bound();
    assert_relative_eq!(bound.x, (400.0 + 24.0) / 2.0);
    assert_relative_eq!(bound.y, (300.0 + 24.0) / 2.0);
}

#[test]
fn test_pan_bound_without_excess_is_half_padding() {
    let bound = pan_bound(
        Some(Size::new(100.0, 100.0)),
        Size::new(400.0, 300.0),
        1.0,
        24.0,
    );
    assert_relative_eq!(bound.x, 12.0);
    assert_relative_eq!(bound.y, 12.0);
}

#[test]
fn test_render_transform_centers_in_available_area() {
    let t = state();
    let rt = t.render_transform();
    assert_relative_eq!(rt.center.x, 200.0);
    assert_relative_eq!(rt.center.y, 50.0 + 150.0);
    let drawn = rt.drawn_size.unwrap();
    assert_relative_eq!(drawn.w, 400.0);
    assert_relative_eq!(drawn.h, 300.0);
}

// ---------------------------------------------------------------------------
// Zoom
// ---------------------------------------------------------------------------

#[test]
fn test_zoom_is_clamped() {
    let mut t = state();
    t.set_zoom(1000.0);
    assert_relative_eq!(t.zoom_percent(), 400.0);
    t.set_zoom(1.0);
    assert_relative_eq!(t.zoom_percent(), 25.0);
    t.set_zoom(f32::NAN);
    assert_relative_eq!(t.zoom_percent(), 25.0);
}

#[test]
fn test_wheel_steps_by_ten() {
    let mut t = state();
    t.wheel(1.0);
    assert_relative_eq!(t.zoom_percent(), 110.0);
    t.wheel(-3.0);
    t.wheel(-1.0);
    assert_relative_eq!(t.zoom_percent(), 90.0);
    t.wheel(0.0);
    assert_relative_eq!(t.zoom_percent(), 90.0);
}

#[test]
fn test_zoom_reclamps_instead_of_resetting_pan() {
    let mut t = state();
    t.set_zoom(400.0);
    drag(&mut t, Vec2::ZERO, Vec2::new(100.0, 50.0));
    assert_eq!(t.pan_offset(), Vec2::new(100.0, 50.0));

    // Still inside the smaller bound: unchanged.
    t.set_zoom(300.0);
    assert_eq!(t.pan_offset(), Vec2::new(100.0, 50.0));

    // 150% draws 600x450: bound (112, 87).
    t.set_zoom(150.0);
    assert_relative_eq!(t.pan_offset().x, 100.0);
    assert_relative_eq!(t.pan_offset().y, 50.0);

    // 110% draws 440x330: bound (32, 27).
    t.set_zoom(110.0);
    assert_relative_eq!(t.pan_offset().x, 32.0);
    assert_relative_eq!(t.pan_offset().y, 27.0);
}

// ---------------------------------------------------------------------------
// Pan
// ---------------------------------------------------------------------------

#[test]
fn test_pan_inactive_at_fit_zoom() {
    let mut t = state();
    assert!(!t.pan_enabled());
    drag(&mut t, Vec2::ZERO, Vec2::new(10.0, 10.0));
    assert_eq!(t.pan_offset(), Vec2::ZERO);
}

#[test]
fn test_drag_is_relative_to_start_offset() {
    let mut t = state();
    t.set_zoom(200.0);
    drag(&mut t, Vec2::new(10.0, 10.0), Vec2::new(30.0, 40.0));
    assert_eq!(t.pan_offset(), Vec2::new(20.0, 30.0));

    drag(&mut t, Vec2::new(100.0, 100.0), Vec2::new(90.0, 100.0));
    assert_eq!(t.pan_offset(), Vec2::new(10.0, 30.0));
}

#[test]
fn test_drag_is_clamped_to_bound() {
    let mut t = state();
    t.set_zoom(200.0);
    drag(&mut t, Vec2::ZERO, Vec2::new(-5000.0, 5000.0));
    assert_relative_eq!(t.pan_offset().x, -212.0);
    assert_relative_eq!(t.pan_offset().y, 162.0);
}

#[test]
fn test_moves_after_release_are_ignored() {
    let mut t = state();
    t.set_zoom(200.0);
    t.handle_pointer(PointerEvent::Down(Vec2::ZERO));
    assert!(t.handle_pointer(PointerEvent::Move(Vec2::new(5.0, 5.0))));
    t.handle_pointer(PointerEvent::Leave);
    assert!(!t.is_dragging());
    assert!(!t.handle_pointer(PointerEvent::Move(Vec2::new(50.0, 50.0))));
    assert_eq!(t.pan_offset(), Vec2::new(5.0, 5.0));
}

#[test]
fn test_shrinking_container_reclamps_pan() {
    let mut t = state();
    t.set_zoom(200.0);
    drag(&mut t, Vec2::ZERO, Vec2::new(200.0, 0.0));
    t.set_container_size(Size::new(800.0, 400.0));
    // 800x300 available, drawn at base 0.5*2: 800x600 → x excess 0.
    assert_relative_eq!(t.pan_offset().x, 12.0);
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

#[test]
fn test_rotate_resets_pan_but_keeps_zoom() {
    let mut t = state();
    t.set_zoom(200.0);
    drag(&mut t, Vec2::ZERO, Vec2::new(40.0, 40.0));
    assert_ne!(t.pan_offset(), Vec2::ZERO);

    t.rotate_clockwise();
    assert_eq!(t.rotation(), Rotation::Deg90);
    assert_eq!(t.pan_offset(), Vec2::ZERO);
    assert_relative_eq!(t.zoom_percent(), 200.0);
}

#[test]
fn test_counter_clockwise_from_zero_is_270() {
    let mut t = state();
    t.rotate_counter_clockwise();
    assert_eq!(t.rotation(), Rotation::Deg270);
    assert_eq!(t.rotation().to_string(), "270°");
}

#[test]
fn test_reset_keeps_viewport_measurements() {
    let mut t = state();
    t.set_zoom(250.0);
    t.rotate_by(2);
    t.reset();
    assert_eq!(t.rotation(), Rotation::Deg0);
    assert_relative_eq!(t.zoom_percent(), 100.0);
    assert_eq!(t.natural_size(), None);
    assert_eq!(t.container_size(), Size::new(400.0, 400.0));
    assert_eq!(t.overlay(), Overlay::new(50.0, 50.0));
}

#[test]
fn test_reset_zoom_recenters() {
    let mut t = state();
    t.set_zoom(300.0);
    t.rotate_clockwise();
    drag(&mut t, Vec2::ZERO, Vec2::new(30.0, 30.0));
    t.reset_zoom();
    assert_relative_eq!(t.zoom_percent(), 100.0);
    assert_eq!(t.pan_offset(), Vec2::ZERO);
    assert_eq!(t.rotation(), Rotation::Deg90);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    Rotate(i32),
    Zoom(f32),
    Wheel(f32),
    Drag(f32, f32, f32, f32),
    Container(f32, f32),
    Overlay(f32, f32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-3i32..=3).prop_map(Op::Rotate),
        (-100.0f32..1000.0).prop_map(Op::Zoom),
        (-5.0f32..5.0).prop_map(Op::Wheel),
        (-500.0f32..500.0, -500.0f32..500.0, -2000.0f32..2000.0, -2000.0f32..2000.0)
            .prop_map(|(a, b, c, d)| Op::Drag(a, b, c, d)),
        (0.0f32..2000.0, 0.0f32..2000.0).prop_map(|(w, h)| Op::Container(w, h)),
        (0.0f32..300.0, 0.0f32..300.0).prop_map(|(t, b)| Op::Overlay(t, b)),
    ]
}

fn apply(t: &mut TransformState, op: &Op) {
    match *op {
        Op::Rotate(q) => t.rotate_by(q),
        Op::Zoom(z) => t.set_zoom(z),
        Op::Wheel(d) => t.wheel(d),
        Op::Drag(x0, y0, x1, y1) => drag(t, Vec2::new(x0, y0), Vec2::new(x1, y1)),
        Op::Container(w, h) => t.set_container_size(Size::new(w, h)),
        Op::Overlay(top, bottom) => t.set_overlay(Overlay::new(top, bottom)),
    }
}

proptest! {
    #[test]
    fn test_rotation_is_always_canonical(turns in proptest::collection::vec(-1i32..=1, 0..40)) {
        let mut t = state();
        for q in &turns {
            t.rotate_by(*q);
            prop_assert!([0u16, 90, 180, 270].contains(&t.rotation().degrees()));
        }
    }

    #[test]
    fn test_full_turn_returns_to_start(start in 0i32..4, clockwise in any::<bool>()) {
        let mut t = state();
        t.rotate_by(start);
        let before = t.rotation();
        let step = if clockwise { 1 } else { -1 };
        for _ in 0..4 {
            t.rotate_by(step);
        }
        prop_assert_eq!(t.rotation(), before);
    }

    #[test]
    fn test_zoom_always_in_range(values in proptest::collection::vec(-1e6f32..1e6, 1..30)) {
        let mut t = state();
        for v in values {
            t.set_zoom(v);
            prop_assert!((25.0..=400.0).contains(&t.zoom_percent()));
            t.wheel(v);
            prop_assert!((25.0..=400.0).contains(&t.zoom_percent()));
        }
    }

    #[test]
    fn test_pan_offset_within_bound(ops in proptest::collection::vec(op(), 1..60)) {
        let mut t = state();
        for op in &ops {
            apply(&mut t, op);
            let bound = t.pan_bound();
            let offset = t.pan_offset();
            prop_assert!(bound.x >= 0.0 && bound.y >= 0.0);
            prop_assert!(offset.x.abs() <= bound.x + 1e-3);
            prop_assert!(offset.y.abs() <= bound.y + 1e-3);
        }
    }
}

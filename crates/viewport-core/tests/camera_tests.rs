// Host-side tests for the camera controller, animation driver and gesture
// routing. Everything runs without a GPU.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;
use viewport_core::animation::{lerp_angle, Animation};
use viewport_core::camera::{isometric_target, CameraPose};
use viewport_core::constants::{POLAR_MAX, POLAR_MIN, ZOOM_MAX, ZOOM_MIN};
use viewport_core::input::{pinch_multiplier, wheel_multiplier, Interaction};
use viewport_core::{
    CameraController, Resolution, ScreenExtents, ScreenSpec, ViewMode, ViewportConfig,
    ViewportSize,
};

fn two_screens() -> Vec<ScreenSpec> {
    vec![
        ScreenSpec::flat(24.0, Resolution::new(1920, 1080), 600.0, 1),
        ScreenSpec::flat(27.0, Resolution::new(2560, 1440), 900.0, 2),
    ]
}

fn controller() -> CameraController {
    let mut c = CameraController::new(ViewportConfig::default());
    c.resize(ViewportSize::new(1280, 720));
    c.set_extents(ScreenExtents::from_specs(&two_screens()));
    c.retarget();
    settle(&mut c);
    c
}

fn settle(c: &mut CameraController) {
    for _ in 0..5000 {
        if !c.is_animating() {
            return;
        }
        c.tick();
    }
    panic!("camera never converged");
}

fn assert_pose_eq(a: CameraPose, b: CameraPose) {
    assert!(a.position.distance(b.position) < 1e-4, "{a:?} vs {b:?}");
    assert!(a.look_at.distance(b.look_at) < 1e-4, "{a:?} vs {b:?}");
    assert!(a.up.distance(b.up) < 1e-4, "{a:?} vs {b:?}");
}

#[test]
fn furthest_distance_drives_isometric_layout() {
    let ext = ScreenExtents::from_specs(&two_screens());
    assert!((ext.furthest_m - 0.9).abs() < 1e-6);
    assert!((ext.nearest_m - 0.6).abs() < 1e-6);

    let cfg = ViewportConfig::default();
    let iso = isometric_target(&ext, &cfg);
    let d = 0.9 * cfg.iso_depth_scale;
    assert!((iso.pose.position.x - d * cfg.iso_side_ratio).abs() < 1e-5);
    assert!((iso.pose.position.y - d * cfg.iso_height_ratio).abs() < 1e-5);
    assert!((iso.pose.position.z - d).abs() < 1e-5);
    assert!((iso.orbit_target - Vec3::new(0.0, 0.0, -0.45)).length() < 1e-6);
}

#[test]
fn empty_screen_set_uses_fallback_distance() {
    let ext = ScreenExtents::from_specs(&[]);
    assert_eq!(ext, ScreenExtents::default());
    assert!(ext.furthest_m > 0.0);
}

#[test]
fn isometric_front_isometric_round_trip_is_idempotent() {
    let mut c = controller();
    assert!(c.set_view_mode(ViewMode::Isometric));
    settle(&mut c);
    let once = c.camera().pose();

    c.set_view_mode(ViewMode::Front);
    settle(&mut c);
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    assert_pose_eq(c.camera().pose(), once);
}

#[test]
fn switching_to_the_active_mode_is_a_no_op() {
    let mut c = controller();
    assert!(!c.set_view_mode(ViewMode::Front));
    assert!(!c.is_animating());
}

#[test]
fn top_view_looks_straight_down_over_the_midpoint() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Top);
    settle(&mut c);
    let pose = c.camera().pose();
    assert!((pose.look_at - Vec3::new(0.0, 0.0, -0.45)).length() < 1e-4);
    assert!((pose.direction() - Vec3::NEG_Y).length() < 1e-4);
    assert!(pose.position.y >= 0.8 - 1e-4);
}

#[test]
fn mode_switch_mid_animation_retargets_in_place() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    for _ in 0..5 {
        c.tick();
    }
    c.set_view_mode(ViewMode::Top);
    assert!(matches!(c.animation(), Animation::Top(_)));
    settle(&mut c);
    assert_eq!(c.mode(), ViewMode::Top);
}

#[test]
fn azimuth_blend_takes_the_short_way() {
    let eps = 0.05;
    let step = lerp_angle(0.0, PI + eps, 0.1);
    assert!(step < 0.0, "moved the long way: {step}");

    let step = lerp_angle(0.0, -(PI + eps), 0.1);
    assert!(step > 0.0, "moved the long way: {step}");

    // Crossing the seam from just below pi toward just above -pi.
    let step = lerp_angle(3.0, -3.0, 0.25);
    assert!(step > 3.0, "moved the long way: {step}");
}

#[test]
fn polar_stays_clamped_under_extreme_drags() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    c.pointer_down(1, Vec2::new(100.0, 100.0));
    let mut y = 100.0;
    for delta in [1e6, -3e6, 2.5e6, -1e7, 4e7] {
        y += delta;
        c.pointer_move(1, Vec2::new(100.0, y));
        let polar = c.orbit().spherical.polar;
        assert!((POLAR_MIN..=POLAR_MAX).contains(&polar), "polar {polar}");
    }
    c.pointer_up(1);
}

#[test]
fn zoom_stays_clamped_under_extreme_wheel_and_pinch() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    for _ in 0..500 {
        c.wheel(120.0);
    }
    assert!((c.zoom().zoom_factor - ZOOM_MIN).abs() < 1e-6);
    for _ in 0..500 {
        c.wheel(-120.0);
    }
    assert!((c.zoom().zoom_factor - ZOOM_MAX).abs() < 1e-6);
    let radius = c.orbit().spherical.radius;
    assert!(radius > 0.0);
    assert!((radius - c.zoom().base_distance / ZOOM_MAX).abs() < 1e-4);

    c.pointer_down(1, Vec2::new(400.0, 300.0));
    c.pointer_down(2, Vec2::new(410.0, 300.0));
    // Pinch fingers together repeatedly: zoom out all the way.
    for i in 0..200 {
        c.pointer_move(2, Vec2::new(410.0 + (i % 2) as f32 * 1000.0, 300.0));
        let z = c.zoom().zoom_factor;
        assert!((ZOOM_MIN..=ZOOM_MAX).contains(&z), "zoom {z}");
    }
}

#[test]
fn spreading_fingers_zooms_in() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    let before = c.zoom().zoom_factor;
    c.pointer_down(1, Vec2::new(400.0, 300.0));
    c.pointer_down(2, Vec2::new(420.0, 300.0));
    c.pointer_move(2, Vec2::new(500.0, 300.0));
    assert!(c.zoom().zoom_factor > before);
    assert!(c.orbit().spherical.radius < c.zoom().base_distance);
}

#[test]
fn releasing_one_pinch_finger_falls_back_to_rotate() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    c.pointer_down(1, Vec2::new(400.0, 300.0));
    c.pointer_down(2, Vec2::new(420.0, 300.0));
    c.pointer_up(2);
    let azimuth = c.orbit().spherical.azimuth;
    c.pointer_move(1, Vec2::new(450.0, 300.0));
    assert!((c.orbit().spherical.azimuth - azimuth).abs() > 1e-3);
}

fn assert_orbit_starts_at_live_camera(c: &mut CameraController) {
    let before = c.camera().pose();
    assert!(c.set_view_mode(ViewMode::Isometric));
    let Animation::Orbit(a) = *c.animation() else {
        panic!("expected an orbit transition, got {:?}", c.animation());
    };
    // The first frame orbits the previous target from exactly where the
    // camera already is.
    assert!(a.pivot.distance(before.look_at) < 1e-5, "{a:?} vs {before:?}");
    let seeded = a.pivot + a.current.to_offset();
    assert!(seeded.distance(before.position) < 1e-4, "{seeded} vs {before:?}");

    let final_position = a.final_position();
    let start_gap = before.position.distance(final_position);
    c.tick();
    let moved = c.camera().eye.distance(before.position);
    assert!(moved < start_gap * 0.25, "first step jumped {moved} of {start_gap}");
    assert!(c.camera().eye.distance(final_position) < start_gap);
}

#[test]
fn entering_isometric_from_top_starts_at_the_top_pose() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Top);
    settle(&mut c);
    assert_orbit_starts_at_live_camera(&mut c);
    settle(&mut c);
    assert_eq!(c.mode(), ViewMode::Isometric);
}

#[test]
fn entering_isometric_from_front_starts_at_the_front_pose() {
    let mut c = controller();
    assert_eq!(c.mode(), ViewMode::Front);
    assert_orbit_starts_at_live_camera(&mut c);
}

#[test]
fn grabbing_mid_transition_stops_the_animation() {
    let mut c = controller();
    c.set_view_mode(ViewMode::Isometric);
    for _ in 0..3 {
        c.tick();
    }
    let eye = c.camera().eye;
    c.pointer_down(1, Vec2::new(10.0, 10.0));
    assert!(!c.is_animating());
    // Spherical state re-derived from the live camera, not the stale target.
    assert!(c.orbit().camera_position().distance(eye) < 1e-4);
}

#[test]
fn gestures_are_gated_by_mode() {
    let mut c = controller();
    // Front: wheel and pinch do nothing.
    let zoom = *c.zoom();
    c.wheel(120.0);
    c.pointer_down(1, Vec2::new(0.0, 0.0));
    c.pointer_down(2, Vec2::new(50.0, 0.0));
    c.pointer_move(2, Vec2::new(300.0, 0.0));
    c.pointer_up(1);
    c.pointer_up(2);
    assert_eq!(*c.zoom(), zoom);
    assert!(matches!(c.interaction(), Interaction::Front(_)));

    // Top: nothing moves the camera.
    c.set_view_mode(ViewMode::Top);
    settle(&mut c);
    let pose = c.camera().pose();
    c.wheel(-120.0);
    c.pointer_down(1, Vec2::new(0.0, 0.0));
    c.pointer_move(1, Vec2::new(200.0, 150.0));
    c.pointer_up(1);
    assert_eq!(c.camera().pose(), pose);
    assert!(matches!(c.interaction(), Interaction::Disabled));

    // Isometric: the wheel zooms.
    c.set_view_mode(ViewMode::Isometric);
    settle(&mut c);
    let before = c.zoom().zoom_factor;
    c.wheel(-120.0);
    assert!(c.zoom().zoom_factor > before);
}

#[test]
fn look_around_is_bounded_and_springs_back() {
    let mut c = controller();
    c.pointer_down(7, Vec2::new(640.0, 360.0));
    c.pointer_move(7, Vec2::new(640.0 + 1e5, 360.0 - 1e5));
    let look = *c.look_around().unwrap();
    assert!((look.yaw.abs() - look.max_yaw).abs() < 1e-6);
    assert!((look.pitch.abs() - look.max_pitch).abs() < 1e-6);
    assert!(!look.spring_back);

    // Held: no decay.
    c.tick();
    assert_eq!(c.look_around().unwrap().yaw, look.yaw);

    c.pointer_up(7);
    assert!(c.look_around().unwrap().spring_back);
    let mut previous = look.yaw.abs();
    for _ in 0..1000 {
        c.tick();
        let yaw = c.look_around().unwrap().yaw.abs();
        assert!(yaw <= previous);
        previous = yaw;
    }
    let settled = c.look_around().unwrap();
    assert_eq!((settled.yaw, settled.pitch), (0.0, 0.0));
    assert!(!settled.spring_back);
}

#[test]
fn look_around_turns_the_rendered_view_only() {
    let mut c = controller();
    c.pointer_down(1, Vec2::new(640.0, 360.0));
    c.pointer_move(1, Vec2::new(700.0, 360.0));
    let base = c.camera().pose();
    let view = c.view_camera().pose();
    assert_eq!(base.position, view.position);
    assert!(base.direction().distance(view.direction()) > 1e-3);
}

#[test]
fn wheel_and_pinch_multipliers() {
    assert_eq!(wheel_multiplier(3.0, 1.1), Some(1.1));
    assert!((wheel_multiplier(-3.0, 1.1).unwrap() - 1.0 / 1.1).abs() < 1e-6);
    assert_eq!(wheel_multiplier(0.0, 1.1), None);
    assert!(pinch_multiplier(100.0, 200.0, 0.5).unwrap() < 1.0);
    assert!(pinch_multiplier(200.0, 100.0, 0.5).unwrap() > 1.0);
    assert_eq!(pinch_multiplier(0.0, 100.0, 0.5), None);
}

// Host-side tests for the engine facade: change detection, debounced
// retargeting, theme and resize handling, all against a recording target.

use instant::Instant;
use std::time::Duration;
use viewport_core::animation::Animation;
use viewport_core::engine::distance_only_change;
use viewport_core::{
    FrameView, RenderTarget, Resolution, ScreenSpec, Theme, ViewMode, ViewportConfig,
    ViewportEngine, ViewportError, ViewportSize,
};

#[derive(Default)]
struct Recorder {
    frames: usize,
    resizes: Vec<ViewportSize>,
    revisions: Vec<u64>,
    fail: bool,
}

impl RenderTarget for Recorder {
    fn resize(&mut self, size: ViewportSize) {
        self.resizes.push(size);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("device lost");
        }
        self.frames += 1;
        self.revisions.push(frame.scene.revision);
        Ok(())
    }
}

fn specs(distances_mm: &[f64]) -> Vec<ScreenSpec> {
    distances_mm
        .iter()
        .enumerate()
        .map(|(i, &d)| ScreenSpec::flat(24.0, Resolution::new(1920, 1080), d, i as u32 + 1))
        .collect()
}

fn engine() -> ViewportEngine<Recorder> {
    let mut e = ViewportEngine::new(ViewportConfig::default(), Recorder::default()).unwrap();
    e.resize(1280, 720).unwrap();
    e
}

fn orbit_pivot(e: &ViewportEngine<Recorder>) -> Option<glam::Vec3> {
    match e.controller().animation() {
        Animation::Orbit(a) => Some(a.target_pivot),
        _ => None,
    }
}

#[test]
fn invalid_config_is_rejected() {
    let config = ViewportConfig {
        lerp_ratio: 1.5,
        ..Default::default()
    };
    let err = ViewportEngine::new(config, Recorder::default()).err().unwrap();
    assert!(matches!(err, ViewportError::InvalidConfig(_)));
}

#[test]
fn unchanged_screens_skip_the_rebuild() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0])).unwrap();
    let rev = e.scene().revision;
    e.update_screens(&specs(&[600.0])).unwrap();
    assert_eq!(e.scene().revision, rev);
    e.update_screens(&specs(&[600.0, 800.0])).unwrap();
    assert!(e.scene().revision > rev);
    assert_eq!(e.scene().screens.len(), 2);
}

#[test]
fn rejected_update_keeps_the_previous_scene() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0])).unwrap();
    let rev = e.scene().revision;
    let err = e.update_screens(&specs(&[600.0, -1.0])).unwrap_err();
    assert!(matches!(err, ViewportError::InvalidSpec { index: 1, .. }));
    assert_eq!(e.scene().revision, rev);
    assert_eq!(e.screens(), specs(&[600.0]).as_slice());
}

#[test]
fn json_updates_parse_then_apply() {
    let mut e = engine();
    e.update_screens_json(
        r#"[{"diagonalInches":34,"resolution":{"widthPx":3440,"heightPx":1440},
            "viewingDistanceMm":700,"curvatureRadiusMm":1500}]"#,
    )
    .unwrap();
    assert!(e.scene().screens[0].panel.is_curved());
    assert!(matches!(
        e.update_screens_json("not json"),
        Err(ViewportError::Json(_))
    ));
}

#[test]
fn distance_only_detection() {
    assert!(distance_only_change(&specs(&[600.0]), &specs(&[650.0])));
    assert!(!distance_only_change(&[], &specs(&[650.0])));
    assert!(!distance_only_change(&specs(&[600.0]), &specs(&[600.0, 700.0])));
    let mut resized = specs(&[600.0]);
    resized[0].diagonal_inches = 27.0;
    assert!(!distance_only_change(&specs(&[600.0]), &resized));
}

#[test]
fn distance_edits_are_debounced_and_reset() {
    let t0 = Instant::now();
    let ms = |n: u64| t0 + Duration::from_millis(n);
    let mut e = engine();
    e.set_view_mode(ViewMode::Isometric);
    e.update_screens_at(&specs(&[600.0]), t0).unwrap();
    assert!(!e.retarget_pending());
    let first = orbit_pivot(&e).unwrap();
    assert!((first.z + 0.3).abs() < 1e-5);

    // Geometry follows at once, the camera waits.
    e.update_screens_at(&specs(&[700.0]), ms(10)).unwrap();
    assert!(e.retarget_pending());
    assert!((e.scene().screens[0].panel.axis_position_m + 0.7).abs() < 1e-5);
    e.tick(ms(100)).unwrap();
    assert!(e.retarget_pending());

    // Another edit restarts the window.
    e.update_screens_at(&specs(&[800.0]), ms(120)).unwrap();
    e.tick(ms(200)).unwrap();
    assert!(e.retarget_pending());
    e.tick(ms(280)).unwrap();
    assert!(!e.retarget_pending());
    let pivot = orbit_pivot(&e).unwrap();
    assert!((pivot.z + 0.4).abs() < 1e-5);
}

#[test]
fn structural_edit_cancels_pending_debounce() {
    let t0 = Instant::now();
    let mut e = engine();
    e.set_view_mode(ViewMode::Isometric);
    e.update_screens_at(&specs(&[600.0]), t0).unwrap();
    e.update_screens_at(&specs(&[700.0]), t0).unwrap();
    assert!(e.retarget_pending());
    e.update_screens_at(&specs(&[700.0, 1000.0]), t0 + Duration::from_millis(20))
        .unwrap();
    assert!(!e.retarget_pending());
    let pivot = orbit_pivot(&e).unwrap();
    assert!((pivot.z + 0.5).abs() < 1e-5);
}

#[test]
fn theme_retints_without_touching_geometry() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0, 900.0])).unwrap();
    let before = e.scene().clone();
    e.set_theme(Theme::Light).unwrap();
    let after = e.scene();
    assert_eq!(after.screens, before.screens);
    assert_eq!(after.indicator.dashes, before.indicator.dashes);
    assert_ne!(after.marker.color, before.marker.color);
    assert_ne!(after.indicator.color, before.indicator.color);
    let rev = after.revision;
    e.set_theme(Theme::Light).unwrap();
    assert_eq!(e.scene().revision, rev);
}

#[test]
fn resize_updates_projection_line_width_and_target() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0])).unwrap();
    let narrow = e.scene().indicator.width_px;
    e.resize(2560, 1440).unwrap();
    assert!(e.scene().indicator.width_px > narrow);
    assert!((e.controller().camera().aspect - 16.0 / 9.0).abs() < 1e-5);
    assert_eq!(
        e.target().resizes.last().copied(),
        Some(ViewportSize::new(2560, 1440))
    );
    // Same size again: nothing to do.
    let count = e.target().resizes.len();
    e.resize(2560, 1440).unwrap();
    assert_eq!(e.target().resizes.len(), count);
}

#[test]
fn indicator_reaches_the_furthest_screen() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0, 900.0])).unwrap();
    let dashes = &e.scene().indicator.dashes;
    let end = dashes.last().unwrap().1;
    assert!(end.z <= -0.85 && end.z >= -0.9 - 1e-3);
    assert!(dashes.iter().all(|(a, b)| a.x == 0.0 && b.y == 0.0));
}

#[test]
fn absurdly_far_screen_still_composes() {
    let mut e = engine();
    e.update_screens(&specs(&[2.0e9])).unwrap();
    let dashes = &e.scene().indicator.dashes;
    assert_eq!(dashes.len(), viewport_core::constants::MAX_INDICATOR_DASHES);
    assert!(dashes.last().unwrap().1.z >= -2.0e6);
}

#[test]
fn tick_renders_and_shutdown_returns_the_target() {
    let mut e = engine();
    e.update_screens(&specs(&[600.0])).unwrap();
    let now = Instant::now();
    for i in 0..3 {
        e.tick(now + Duration::from_millis(16 * i)).unwrap();
    }
    let rev = e.scene().revision;
    let target = e.shutdown();
    assert_eq!(target.frames, 3);
    assert!(target.revisions.iter().all(|&r| r == rev));
}

#[test]
fn render_failures_surface_as_render_context_errors() {
    let mut e = engine();
    e.target_mut().fail = true;
    let err = e.tick(Instant::now()).unwrap_err();
    assert!(matches!(err, ViewportError::RenderContext(_)));
}

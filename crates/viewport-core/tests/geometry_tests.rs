// Host-side tests for screen specs and the geometry builder.

use viewport_core::constants::{COPLANAR_EPSILON_M, MAX_ARC_SEGMENTS, MIN_ARC_SEGMENTS};
use viewport_core::geometry::{arc_segments, build_screen, build_screens, BorderGeometry};
use viewport_core::{parse_screens, Resolution, ScreenSpec, ViewportError};

fn flat(diag: f64, w: u32, h: u32, dist_mm: f64) -> ScreenSpec {
    ScreenSpec::flat(diag, Resolution::new(w, h), dist_mm, 1)
}

#[test]
fn flat_panel_keeps_pixel_aspect() {
    let cases = [
        (24.0, 1920, 1080),
        (27.0, 2560, 1440),
        (34.0, 3440, 1440),
        (21.5, 1680, 1050),
        (32.0, 3840, 2160),
        (15.6, 1366, 768),
    ];
    for (diag, w, h) in cases {
        let g = build_screen(&flat(diag, w, h, 600.0), 0).unwrap();
        let ratio = g.panel.width_m / g.panel.height_m;
        let expected = w as f32 / h as f32;
        assert!(
            (ratio - expected).abs() < 1e-4,
            "{diag}\" {w}x{h}: {ratio} vs {expected}"
        );
        assert!(matches!(g.border, BorderGeometry::Flat(_)));
    }
}

#[test]
fn curved_arc_angle_times_radius_is_width() {
    let cases = [
        (34.0, 3440, 1440, 1500.0),
        (49.0, 5120, 1440, 1000.0),
        (27.0, 2560, 1440, 1800.0),
    ];
    for (diag, w, h, r_mm) in cases {
        let spec = ScreenSpec::curved(diag, Resolution::new(w, h), 700.0, r_mm, 1);
        let g = build_screen(&spec, 0).unwrap();
        let r = g.panel.curvature_radius_m.unwrap();
        assert!((g.panel.arc_angle_rad * r - g.panel.width_m).abs() < 1e-5);
    }
}

#[test]
fn twenty_four_inch_1080p_example() {
    let spec = flat(24.0, 1920, 1080, 600.0);
    let (w_in, h_in) = spec.physical_size_in();
    assert!((h_in - 11.765).abs() < 0.01, "height {h_in}");
    assert!((w_in - 20.916).abs() < 0.01, "width {w_in}");
    let g = build_screen(&spec, 0).unwrap();
    assert!((g.panel.width_m - 0.532).abs() < 0.001);
    assert!((g.panel.height_m - 0.299).abs() < 0.001);
    assert!((g.panel.axis_position_m + 0.6).abs() < 1e-6);
}

#[test]
fn thirty_four_inch_ultrawide_example() {
    let spec = ScreenSpec::curved(34.0, Resolution::new(3440, 1440), 700.0, 1500.0, 1);
    let g = build_screen(&spec, 0).unwrap();
    assert!((g.panel.arc_angle_rad - g.panel.width_m / 1.5).abs() < 1e-6);
    assert!(g.panel.arc_segments >= MIN_ARC_SEGMENTS);
    assert!(matches!(g.border, BorderGeometry::Curved { .. }));
}

#[test]
fn equal_distances_never_share_a_plane() {
    let specs = [flat(24.0, 1920, 1080, 600.0), flat(27.0, 2560, 1440, 600.0)];
    let screens = build_screens(&specs).unwrap();
    let dz = screens[0].panel.axis_position_m - screens[1].panel.axis_position_m;
    assert!((dz - COPLANAR_EPSILON_M).abs() < 1e-6);
}

#[test]
fn invalid_specs_are_rejected_not_coerced() {
    let bad = [
        flat(-24.0, 1920, 1080, 600.0),
        flat(f64::NAN, 1920, 1080, 600.0),
        flat(24.0, 0, 1080, 600.0),
        flat(24.0, 1920, 0, 600.0),
        flat(24.0, 1920, 1080, 0.0),
        flat(24.0, 1920, 1080, f64::INFINITY),
        ScreenSpec::curved(34.0, Resolution::new(3440, 1440), 700.0, -1.0, 1),
    ];
    for spec in bad {
        let err = build_screen(&spec, 3).unwrap_err();
        assert!(
            matches!(err, ViewportError::InvalidSpec { index: 3, .. }),
            "{spec:?} -> {err}"
        );
    }
}

#[test]
fn curvature_tighter_than_a_full_circle_is_rejected() {
    // 24" 16:9 is ~0.53 m wide, so any radius under ~84 mm would wrap.
    let spec = ScreenSpec::curved(24.0, Resolution::new(1920, 1080), 600.0, 0.5, 1);
    match build_screen(&spec, 0) {
        Err(ViewportError::InvalidSpec { field, .. }) => assert_eq!(field, "curvatureRadiusMm"),
        other => panic!("expected InvalidSpec, got {other:?}"),
    }
    let tight = ScreenSpec::curved(24.0, Resolution::new(1920, 1080), 600.0, 90.0, 1);
    let g = build_screen(&tight, 0).unwrap();
    assert!(g.panel.arc_angle_rad <= std::f32::consts::TAU);
    assert!(g.panel.arc_segments <= MAX_ARC_SEGMENTS);
}

#[test]
fn arc_segments_stay_bounded() {
    assert_eq!(arc_segments(0.0), MIN_ARC_SEGMENTS);
    assert_eq!(arc_segments(1.0e6), MAX_ARC_SEGMENTS);
    assert_eq!(arc_segments(f32::INFINITY), MIN_ARC_SEGMENTS);
}

#[test]
fn one_bad_spec_fails_the_whole_batch() {
    let specs = [flat(24.0, 1920, 1080, 600.0), flat(24.0, 1920, 1080, -5.0)];
    match build_screens(&specs) {
        Err(ViewportError::InvalidSpec { index, field, .. }) => {
            assert_eq!(index, 1);
            assert_eq!(field, "viewingDistanceMm");
        }
        other => panic!("expected InvalidSpec, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = parse_screens("[{\"diagonalInches\": 24").unwrap_err();
    assert!(matches!(err, ViewportError::Json(_)));
}

#[test]
fn screen_colors_depend_only_on_display_index() {
    let spec = |diag, w, h, dist_mm, display| {
        ScreenSpec::flat(diag, Resolution::new(w, h), dist_mm, display)
    };
    let a = build_screen(&spec(24.0, 1920, 1080, 600.0, 2), 0).unwrap();
    let b = build_screen(&spec(32.0, 3840, 2160, 800.0, 2), 1).unwrap();
    let c = build_screen(&spec(24.0, 1920, 1080, 600.0, 3), 0).unwrap();
    assert_eq!(a.panel_color, b.panel_color);
    assert_ne!(a.panel_color, c.panel_color);
    assert!(a.panel_color.w < 1.0);
    assert_eq!(a.border_color.w, 1.0);
}

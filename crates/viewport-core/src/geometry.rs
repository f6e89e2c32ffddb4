//! Screen spec -> panel/border geometry descriptors, in meters.
//!
//! Layout: viewer at the origin, +Y up, screens along -Z. A curved panel is an
//! arc of a vertical cylinder whose midpoint sits at the nominal position and
//! whose axis lies one radius toward the viewer, so the panel wraps around them.

use crate::constants::{
    palette_color, ARC_SEGMENTS_PER_RAD, BORDER_DEPTH_M, BORDER_HEIGHT_RATIO, BORDER_TINT,
    COPLANAR_EPSILON_M, MAX_ARC_SEGMENTS, MIN_ARC_SEGMENTS, PANEL_OPACITY, PANEL_TINT,
    SCREEN_PALETTE,
};
use crate::error::Result;
use crate::spec::ScreenSpec;
use glam::{Vec3, Vec4};

#[derive(Clone, Debug, PartialEq)]
pub struct PanelGeometry {
    pub width_m: f32,
    pub height_m: f32,
    pub curvature_radius_m: Option<f32>,
    /// `width_m / curvature_radius_m` when curved, 0 when flat.
    pub arc_angle_rad: f32,
    pub arc_segments: u32,
    pub color_index: usize,
    /// Z of the panel midpoint (negative: in front of the viewer).
    pub axis_position_m: f32,
}

impl PanelGeometry {
    #[inline]
    pub fn center(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.axis_position_m)
    }

    pub fn is_curved(&self) -> bool {
        self.curvature_radius_m.is_some()
    }

    /// Cylinder axis position for curved panels.
    pub fn arc_center(&self) -> Option<Vec3> {
        self.curvature_radius_m
            .map(|r| Vec3::new(0.0, 0.0, self.axis_position_m + r))
    }

    pub fn half_width(&self) -> f32 {
        self.width_m * 0.5
    }

    pub fn half_height(&self) -> f32 {
        self.height_m * 0.5
    }
}

/// Axis-aligned box rotated by `yaw` around +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxSegment {
    pub center: Vec3,
    pub size: Vec3,
    pub yaw: f32,
}

/// A box section swept along an arc of the panel's cylinder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcRail {
    pub arc_center: Vec3,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub segments: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BorderGeometry {
    /// Top, bottom, left, right.
    Flat([BoxSegment; 4]),
    /// Top/bottom rails following the curve plus tangent end pieces.
    Curved {
        rails: [ArcRail; 2],
        ends: [BoxSegment; 2],
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenGeometry {
    pub panel: PanelGeometry,
    pub border: BorderGeometry,
    pub border_thickness_m: f32,
    pub panel_color: Vec4,
    pub border_color: Vec4,
}

/// Point on a vertical cylinder; angle 0 is the point facing the viewer.
#[inline]
pub fn arc_point(arc_center: Vec3, radius: f32, angle: f32, y: f32) -> Vec3 {
    Vec3::new(
        arc_center.x + radius * angle.sin(),
        y,
        arc_center.z - radius * angle.cos(),
    )
}

/// Tessellation density for an arc, within `MIN_ARC_SEGMENTS..=MAX_ARC_SEGMENTS`.
pub fn arc_segments(arc_angle_rad: f32) -> u32 {
    let scaled = (arc_angle_rad.abs() * ARC_SEGMENTS_PER_RAD).ceil();
    if !scaled.is_finite() {
        return MIN_ARC_SEGMENTS;
    }
    (scaled.min(MAX_ARC_SEGMENTS as f32) as u32).max(MIN_ARC_SEGMENTS)
}

/// Panel and border colors for a display slot. Independent of the theme.
pub fn screen_colors(display_index: u32) -> (Vec4, usize, Vec4) {
    let base = palette_color(display_index);
    let slot = (display_index.saturating_sub(1) as usize) % SCREEN_PALETTE.len();
    let panel = (base * PANEL_TINT).extend(PANEL_OPACITY);
    let border = (base * BORDER_TINT).extend(1.0);
    (panel, slot, border)
}

/// Build one screen. `index` is the position in the current list; it nudges
/// the panel back by a sub-millimeter amount so equal distances never share a
/// plane.
pub fn build_screen(spec: &ScreenSpec, index: usize) -> Result<ScreenGeometry> {
    spec.validate(index)?;

    let (w, h) = spec.physical_size_m();
    let (width_m, height_m) = (w as f32, h as f32);
    let axis_position_m =
        -(spec.viewing_distance_m() as f32 + index as f32 * COPLANAR_EPSILON_M);
    let thickness = height_m * BORDER_HEIGHT_RATIO;
    let (panel_color, color_index, border_color) = screen_colors(spec.display_index);

    let (panel, border) = match spec.curvature_radius_m() {
        Some(r) => {
            let radius = r as f32;
            let arc_angle_rad = width_m / radius;
            let panel = PanelGeometry {
                width_m,
                height_m,
                curvature_radius_m: Some(radius),
                arc_angle_rad,
                arc_segments: arc_segments(arc_angle_rad),
                color_index,
                axis_position_m,
            };
            let border = curved_border(&panel, radius, thickness);
            (panel, border)
        }
        None => {
            let panel = PanelGeometry {
                width_m,
                height_m,
                curvature_radius_m: None,
                arc_angle_rad: 0.0,
                arc_segments: 1,
                color_index,
                axis_position_m,
            };
            let border = flat_border(&panel, thickness);
            (panel, border)
        }
    };

    Ok(ScreenGeometry {
        panel,
        border,
        border_thickness_m: thickness,
        panel_color,
        border_color,
    })
}

/// Build every screen or none: the first invalid spec aborts the batch.
pub fn build_screens(specs: &[ScreenSpec]) -> Result<Vec<ScreenGeometry>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, s)| build_screen(s, i))
        .collect()
}

fn flat_border(panel: &PanelGeometry, t: f32) -> BorderGeometry {
    let z = panel.axis_position_m;
    let hw = panel.half_width();
    let hh = panel.half_height();
    let rail = Vec3::new(panel.width_m + 2.0 * t, t, BORDER_DEPTH_M);
    let side = Vec3::new(t, panel.height_m, BORDER_DEPTH_M);
    let seg = |x: f32, y: f32, size: Vec3| BoxSegment {
        center: Vec3::new(x, y, z),
        size,
        yaw: 0.0,
    };
    BorderGeometry::Flat([
        seg(0.0, hh + t * 0.5, rail),
        seg(0.0, -hh - t * 0.5, rail),
        seg(-hw - t * 0.5, 0.0, side),
        seg(hw + t * 0.5, 0.0, side),
    ])
}

fn curved_border(panel: &PanelGeometry, radius: f32, t: f32) -> BorderGeometry {
    let arc_center = panel.center() + Vec3::new(0.0, 0.0, radius);
    let half_arc = panel.arc_angle_rad * 0.5;
    let end_span = t / radius; // angle covered by one end piece
    let rail_half = half_arc + end_span;
    let hh = panel.half_height();

    let rail = |y_min: f32, y_max: f32| ArcRail {
        arc_center,
        inner_radius: radius - BORDER_DEPTH_M * 0.5,
        outer_radius: radius + BORDER_DEPTH_M * 0.5,
        start_angle: -rail_half,
        end_angle: rail_half,
        y_min,
        y_max,
        segments: arc_segments(rail_half * 2.0),
    };
    let end = |angle: f32| BoxSegment {
        center: arc_point(arc_center, radius, angle, 0.0),
        size: Vec3::new(t, panel.height_m, BORDER_DEPTH_M),
        // Local +X maps to the arc tangent (cos a, 0, sin a).
        yaw: -angle,
    };
    let end_angle = half_arc + end_span * 0.5;

    BorderGeometry::Curved {
        rails: [rail(hh, hh + t), rail(-hh - t, -hh)],
        ends: [end(-end_angle), end(end_angle)],
    }
}

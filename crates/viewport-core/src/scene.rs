//! Scene composition: the displayed screens plus the viewer marker and the
//! dashed axis toward the furthest screen.
//!
//! Rebuilds are whole-scene replacements keyed on typed content equality of
//! the inputs, so an unchanged update costs one comparison and no allocation.

use crate::constants::{
    FORWARD, INDICATOR_DASH_M, INDICATOR_GAP_M, INDICATOR_PX_PER_WIDTH, INDICATOR_WIDTH_MAX_PX,
    INDICATOR_WIDTH_MIN_PX, MARKER_RADIUS_M, MAX_INDICATOR_DASHES,
};
use crate::error::{Result, ViewportError};
use crate::geometry::{build_screens, ScreenGeometry};
use crate::spec::ScreenSpec;
use glam::{Vec3, Vec4};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn marker_color(self) -> Vec4 {
        match self {
            Theme::Light => Vec4::new(0.12, 0.12, 0.14, 1.0),
            Theme::Dark => Vec4::new(0.92, 0.92, 0.95, 1.0),
        }
    }

    pub fn indicator_color(self) -> Vec4 {
        match self {
            Theme::Light => Vec4::new(0.25, 0.25, 0.30, 0.9),
            Theme::Dark => Vec4::new(0.75, 0.75, 0.80, 0.9),
        }
    }

    pub fn background(self) -> Vec4 {
        match self {
            Theme::Light => Vec4::new(0.96, 0.96, 0.97, 1.0),
            Theme::Dark => Vec4::new(0.04, 0.04, 0.06, 1.0),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ViewportError::UnknownTheme(other.to_string())),
        }
    }
}

/// Backing-store size of the drawing surface in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewportSize {
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl ViewportSize {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px: width_px.max(1),
            height_px: height_px.max(1),
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width_px as f32 / self.height_px as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewerMarker {
    pub position: Vec3,
    pub radius: f32,
    pub color: Vec4,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisIndicator {
    pub dashes: Vec<(Vec3, Vec3)>,
    /// Screen-space width; depends on the viewport height.
    pub width_px: f32,
    pub color: Vec4,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub screens: Vec<ScreenGeometry>,
    pub marker: ViewerMarker,
    pub indicator: AxisIndicator,
    /// Bumped on every rebuild so renderers know to re-upload.
    pub revision: u64,
}

impl Default for Scene {
    fn default() -> Self {
        compose(Vec::new(), Theme::default(), ViewportSize::default(), 0)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct SceneKey {
    specs: Vec<ScreenSpec>,
    theme: Theme,
    viewport: ViewportSize,
}

#[derive(Default)]
pub struct SceneComposer {
    key: Option<SceneKey>,
    scene: Scene,
}

impl SceneComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn specs(&self) -> &[ScreenSpec] {
        self.key.as_ref().map(|k| k.specs.as_slice()).unwrap_or(&[])
    }

    /// Returns `Ok(true)` when the scene was rebuilt, `Ok(false)` when the
    /// inputs matched the previous call. On error the previous scene stays.
    pub fn update(
        &mut self,
        specs: &[ScreenSpec],
        theme: Theme,
        viewport: ViewportSize,
    ) -> Result<bool> {
        if let Some(key) = &self.key {
            if key.theme == theme && key.viewport == viewport && key.specs == specs {
                return Ok(false);
            }
        }
        let screens = build_screens(specs)?;
        let revision = self.scene.revision + 1;
        self.scene = compose(screens, theme, viewport, revision);
        self.key = Some(SceneKey {
            specs: specs.to_vec(),
            theme,
            viewport,
        });
        log::debug!(
            "[scene] rebuilt rev={} screens={} theme={:?} viewport={}x{}",
            revision,
            self.scene.screens.len(),
            theme,
            viewport.width_px,
            viewport.height_px
        );
        Ok(true)
    }
}

/// Line width for the dashed indicator at a given surface height.
pub fn indicator_width_px(viewport: ViewportSize) -> f32 {
    (viewport.height_px as f32 / INDICATOR_PX_PER_WIDTH)
        .clamp(INDICATOR_WIDTH_MIN_PX, INDICATOR_WIDTH_MAX_PX)
}

/// Dash endpoints from just outside the viewer marker to `distance_m` along
/// the forward axis.
pub fn dash_segments(distance_m: f32) -> Vec<(Vec3, Vec3)> {
    let span = distance_m - MARKER_RADIUS_M;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }
    let mut period = INDICATOR_DASH_M + INDICATOR_GAP_M;
    let mut count = (span / period).ceil() as usize;
    // Very far screens get longer dashes rather than more of them.
    if count > MAX_INDICATOR_DASHES {
        count = MAX_INDICATOR_DASHES;
        period = span / count as f32;
    }
    let dash = period * INDICATOR_DASH_M / (INDICATOR_DASH_M + INDICATOR_GAP_M);
    (0..count)
        .map(|i| {
            let s = MARKER_RADIUS_M + i as f32 * period;
            let e = (s + dash).min(distance_m);
            (FORWARD * s, FORWARD * e)
        })
        .collect()
}

fn compose(
    screens: Vec<ScreenGeometry>,
    theme: Theme,
    viewport: ViewportSize,
    revision: u64,
) -> Scene {
    let furthest = screens
        .iter()
        .map(|s| -s.panel.axis_position_m)
        .fold(0.0_f32, f32::max);
    Scene {
        marker: ViewerMarker {
            position: Vec3::ZERO,
            radius: MARKER_RADIUS_M,
            color: theme.marker_color(),
        },
        indicator: AxisIndicator {
            dashes: dash_segments(furthest),
            width_px: indicator_width_px(viewport),
            color: theme.indicator_color(),
        },
        screens,
        revision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_follow_the_fixed_pattern_up_close() {
        let dashes = dash_segments(0.9);
        let period = INDICATOR_DASH_M + INDICATOR_GAP_M;
        assert_eq!(dashes.len(), ((0.9 - MARKER_RADIUS_M) / period).ceil() as usize);
        assert!((dashes[1].0.z - dashes[0].0.z + period).abs() < 1e-6);
        assert!(dashes.last().unwrap().1.z >= -0.9);
    }

    #[test]
    fn far_distances_cap_the_dash_count() {
        let dashes = dash_segments(2.0e6);
        assert_eq!(dashes.len(), MAX_INDICATOR_DASHES);
        let end = dashes.last().unwrap().1.z;
        assert!(end >= -2.0e6 && end < -1.99e6, "{end}");
    }

    #[test]
    fn nothing_to_draw_inside_the_marker() {
        assert!(dash_segments(0.0).is_empty());
        assert!(dash_segments(MARKER_RADIUS_M).is_empty());
        assert!(dash_segments(f32::NAN).is_empty());
    }
}

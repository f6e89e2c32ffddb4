//! Physical screen descriptions as supplied by the host UI.
//!
//! A `ScreenSpec` is a read-only snapshot; the engine never mutates it. Field
//! names on the wire follow the host's camelCase JSON.

use crate::constants::{MM_PER_INCH, MM_PER_M};
use crate::error::{Result, ViewportError};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub width_px: u32,
    pub height_px: u32,
}

impl Resolution {
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSpec {
    pub diagonal_inches: f64,
    pub resolution: Resolution,
    pub viewing_distance_mm: f64,
    #[serde(default)]
    pub curvature_radius_mm: Option<f64>,
    #[serde(default = "default_scaling")]
    pub scaling_percent: f64,
    #[serde(default = "default_display_index")]
    pub display_index: u32,
}

fn default_scaling() -> f64 {
    100.0
}

fn default_display_index() -> u32 {
    1
}

#[inline]
fn positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl ScreenSpec {
    /// Flat screen with 100% scaling.
    pub fn flat(
        diagonal_inches: f64,
        resolution: Resolution,
        viewing_distance_mm: f64,
        display_index: u32,
    ) -> Self {
        Self {
            diagonal_inches,
            resolution,
            viewing_distance_mm,
            curvature_radius_mm: None,
            scaling_percent: 100.0,
            display_index,
        }
    }

    /// Curved screen; `curvature_radius_mm` is the "R" rating (1500R = 1500).
    pub fn curved(
        diagonal_inches: f64,
        resolution: Resolution,
        viewing_distance_mm: f64,
        curvature_radius_mm: f64,
        display_index: u32,
    ) -> Self {
        Self {
            curvature_radius_mm: Some(curvature_radius_mm),
            ..Self::flat(diagonal_inches, resolution, viewing_distance_mm, display_index)
        }
    }

    /// Rejects anything that would produce degenerate geometry. `index` is the
    /// position in the caller's list and only feeds the error message.
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |field: &'static str, value: f64| ViewportError::InvalidSpec {
            index,
            field,
            value,
        };
        if !positive_finite(self.diagonal_inches) {
            return Err(invalid("diagonalInches", self.diagonal_inches));
        }
        if self.resolution.width_px == 0 {
            return Err(invalid("resolution.widthPx", 0.0));
        }
        if self.resolution.height_px == 0 {
            return Err(invalid("resolution.heightPx", 0.0));
        }
        if !positive_finite(self.viewing_distance_mm) {
            return Err(invalid("viewingDistanceMm", self.viewing_distance_mm));
        }
        if let Some(r) = self.curvature_radius_mm {
            if !positive_finite(r) {
                return Err(invalid("curvatureRadiusMm", r));
            }
            // The arc may not wrap past a full circle.
            let (width_m, _) = self.physical_size_m();
            if r / MM_PER_M < width_m / std::f64::consts::TAU {
                return Err(invalid("curvatureRadiusMm", r));
            }
        }
        if !positive_finite(self.scaling_percent) {
            return Err(invalid("scalingPercent", self.scaling_percent));
        }
        if self.display_index == 0 {
            return Err(invalid("displayIndex", 0.0));
        }
        Ok(())
    }

    /// Panel `(width, height)` in inches derived from diagonal and pixel aspect.
    pub fn physical_size_in(&self) -> (f64, f64) {
        let ratio = self.resolution.aspect();
        let height = self.diagonal_inches / (ratio * ratio + 1.0).sqrt();
        (ratio * height, height)
    }

    /// Panel `(width, height)` in meters.
    pub fn physical_size_m(&self) -> (f64, f64) {
        let (w, h) = self.physical_size_in();
        let to_m = MM_PER_INCH / MM_PER_M;
        (w * to_m, h * to_m)
    }

    #[inline]
    pub fn viewing_distance_m(&self) -> f64 {
        self.viewing_distance_mm / MM_PER_M
    }

    #[inline]
    pub fn curvature_radius_m(&self) -> Option<f64> {
        self.curvature_radius_mm.map(|r| r / MM_PER_M)
    }

    pub fn is_curved(&self) -> bool {
        self.curvature_radius_mm.is_some()
    }

    pub fn pixels_per_inch(&self) -> f64 {
        let w = self.resolution.width_px as f64;
        let h = self.resolution.height_px as f64;
        (w * w + h * h).sqrt() / self.diagonal_inches
    }

    /// Logical desktop size after OS scaling, e.g. 3840x2160 at 150% -> 2560x1440.
    pub fn effective_resolution(&self) -> (f64, f64) {
        let scale = self.scaling_percent / 100.0;
        (
            self.resolution.width_px as f64 / scale,
            self.resolution.height_px as f64 / scale,
        )
    }

    /// Full horizontal angle the panel spans from the viewer, in radians.
    pub fn horizontal_fov_rad(&self) -> f64 {
        let (w, _) = self.physical_size_m();
        2.0 * (w / 2.0).atan2(self.viewing_distance_m())
    }

    pub fn vertical_fov_rad(&self) -> f64 {
        let (_, h) = self.physical_size_m();
        2.0 * (h / 2.0).atan2(self.viewing_distance_m())
    }
}

/// Parse the host's JSON screen list. Validation is left to the caller so a
/// malformed document and an out-of-range value report differently.
pub fn parse_screens(json: &str) -> Result<Vec<ScreenSpec>> {
    Ok(serde_json::from_str(json)?)
}

/// Validate a whole list, reporting the first offending entry.
pub fn validate_screens(specs: &[ScreenSpec]) -> Result<()> {
    specs
        .iter()
        .enumerate()
        .try_for_each(|(i, s)| s.validate(i))
}

use crate::error::{Result, ViewportError};
use std::time::Duration;

/// Host-tunable engine parameters.
#[derive(Clone, Debug)]
pub struct ViewportConfig {
    /// Fraction of the remaining distance covered per tick, in (0, 1).
    pub lerp_ratio: f32,
    /// Per-component delta under which an animation snaps to its target.
    pub convergence_threshold: f32,
    /// Look-around decay per tick after release, in (0, 1).
    pub spring_back_ratio: f32,
    pub spring_back_threshold: f32,
    /// Coalescing window for distance-only screen edits.
    pub distance_debounce: Duration,
    /// Radians of azimuth/polar per dragged pixel in isometric view.
    pub rotate_speed: f32,
    /// Zoom multiplier for one wheel notch (> 1).
    pub wheel_zoom_step: f32,
    /// Scales the pinch distance ratio's departure from 1.
    pub pinch_sensitivity: f32,
    /// Isometric camera depth behind the viewer, as a multiple of the
    /// furthest screen distance.
    pub iso_depth_scale: f32,
    pub iso_height_ratio: f32,
    pub iso_side_ratio: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            lerp_ratio: 0.1,
            convergence_threshold: 0.001,
            spring_back_ratio: 0.1,
            spring_back_threshold: 0.001,
            distance_debounce: Duration::from_millis(150),
            rotate_speed: 0.005,
            wheel_zoom_step: 1.1,
            pinch_sensitivity: 0.5,
            iso_depth_scale: 1.2,
            iso_height_ratio: 0.4,
            iso_side_ratio: 0.6,
            fovy_radians: 50f32.to_radians(),
            znear: 0.01,
            zfar: 100.0,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<()> {
        let unit = |v: f32| v > 0.0 && v < 1.0;
        if !unit(self.lerp_ratio) {
            return Err(ViewportError::InvalidConfig("lerp_ratio must be in (0, 1)"));
        }
        if !unit(self.spring_back_ratio) {
            return Err(ViewportError::InvalidConfig(
                "spring_back_ratio must be in (0, 1)",
            ));
        }
        if !(self.convergence_threshold > 0.0 && self.spring_back_threshold > 0.0) {
            return Err(ViewportError::InvalidConfig("thresholds must be positive"));
        }
        if !(self.wheel_zoom_step > 1.0) {
            return Err(ViewportError::InvalidConfig("wheel_zoom_step must exceed 1"));
        }
        if !(self.rotate_speed > 0.0 && self.pinch_sensitivity > 0.0) {
            return Err(ViewportError::InvalidConfig(
                "gesture sensitivities must be positive",
            ));
        }
        if !(self.iso_depth_scale > 0.0) {
            return Err(ViewportError::InvalidConfig("iso_depth_scale must be positive"));
        }
        if !(self.fovy_radians > 0.0 && self.fovy_radians < std::f32::consts::PI) {
            return Err(ViewportError::InvalidConfig("fovy_radians must be in (0, pi)"));
        }
        if !(self.znear > 0.0 && self.zfar > self.znear) {
            return Err(ViewportError::InvalidConfig("clip planes must satisfy 0 < znear < zfar"));
        }
        Ok(())
    }
}

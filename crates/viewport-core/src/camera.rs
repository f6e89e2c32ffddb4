//! Camera description, spherical orbit math and the per-mode target poses.

use crate::config::ViewportConfig;
use crate::constants::{
    DEFAULT_AZIMUTH, DEFAULT_POLAR, FALLBACK_DISTANCE_M, FALLBACK_LOOK_LIMIT_RAD, FORWARD,
    MIN_ORBIT_RADIUS, POLAR_MAX, POLAR_MIN, TOP_HEIGHT_SCALE, TOP_MIN_HEIGHT_M, WORLD_UP,
    ZOOM_MAX, ZOOM_MIN, ZOOM_NEUTRAL,
};
use crate::error::{Result, ViewportError};
use crate::spec::ScreenSpec;
use glam::{Mat4, Quat, Vec3};
use std::f32::consts::{PI, TAU};
use std::str::FromStr;

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(config: &ViewportConfig) -> Self {
        let pose = front_pose();
        Self {
            eye: pose.position,
            target: pose.look_at,
            up: pose.up,
            aspect: 1.0,
            fovy_radians: config.fovy_radians,
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.eye,
            look_at: self.target,
            up: self.up,
        }
    }

    pub fn set_pose(&mut self, pose: CameraPose) {
        self.eye = pose.position;
        self.target = pose.look_at;
        self.up = pose.up;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
}

impl CameraPose {
    /// Unit view direction, falling back to the forward axis when the look-at
    /// point coincides with the position.
    pub fn direction(&self) -> Vec3 {
        (self.look_at - self.position).try_normalize().unwrap_or(FORWARD)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Front,
    Top,
    Isometric,
}

impl FromStr for ViewMode {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(ViewMode::Front),
            "top" => Ok(ViewMode::Top),
            "isometric" => Ok(ViewMode::Isometric),
            other => Err(ViewportError::UnknownViewMode(other.to_string())),
        }
    }
}

/// Wrap an angle into (-pi, pi].
#[inline]
pub fn wrap_angle(a: f32) -> f32 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[inline]
pub fn clamp_polar(polar: f32) -> f32 {
    polar.clamp(POLAR_MIN, POLAR_MAX)
}

/// Orbit coordinates around a pivot: polar from +Y, azimuth around +Y
/// measured from +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub polar: f32,
    pub azimuth: f32,
}

impl Spherical {
    pub fn new(radius: f32, polar: f32, azimuth: f32) -> Self {
        Self {
            radius: radius.max(MIN_ORBIT_RADIUS),
            polar: clamp_polar(polar),
            azimuth: wrap_angle(azimuth),
        }
    }

    /// Degenerate (zero-length) offsets fall back to a fixed orientation
    /// instead of dividing by zero.
    pub fn from_offset(offset: Vec3) -> Self {
        let s = Self::measured(offset);
        Self::new(s.radius, s.polar, s.azimuth)
    }

    /// Same as `from_offset` but without the polar clamp, so `to_offset`
    /// gives back `offset` even straight above or below the pivot.
    pub fn measured(offset: Vec3) -> Self {
        let radius = offset.length();
        if !radius.is_finite() || radius < 1e-6 {
            return Self::new(MIN_ORBIT_RADIUS, DEFAULT_POLAR, DEFAULT_AZIMUTH);
        }
        Self {
            radius,
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(&self) -> Vec3 {
        let s = self.polar.sin();
        Vec3::new(
            self.radius * s * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            self.radius * s * self.azimuth.cos(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub spherical: Spherical,
    pub target: Vec3,
    pub enabled: bool,
}

impl Default for OrbitState {
    fn default() -> Self {
        Self {
            spherical: Spherical::new(1.0, DEFAULT_POLAR, DEFAULT_AZIMUTH),
            target: Vec3::ZERO,
            enabled: false,
        }
    }
}

impl OrbitState {
    pub fn camera_position(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    /// Re-derive the spherical coordinates from where the camera actually is.
    pub fn sync_from_position(&mut self, position: Vec3) {
        self.spherical = Spherical::from_offset(position - self.target);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomState {
    pub zoom_factor: f32,
    pub base_distance: f32,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            zoom_factor: ZOOM_NEUTRAL,
            base_distance: 1.0,
        }
    }
}

impl ZoomState {
    pub fn new(base_distance: f32) -> Self {
        Self {
            zoom_factor: ZOOM_NEUTRAL,
            base_distance,
        }
    }

    /// `multiplier > 1` zooms out (radius grows), `< 1` zooms in.
    pub fn apply_multiplier(&mut self, multiplier: f32) {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return;
        }
        self.zoom_factor = (self.zoom_factor / multiplier).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn set_factor(&mut self, zoom_factor: f32) {
        if zoom_factor.is_finite() {
            self.zoom_factor = zoom_factor.clamp(ZOOM_MIN, ZOOM_MAX);
        }
    }

    pub fn effective_radius(&self) -> f32 {
        (self.base_distance / self.zoom_factor).max(MIN_ORBIT_RADIUS)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAroundState {
    pub yaw: f32,
    pub pitch: f32,
    pub max_yaw: f32,
    pub max_pitch: f32,
    pub spring_back: bool,
}

impl Default for LookAroundState {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            max_yaw: FALLBACK_LOOK_LIMIT_RAD,
            max_pitch: FALLBACK_LOOK_LIMIT_RAD,
            spring_back: false,
        }
    }
}

impl LookAroundState {
    pub fn with_limits(extents: &ScreenExtents) -> Self {
        Self {
            max_yaw: extents.max_yaw,
            max_pitch: extents.max_pitch,
            ..Self::default()
        }
    }

    pub fn set_limits(&mut self, extents: &ScreenExtents) {
        self.max_yaw = extents.max_yaw;
        self.max_pitch = extents.max_pitch;
        self.set_angles(self.yaw, self.pitch);
    }

    pub fn set_angles(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw.clamp(-self.max_yaw, self.max_yaw);
        self.pitch = pitch.clamp(-self.max_pitch, self.max_pitch);
    }

    /// One spring-back step. Returns true while still settling.
    pub fn step_spring_back(&mut self, ratio: f32, threshold: f32) -> bool {
        if !self.spring_back {
            return false;
        }
        self.yaw *= 1.0 - ratio;
        self.pitch *= 1.0 - ratio;
        if self.yaw.abs() < threshold && self.pitch.abs() < threshold {
            self.yaw = 0.0;
            self.pitch = 0.0;
            self.spring_back = false;
        }
        self.spring_back
    }

    /// Rotate a view direction by the current head turn.
    pub fn apply(&self, direction: Vec3) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch) * direction
    }
}

/// Distances and angular extents of the current screen set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenExtents {
    pub furthest_m: f32,
    pub nearest_m: f32,
    pub max_yaw: f32,
    pub max_pitch: f32,
}

impl Default for ScreenExtents {
    fn default() -> Self {
        Self {
            furthest_m: FALLBACK_DISTANCE_M,
            nearest_m: FALLBACK_DISTANCE_M,
            max_yaw: FALLBACK_LOOK_LIMIT_RAD,
            max_pitch: FALLBACK_LOOK_LIMIT_RAD,
        }
    }
}

impl ScreenExtents {
    /// Expects validated specs.
    pub fn from_specs(specs: &[ScreenSpec]) -> Self {
        if specs.is_empty() {
            return Self::default();
        }
        let mut ext = Self {
            furthest_m: f32::MIN,
            nearest_m: f32::MAX,
            max_yaw: 0.0,
            max_pitch: 0.0,
        };
        for spec in specs {
            let d = spec.viewing_distance_m();
            let (w, h) = spec.physical_size_m();
            ext.furthest_m = ext.furthest_m.max(d as f32);
            ext.nearest_m = ext.nearest_m.min(d as f32);
            ext.max_yaw = ext.max_yaw.max((w / 2.0).atan2(d) as f32);
            ext.max_pitch = ext.max_pitch.max((h / 2.0).atan2(d) as f32);
        }
        ext
    }

    /// Point halfway between the viewer and the furthest screen.
    pub fn midpoint(&self) -> Vec3 {
        FORWARD * (self.furthest_m * 0.5)
    }
}

pub fn front_pose() -> CameraPose {
    CameraPose {
        position: Vec3::ZERO,
        look_at: FORWARD,
        up: WORLD_UP,
    }
}

/// Straight down onto the viewer/furthest-screen midpoint. The forward axis
/// stands in for "up" since the world up is parallel to the view direction.
pub fn top_pose(extents: &ScreenExtents) -> CameraPose {
    let mid = extents.midpoint();
    let height = TOP_MIN_HEIGHT_M.max(extents.furthest_m * TOP_HEIGHT_SCALE);
    CameraPose {
        position: mid + WORLD_UP * height,
        look_at: mid,
        up: FORWARD,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsometricTarget {
    pub pose: CameraPose,
    pub orbit_target: Vec3,
    pub spherical: Spherical,
    pub base_distance: f32,
}

pub fn isometric_target(extents: &ScreenExtents, config: &ViewportConfig) -> IsometricTarget {
    let depth = extents.furthest_m * config.iso_depth_scale;
    let position = Vec3::new(
        depth * config.iso_side_ratio,
        depth * config.iso_height_ratio,
        depth,
    );
    let orbit_target = extents.midpoint();
    let spherical = Spherical::from_offset(position - orbit_target);
    IsometricTarget {
        pose: CameraPose {
            position,
            look_at: orbit_target,
            up: WORLD_UP,
        },
        orbit_target,
        spherical,
        base_distance: spherical.radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_lands_in_half_open_range() {
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.5 - TAU) + 0.5).abs() < 1e-5);
    }

    #[test]
    fn measured_keeps_the_pole() {
        let offset = Vec3::new(0.0, 1.35, 0.0);
        assert!((Spherical::measured(offset).to_offset() - offset).length() < 1e-6);
        assert!((Spherical::from_offset(offset).polar - POLAR_MIN).abs() < 1e-6);
    }

    #[test]
    fn spherical_round_trips_through_offset() {
        let offset = Vec3::new(0.4, 0.3, 1.1);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).length() < 1e-5);
    }

    #[test]
    fn zero_offset_falls_back_to_default_orientation() {
        let s = Spherical::from_offset(Vec3::ZERO);
        assert_eq!(s.polar, DEFAULT_POLAR);
        assert_eq!(s.azimuth, DEFAULT_AZIMUTH);
        assert!(s.radius > 0.0);
    }
}

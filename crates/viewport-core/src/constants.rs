use glam::Vec3;

// Fixed contracts shared by the engine and both frontends. Tunables that a host
// may reasonably change live in `ViewportConfig` instead.

// Unit conversion
pub const MM_PER_INCH: f64 = 25.4;
pub const MM_PER_M: f64 = 1000.0;

// Scene layout (viewer at the origin, screens along -Z)
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
pub const WORLD_UP: Vec3 = Vec3::Y;
pub const FALLBACK_DISTANCE_M: f32 = 0.6; // used when no screens are loaded
pub const COPLANAR_EPSILON_M: f32 = 0.0002; // per-index depth nudge, 0.2 mm

// Panel and border shape
pub const BORDER_HEIGHT_RATIO: f32 = 0.05; // border thickness relative to panel height
pub const BORDER_DEPTH_M: f32 = 0.012;
pub const MIN_ARC_SEGMENTS: u32 = 32;
pub const MAX_ARC_SEGMENTS: u32 = 512;
pub const ARC_SEGMENTS_PER_RAD: f32 = 64.0;

// Panel/border tinting (theme independent)
pub const PANEL_OPACITY: f32 = 0.1;
pub const PANEL_TINT: f32 = 0.5;
pub const BORDER_TINT: f32 = 0.9;

pub const SCREEN_PALETTE: [[f32; 3]; 8] = [
    [0.23, 0.51, 0.96], // blue
    [0.94, 0.27, 0.27], // red
    [0.13, 0.77, 0.37], // green
    [0.96, 0.62, 0.04], // amber
    [0.66, 0.33, 0.97], // violet
    [0.02, 0.71, 0.83], // cyan
    [0.93, 0.28, 0.60], // pink
    [0.52, 0.80, 0.09], // lime
];

// Viewer marker and axis indicator
pub const MARKER_RADIUS_M: f32 = 0.03;
pub const INDICATOR_DASH_M: f32 = 0.03;
pub const INDICATOR_GAP_M: f32 = 0.02;
pub const MAX_INDICATOR_DASHES: usize = 2048;
pub const INDICATOR_WIDTH_MIN_PX: f32 = 1.0;
pub const INDICATOR_WIDTH_MAX_PX: f32 = 4.0;
pub const INDICATOR_PX_PER_WIDTH: f32 = 400.0; // viewport height per pixel of line width

// Orbit contracts
pub const POLAR_MIN: f32 = 0.1;
pub const POLAR_MAX: f32 = std::f32::consts::PI - 0.1;
pub const MIN_ORBIT_RADIUS: f32 = 0.05;
pub const DEFAULT_POLAR: f32 = std::f32::consts::FRAC_PI_3; // fallback for degenerate offsets
pub const DEFAULT_AZIMUTH: f32 = 0.0;

// Zoom contracts
pub const ZOOM_MIN: f32 = 0.2;
pub const ZOOM_MAX: f32 = 5.0;
pub const ZOOM_NEUTRAL: f32 = 1.0;

// Top view
pub const TOP_MIN_HEIGHT_M: f32 = 0.8;
pub const TOP_HEIGHT_SCALE: f32 = 1.5;

// Look-around fallback when there is nothing to bound it
pub const FALLBACK_LOOK_LIMIT_RAD: f32 = 0.5;

#[inline]
pub fn palette_color(display_index: u32) -> Vec3 {
    let slot = (display_index.saturating_sub(1) as usize) % SCREEN_PALETTE.len();
    Vec3::from(SCREEN_PALETTE[slot])
}

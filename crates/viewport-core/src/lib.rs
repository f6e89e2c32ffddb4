pub mod animation;
pub mod camera;
pub mod config;
pub mod constants;
pub mod controller;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod geometry;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod input;
pub mod mesh;
pub mod scene;
pub mod spec;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

pub use camera::{Camera, ScreenExtents, ViewMode};
pub use config::ViewportConfig;
pub use controller::CameraController;
pub use engine::{FrameView, RenderTarget, ViewportEngine};
pub use error::{Result, ViewportError};
#[cfg(feature = "gpu")]
pub use gpu::GpuRenderer;
pub use scene::{Scene, Theme, ViewportSize};
pub use spec::{parse_screens, Resolution, ScreenSpec};

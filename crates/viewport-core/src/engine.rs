//! Engine facade tying the scene, the camera controller and a render target
//! together. Front-ends own one `ViewportEngine` and drive it from their event
//! and frame callbacks.

use crate::camera::{Camera, ScreenExtents, ViewMode};
use crate::config::ViewportConfig;
use crate::controller::CameraController;
use crate::debounce::Debouncer;
use crate::error::{Result, ViewportError};
use crate::scene::{Scene, SceneComposer, Theme, ViewportSize};
use crate::spec::{validate_screens, ScreenSpec};
use glam::{Mat4, Vec2};
use instant::Instant;

/// Everything a renderer needs for one frame.
pub struct FrameView<'a> {
    pub view_proj: Mat4,
    pub camera: &'a Camera,
    pub scene: &'a Scene,
    pub theme: Theme,
    pub viewport: ViewportSize,
}

/// Render step seam. The GPU renderer implements it behind the `gpu` feature;
/// tests use recording doubles.
pub trait RenderTarget {
    fn resize(&mut self, size: ViewportSize);
    fn render(&mut self, frame: &FrameView<'_>) -> anyhow::Result<()>;
}

pub struct ViewportEngine<R: RenderTarget> {
    composer: SceneComposer,
    controller: CameraController,
    theme: Theme,
    viewport: ViewportSize,
    debounce: Debouncer,
    target: R,
}

impl<R: RenderTarget> ViewportEngine<R> {
    pub fn new(config: ViewportConfig, target: R) -> Result<Self> {
        config.validate()?;
        let mut composer = SceneComposer::new();
        composer.update(&[], Theme::default(), ViewportSize::default())?;
        Ok(Self {
            composer,
            debounce: Debouncer::new(config.distance_debounce),
            controller: CameraController::new(config),
            theme: Theme::default(),
            viewport: ViewportSize::default(),
            target,
        })
    }

    pub fn scene(&self) -> &Scene {
        self.composer.scene()
    }

    pub fn screens(&self) -> &[ScreenSpec] {
        self.composer.specs()
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn view_mode(&self) -> ViewMode {
        self.controller.mode()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn retarget_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn update_screens(&mut self, specs: &[ScreenSpec]) -> Result<()> {
        self.update_screens_at(specs, Instant::now())
    }

    /// Replace the screen list. Invalid input leaves the current scene and
    /// camera untouched. Distance-only edits retarget the camera after the
    /// debounce window; anything else retargets right away.
    pub fn update_screens_at(&mut self, specs: &[ScreenSpec], now: Instant) -> Result<()> {
        if let Err(e) = validate_screens(specs) {
            log::warn!("[scene] rejected screen update: {}", e);
            return Err(e);
        }
        let distance_only = distance_only_change(self.composer.specs(), specs);
        if !self.composer.update(specs, self.theme, self.viewport)? {
            return Ok(());
        }
        let extents = ScreenExtents::from_specs(specs);
        self.controller.set_extents(extents);
        log::info!(
            "[scene] {} screen(s), furthest {:.3} m",
            specs.len(),
            extents.furthest_m
        );
        if distance_only {
            self.debounce.schedule(now);
        } else {
            self.debounce.cancel();
            self.controller.retarget();
        }
        Ok(())
    }

    /// Parse and apply a JSON screen list.
    pub fn update_screens_json(&mut self, json: &str) -> Result<()> {
        let specs = crate::spec::parse_screens(json)?;
        self.update_screens(&specs)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.controller.set_view_mode(mode) {
            // The switch already targets the latest extents.
            self.debounce.cancel();
        }
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        if theme == self.theme {
            return Ok(());
        }
        self.theme = theme;
        let specs = self.composer.specs().to_vec();
        self.composer.update(&specs, theme, self.viewport)?;
        log::info!("[scene] theme {:?}", theme);
        Ok(())
    }

    /// Synchronous resize in physical pixels: projection, line width and the
    /// render target's surface all follow before the next frame.
    pub fn resize(&mut self, width_px: u32, height_px: u32) -> Result<()> {
        let size = ViewportSize::new(width_px, height_px);
        if size == self.viewport {
            return Ok(());
        }
        self.viewport = size;
        self.controller.resize(size);
        let specs = self.composer.specs().to_vec();
        self.composer.update(&specs, self.theme, size)?;
        self.target.resize(size);
        log::debug!("[camera] resize {}x{}", size.width_px, size.height_px);
        Ok(())
    }

    pub fn pointer_down(&mut self, pointer_id: i32, x: f32, y: f32) {
        self.controller.pointer_down(pointer_id, Vec2::new(x, y));
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f32, y: f32) {
        self.controller.pointer_move(pointer_id, Vec2::new(x, y));
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        self.controller.pointer_up(pointer_id);
    }

    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        self.controller.pointer_cancel(pointer_id);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.controller.wheel(delta_y);
    }

    /// One frame: fire a due retarget, advance the camera, render.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        if self.debounce.poll(now) {
            log::debug!("[camera] debounced retarget");
            self.controller.retarget();
        }
        self.controller.tick();
        let camera = self.controller.view_camera();
        let frame = FrameView {
            view_proj: camera.view_proj(),
            camera: &camera,
            scene: self.composer.scene(),
            theme: self.theme,
            viewport: self.viewport,
        };
        self.target
            .render(&frame)
            .map_err(|e| ViewportError::RenderContext(format!("{e:#}")))
    }

    /// Stop driving the engine and hand the render target back for disposal.
    pub fn shutdown(self) -> R {
        log::info!("[scene] viewport shut down");
        self.target
    }
}

/// Same list shape with only the viewing distances edited.
pub fn distance_only_change(previous: &[ScreenSpec], next: &[ScreenSpec]) -> bool {
    !previous.is_empty()
        && previous.len() == next.len()
        && previous.iter().zip(next).all(|(p, n)| {
            ScreenSpec {
                viewing_distance_mm: n.viewing_distance_mm,
                ..p.clone()
            } == *n
        })
}

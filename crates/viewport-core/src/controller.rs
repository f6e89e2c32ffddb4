//! Camera controller: owns the live camera, the per-mode orbit/zoom/look
//! state and the running transition.

use crate::animation::{Animation, StepOutcome};
use crate::camera::{
    front_pose, isometric_target, top_pose, Camera, CameraPose, LookAroundState, OrbitState,
    ScreenExtents, ViewMode, ZoomState,
};
use crate::config::ViewportConfig;
use crate::constants::WORLD_UP;
use crate::input::{FrontInteraction, Interaction, OrbitInteraction, PointerTracker};
use crate::scene::ViewportSize;

pub struct CameraController {
    pub(crate) config: ViewportConfig,
    pub(crate) mode: ViewMode,
    pub(crate) camera: Camera,
    pub(crate) orbit: OrbitState,
    pub(crate) zoom: ZoomState,
    pub(crate) extents: ScreenExtents,
    pub(crate) animation: Animation,
    pub(crate) interaction: Interaction,
    pub(crate) pointers: PointerTracker,
    pub(crate) viewport: ViewportSize,
}

impl CameraController {
    /// Starts settled in front view.
    pub fn new(config: ViewportConfig) -> Self {
        let extents = ScreenExtents::default();
        Self {
            camera: Camera::new(&config),
            config,
            mode: ViewMode::Front,
            orbit: OrbitState::default(),
            zoom: ZoomState::default(),
            extents,
            animation: Animation::Idle,
            interaction: Interaction::Front(FrontInteraction::new(LookAroundState::with_limits(
                &extents,
            ))),
            pointers: PointerTracker::default(),
            viewport: ViewportSize::default(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Base camera, without the front-view head turn.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn orbit(&self) -> &OrbitState {
        &self.orbit
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn extents(&self) -> &ScreenExtents {
        &self.extents
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_active()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn look_around(&self) -> Option<&LookAroundState> {
        match &self.interaction {
            Interaction::Front(front) => Some(&front.look),
            _ => None,
        }
    }

    /// Switch view mode and start the transition. Returns false when the mode
    /// is already active.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if mode == self.mode {
            return false;
        }
        // Keep the current head turn as the starting pose so leaving front
        // view does not pop.
        if let Some(look) = self.look_around().copied() {
            let pose = self.camera.pose();
            self.camera.target = pose.position + look.apply(pose.direction());
            self.camera.up = look.apply(pose.up);
        }
        log::info!("[camera] view mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.interaction = match mode {
            ViewMode::Front => {
                Interaction::Front(FrontInteraction::new(LookAroundState::with_limits(
                    &self.extents,
                )))
            }
            ViewMode::Isometric => Interaction::Orbit(OrbitInteraction::default()),
            ViewMode::Top => Interaction::Disabled,
        };
        self.start_transition(true);
        true
    }

    /// New screen set: refresh extents and retarget the current mode in place.
    pub fn set_extents(&mut self, extents: ScreenExtents) {
        self.extents = extents;
        if let Interaction::Front(front) = &mut self.interaction {
            front.look.set_limits(&extents);
        }
    }

    /// Recompute the current mode's target from the extents and ease toward
    /// it from wherever the camera is now.
    pub fn retarget(&mut self) {
        self.start_transition(false);
    }

    fn start_transition(&mut self, entering: bool) {
        let seed = self.camera.pose();
        self.animation = match self.mode {
            ViewMode::Front => {
                self.orbit.enabled = false;
                self.zoom.set_factor(crate::constants::ZOOM_NEUTRAL);
                Animation::front(front_pose())
            }
            ViewMode::Top => {
                self.orbit.enabled = false;
                Animation::top(top_pose(&self.extents))
            }
            ViewMode::Isometric => {
                let iso = isometric_target(&self.extents, &self.config);
                self.orbit.enabled = true;
                if entering {
                    self.zoom = ZoomState::new(iso.base_distance);
                } else {
                    self.zoom.base_distance = iso.base_distance;
                }
                let mut target = iso.spherical;
                target.radius = self.zoom.effective_radius();
                Animation::orbit(seed, iso.orbit_target, target)
            }
        };
        log::debug!(
            "[camera] transition {:?} furthest={:.3}m",
            self.mode,
            self.extents.furthest_m
        );
    }

    pub fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
    }

    /// One animation tick plus the look-around spring.
    pub fn tick(&mut self) -> StepOutcome {
        let mut pose = self.camera.pose();
        let outcome = self.animation.step(
            &mut pose,
            self.config.lerp_ratio,
            self.config.convergence_threshold,
        );
        self.camera.set_pose(pose);
        if outcome == StepOutcome::Converged {
            if self.mode == ViewMode::Isometric {
                self.orbit.target = self.camera.target;
                self.orbit.sync_from_position(self.camera.eye);
            }
            log::debug!("[camera] settled in {:?}", self.mode);
        }
        if let Interaction::Front(front) = &mut self.interaction {
            if front.drag.is_none() {
                front.look.step_spring_back(
                    self.config.spring_back_ratio,
                    self.config.spring_back_threshold,
                );
            }
        }
        outcome
    }

    /// Camera to render with: the base pose plus the head turn in front view.
    pub fn view_camera(&self) -> Camera {
        let mut cam = self.camera.clone();
        if let Some(look) = self.look_around() {
            let pose: CameraPose = self.camera.pose();
            cam.target = pose.position + look.apply(pose.direction());
            cam.up = look.apply(pose.up);
        }
        cam
    }

    pub(crate) fn apply_orbit_pose(&mut self) {
        self.camera.eye = self.orbit.camera_position();
        self.camera.target = self.orbit.target;
        self.camera.up = WORLD_UP;
    }
}

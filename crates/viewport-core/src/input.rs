//! Gesture routing: pointer, touch and wheel input mapped onto the active
//! view mode's interaction.
//!
//! Exactly one interaction variant is live at a time, chosen by the view mode,
//! so combinations such as pinching in front view cannot be represented.

use crate::animation::Animation;
use crate::camera::{clamp_polar, wrap_angle, LookAroundState};
use crate::constants::WORLD_UP;
use crate::controller::CameraController;
use glam::Vec2;
use smallvec::SmallVec;

enum OrbitAction {
    Rotate(Vec2),
    Zoom(f32),
}

/// Look-around drag in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookDrag {
    pub pointer_id: i32,
    pub start: Vec2,
    pub start_yaw: f32,
    pub start_pitch: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontInteraction {
    pub look: LookAroundState,
    pub drag: Option<LookDrag>,
}

impl FrontInteraction {
    pub fn new(look: LookAroundState) -> Self {
        Self { look, drag: None }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OrbitGesture {
    #[default]
    Idle,
    Rotating {
        pointer_id: i32,
        last: Vec2,
    },
    Pinching {
        last_distance: f32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OrbitInteraction {
    pub gesture: OrbitGesture,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interaction {
    Front(FrontInteraction),
    Orbit(OrbitInteraction),
    Disabled,
}

/// Pointers currently pressed on the surface, in press order.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    pointers: SmallVec<[(i32, Vec2); 4]>,
}

impl PointerTracker {
    pub fn press(&mut self, id: i32, pos: Vec2) {
        match self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => entry.1 = pos,
            None => self.pointers.push((id, pos)),
        }
    }

    /// Returns false for pointers that were never pressed (hover moves).
    pub fn update(&mut self, id: i32, pos: Vec2) -> bool {
        match self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => {
                entry.1 = pos;
                true
            }
            None => false,
        }
    }

    pub fn release(&mut self, id: i32) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|(pid, _)| *pid != id);
        self.pointers.len() != before
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn first(&self) -> Option<(i32, Vec2)> {
        self.pointers.first().copied()
    }

    /// Distance between the two earliest pointers.
    pub fn pair_distance(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [(_, a), (_, b), ..] => Some(a.distance(*b)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

/// Wheel notch -> zoom multiplier; positive deltas (scrolling down) zoom out.
#[inline]
pub fn wheel_multiplier(delta_y: f32, step: f32) -> Option<f32> {
    if delta_y > 0.0 {
        Some(step)
    } else if delta_y < 0.0 {
        Some(1.0 / step)
    } else {
        None
    }
}

/// Consecutive pinch distances -> zoom multiplier. Spreading the fingers
/// (growing distance) gives a value below 1, i.e. zoom in.
#[inline]
pub fn pinch_multiplier(previous: f32, current: f32, sensitivity: f32) -> Option<f32> {
    if !(previous > 0.0 && current > 0.0) {
        return None;
    }
    let ratio = previous / current;
    Some((1.0 + (ratio - 1.0) * sensitivity).max(f32::EPSILON))
}

impl CameraController {
    pub fn pointer_down(&mut self, pointer_id: i32, pos: Vec2) {
        self.pointers.press(pointer_id, pos);
        let count = self.pointers.len();
        if let Interaction::Front(front) = &mut self.interaction {
            if count == 1 {
                front.look.set_limits(&self.extents);
                front.look.spring_back = false;
                front.drag = Some(LookDrag {
                    pointer_id,
                    start: pos,
                    start_yaw: front.look.yaw,
                    start_pitch: front.look.pitch,
                });
                log::debug!("[input] look-around start at ({:.0},{:.0})", pos.x, pos.y);
            }
            return;
        }
        if !self.orbit_input_enabled() {
            return;
        }
        self.take_over_from_animation();
        let gesture = match (count, self.pointers.pair_distance()) {
            (1, _) => OrbitGesture::Rotating {
                pointer_id,
                last: pos,
            },
            (_, Some(d)) => OrbitGesture::Pinching { last_distance: d },
            _ => OrbitGesture::Idle,
        };
        if let Interaction::Orbit(orbit) = &mut self.interaction {
            orbit.gesture = gesture;
        }
        log::debug!("[input] orbit gesture {:?}", gesture);
    }

    pub fn pointer_move(&mut self, pointer_id: i32, pos: Vec2) {
        if !self.pointers.update(pointer_id, pos) {
            return;
        }
        let rad_per_px = self.config.fovy_radians / self.viewport.height_px as f32;
        let pair = self.pointers.pair_distance();
        let action = match &mut self.interaction {
            Interaction::Front(front) => {
                if let Some(drag) = front.drag.filter(|d| d.pointer_id == pointer_id) {
                    // The scene follows the pointer, so the head turns the other way.
                    let delta = pos - drag.start;
                    front.look.set_angles(
                        drag.start_yaw + delta.x * rad_per_px,
                        drag.start_pitch + delta.y * rad_per_px,
                    );
                }
                None
            }
            Interaction::Orbit(orbit) => match (orbit.gesture, pair) {
                (OrbitGesture::Rotating { pointer_id: id, last }, _) if id == pointer_id => {
                    orbit.gesture = OrbitGesture::Rotating {
                        pointer_id: id,
                        last: pos,
                    };
                    Some(OrbitAction::Rotate(pos - last))
                }
                (OrbitGesture::Pinching { last_distance }, Some(distance)) => {
                    orbit.gesture = OrbitGesture::Pinching {
                        last_distance: distance,
                    };
                    pinch_multiplier(last_distance, distance, self.config.pinch_sensitivity)
                        .map(OrbitAction::Zoom)
                }
                _ => None,
            },
            Interaction::Disabled => None,
        };
        match action {
            Some(OrbitAction::Rotate(delta)) => self.rotate_orbit(delta),
            Some(OrbitAction::Zoom(m)) => self.apply_zoom(m),
            None => {}
        }
    }

    pub fn pointer_up(&mut self, pointer_id: i32) {
        if !self.pointers.release(pointer_id) {
            return;
        }
        let remaining = self.pointers.first();
        let pair = self.pointers.pair_distance();
        match &mut self.interaction {
            Interaction::Front(front) => {
                if front.drag.is_some_and(|d| d.pointer_id == pointer_id) {
                    front.drag = None;
                    front.look.spring_back = true;
                }
            }
            Interaction::Orbit(orbit) => {
                orbit.gesture = match (orbit.gesture, pair, remaining) {
                    (OrbitGesture::Pinching { .. }, Some(d), _) => {
                        OrbitGesture::Pinching { last_distance: d }
                    }
                    (OrbitGesture::Pinching { .. }, None, Some((id, last))) => {
                        OrbitGesture::Rotating {
                            pointer_id: id,
                            last,
                        }
                    }
                    (g @ OrbitGesture::Rotating { pointer_id: id, .. }, _, _)
                        if id != pointer_id =>
                    {
                        g
                    }
                    _ => OrbitGesture::Idle,
                };
            }
            Interaction::Disabled => {}
        }
    }

    /// Lost pointers (e.g. touch cancel) end their gesture like a release.
    pub fn pointer_cancel(&mut self, pointer_id: i32) {
        self.pointer_up(pointer_id);
    }

    pub fn wheel(&mut self, delta_y: f32) {
        if !self.orbit_input_enabled() {
            return;
        }
        if let Some(m) = wheel_multiplier(delta_y, self.config.wheel_zoom_step) {
            self.apply_zoom(m);
        }
    }

    fn orbit_input_enabled(&self) -> bool {
        matches!(self.interaction, Interaction::Orbit(_)) && self.orbit.enabled
    }

    /// Stop any in-flight transition and continue from the live camera so a
    /// grab never snaps to a stale target.
    fn take_over_from_animation(&mut self) {
        if let Animation::Orbit(a) = self.animation {
            self.orbit.target = a.pivot;
        } else if self.animation.is_active() {
            self.orbit.target = self.camera.target;
        }
        if self.animation.is_active() {
            self.animation = Animation::Idle;
            self.camera.up = WORLD_UP;
            log::debug!("[input] interrupted camera transition");
        }
        self.orbit.sync_from_position(self.camera.eye);
        if self.orbit.spherical.radius > 0.0 {
            self.zoom
                .set_factor(self.zoom.base_distance / self.orbit.spherical.radius);
        }
    }

    fn rotate_orbit(&mut self, delta: Vec2) {
        if self.animation.is_active() {
            self.take_over_from_animation();
        }
        let speed = self.config.rotate_speed;
        let s = &mut self.orbit.spherical;
        s.azimuth = wrap_angle(s.azimuth - delta.x * speed);
        s.polar = clamp_polar(s.polar - delta.y * speed);
        self.apply_orbit_pose();
    }

    pub(crate) fn apply_zoom(&mut self, multiplier: f32) {
        self.zoom.apply_multiplier(multiplier);
        let radius = self.zoom.effective_radius();
        if let Animation::Orbit(a) = &mut self.animation {
            a.target.radius = radius;
        } else {
            self.orbit.spherical.radius = radius;
            self.apply_orbit_pose();
        }
    }
}

//! Per-tick easing of the camera toward a mode's target pose.
//!
//! Each view mode blends different quantities, so every mode has its own
//! variant, built fresh on each switch/retarget with the live pose as seed.

use crate::camera::{wrap_angle, CameraPose, Spherical};
use crate::constants::WORLD_UP;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Idle,
    Running,
    Converged,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontAnimation {
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopAnimation {
    pub target: CameraPose,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitAnimation {
    /// Working pivot and spherical values, seeded from the pre-switch camera.
    pub pivot: Vec3,
    pub current: Spherical,
    pub target_pivot: Vec3,
    pub target: Spherical,
}

impl OrbitAnimation {
    pub fn final_position(&self) -> Vec3 {
        self.target_pivot + self.target.to_offset()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Animation {
    #[default]
    Idle,
    Front(FrontAnimation),
    Top(TopAnimation),
    Orbit(OrbitAnimation),
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blend two angles along the shorter arc; result wrapped to (-pi, pi].
#[inline]
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    wrap_angle(current + wrap_angle(target - current) * t)
}

#[inline]
fn blend_unit(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t).try_normalize().unwrap_or(to)
}

impl Animation {
    pub fn front(target: CameraPose) -> Self {
        Animation::Front(FrontAnimation {
            position: target.position,
            direction: target.direction(),
            up: target.up,
        })
    }

    pub fn top(target: CameraPose) -> Self {
        Animation::Top(TopAnimation { target })
    }

    /// Orbit from wherever the camera is now. `seed` supplies the pivot the
    /// camera is currently looking at so the rotation center glides to the new
    /// pivot instead of jumping. The seed is measured unclamped: a top-down
    /// camera sits on the pole and must start exactly there.
    pub fn orbit(seed: CameraPose, target_pivot: Vec3, target: Spherical) -> Self {
        Animation::Orbit(OrbitAnimation {
            pivot: seed.look_at,
            current: Spherical::measured(seed.position - seed.look_at),
            target_pivot,
            target,
        })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Animation::Idle)
    }

    /// Advance one tick, writing the blended pose into `pose`. On convergence
    /// the pose is snapped to the exact target and the animation goes idle.
    pub fn step(&mut self, pose: &mut CameraPose, ratio: f32, threshold: f32) -> StepOutcome {
        let converged = match self {
            Animation::Idle => return StepOutcome::Idle,
            Animation::Front(a) => step_front(a, pose, ratio, threshold),
            Animation::Top(a) => step_top(a, pose, ratio, threshold),
            Animation::Orbit(a) => step_orbit(a, pose, ratio, threshold),
        };
        if converged {
            *self = Animation::Idle;
            StepOutcome::Converged
        } else {
            StepOutcome::Running
        }
    }
}

fn step_front(a: &FrontAnimation, pose: &mut CameraPose, t: f32, eps: f32) -> bool {
    let position = pose.position.lerp(a.position, t);
    let direction = blend_unit(pose.direction(), a.direction, t);
    let up = blend_unit(pose.up, a.up, t);
    let done = position.distance(a.position) < eps
        && direction.distance(a.direction) < eps
        && up.distance(a.up) < eps;
    *pose = if done {
        CameraPose {
            position: a.position,
            look_at: a.position + a.direction,
            up: a.up,
        }
    } else {
        CameraPose {
            position,
            look_at: position + direction,
            up,
        }
    };
    done
}

fn step_top(a: &TopAnimation, pose: &mut CameraPose, t: f32, eps: f32) -> bool {
    let target = a.target;
    let position = pose.position.lerp(target.position, t);
    let look_at = pose.look_at.lerp(target.look_at, t);
    let up = blend_unit(pose.up, target.up, t);
    let done = position.distance(target.position) < eps
        && look_at.distance(target.look_at) < eps
        && up.distance(target.up) < eps;
    *pose = if done {
        target
    } else {
        CameraPose {
            position,
            look_at,
            up,
        }
    };
    done
}

fn step_orbit(a: &mut OrbitAnimation, pose: &mut CameraPose, t: f32, eps: f32) -> bool {
    a.pivot = a.pivot.lerp(a.target_pivot, t);
    a.current = Spherical {
        radius: lerp(a.current.radius, a.target.radius, t),
        polar: lerp(a.current.polar, a.target.polar, t),
        azimuth: lerp_angle(a.current.azimuth, a.target.azimuth, t),
    };
    let position = a.pivot + a.current.to_offset();
    let up = blend_unit(pose.up, WORLD_UP, t);
    let final_position = a.final_position();
    let done = position.distance(final_position) < eps
        && a.pivot.distance(a.target_pivot) < eps
        && up.distance(WORLD_UP) < eps;
    *pose = if done {
        CameraPose {
            position: final_position,
            look_at: a.target_pivot,
            up: WORLD_UP,
        }
    } else {
        CameraPose {
            position,
            look_at: a.pivot,
            up,
        }
    };
    done
}

use glam::Vec3;
use tracing::debug;

use crate::controller::input::{ActionSet, MoveAction};
use crate::model::{AnimationMixer, Transform};

/// Local-space forward axis of the player.
pub const FORWARD: Vec3 = Vec3::Z;
/// Local-space right axis of the player.
pub const RIGHT: Vec3 = Vec3::X;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// Animation paused, no displacement.
    Idle,
    /// Animation playing, displacement applied.
    Moving,
}

/// Turns held actions into player yaw and displacement each frame and keeps
/// the walk animation in step with whether the player is moving.
pub struct MovementResolver {
    pub move_speed: f32,
    pub rotation_speed: f32,
    state: MotionState,
}

impl MovementResolver {
    pub fn new(move_speed: f32, rotation_speed: f32) -> Self {
        Self {
            move_speed,
            rotation_speed,
            state: MotionState::Idle,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Sum of the unit contributions of every held translation action.
    pub fn direction(actions: ActionSet) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if actions.contains(MoveAction::MoveForward) {
            dir += FORWARD;
        }
        if actions.contains(MoveAction::MoveBack) {
            dir -= FORWARD;
        }
        if actions.contains(MoveAction::StrafeLeft) {
            dir -= RIGHT;
        }
        if actions.contains(MoveAction::StrafeRight) {
            dir += RIGHT;
        }
        dir
    }

    /// Optimistic resume from a key-down / touch-start handler.
    pub fn resume(&mut self, mixer: Option<&mut AnimationMixer>) {
        self.transition(MotionState::Moving, mixer);
    }

    /// Pause from a key-up / touch-end handler.
    pub fn pause(&mut self, mixer: Option<&mut AnimationMixer>) {
        self.transition(MotionState::Idle, mixer);
    }

    fn transition(&mut self, next: MotionState, mixer: Option<&mut AnimationMixer>) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "motion state change");
        }
        self.state = next;
        if let Some(mixer) = mixer {
            mixer.set_paused(next == MotionState::Idle);
        }
    }

    /// Apply one frame of movement to the player's visual transform.
    ///
    /// Turning is applied first, so the displacement follows the new heading.
    /// Returns the displacement that was added to the position.
    pub fn resolve(
        &mut self,
        actions: ActionSet,
        player: &mut Transform,
        mixer: Option<&mut AnimationMixer>,
        dt: f32,
    ) -> Vec3 {
        if actions.contains(MoveAction::TurnLeft) {
            player.yaw += self.rotation_speed * dt;
        }
        if actions.contains(MoveAction::TurnRight) {
            player.yaw -= self.rotation_speed * dt;
        }

        let dir = Self::direction(actions);
        if dir.length_squared() == 0.0 {
            self.transition(MotionState::Idle, mixer);
            return Vec3::ZERO;
        }

        self.transition(MotionState::Moving, mixer);
        let displacement = player.rotation() * (dir.normalize() * self.move_speed * dt);
        player.position += displacement;
        displacement
    }
}

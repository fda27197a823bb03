//! Shared target state written by the command path and read by the slew task.
//!
//! Targets are plain atomics: a store from the command context is a single
//! indivisible write, so the slew task never sees a torn value and the command
//! path never blocks. The `current` half of the state lives in
//! [`SlewController`](super::slew::SlewController), which is its only writer.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::utils::math::scaling::{clamp_angle, clamp_power};

/// Process-wide target state shared by every task.
pub static ACTUATOR_STATE: ActuatorState = ActuatorState::new();

pub struct ActuatorState {
    target_drive: AtomicI32,
    target_steer: AtomicI32,
}

/// Point-in-time copy of both halves of the actuator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorSnapshot {
    pub current_drive: i32,
    pub current_steer: i32,
    pub target_drive: i32,
    pub target_steer: i32,
}

impl ActuatorState {
    pub const fn new() -> Self {
        ActuatorState {
            target_drive: AtomicI32::new(0),
            target_steer: AtomicI32::new(0),
        }
    }

    /// Store a new drive target, clamped to `[-100, 100]`.
    pub fn set_drive_target(
        &self,
        power: i32,
    ) {
        self.target_drive
            .store(clamp_power(power), Ordering::Release);
    }

    /// Store a new steering target, clamped to the steering lock.
    pub fn set_steer_target(
        &self,
        angle: i32,
    ) {
        self.target_steer
            .store(clamp_angle(angle), Ordering::Release);
    }

    pub fn drive_target(&self) -> i32 {
        self.target_drive.load(Ordering::Acquire)
    }

    pub fn steer_target(&self) -> i32 {
        self.target_steer.load(Ordering::Acquire)
    }
}

impl Default for ActuatorState {
    fn default() -> Self {
        Self::new()
    }
}

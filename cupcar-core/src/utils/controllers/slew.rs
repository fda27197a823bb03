//! Rate-limited convergence of the actuators toward their targets.
//!
//! Every tick moves each axis at most one unit toward the target currently
//! stored in [`ActuatorState`], so the slew rate is bounded by the tick period
//! alone. An axis only touches hardware on ticks where its value changed.

use embedded_hal::i2c::I2c;

use crate::utils::{
    config::ChannelPattern,
    controllers::{frame::encode_drive_frame, i2c::Actuators, state::{ActuatorSnapshot, ActuatorState}},
    math::scaling::{angle_to_pulse, scale_power},
};

/// What one axis did on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisStep {
    AtTarget,
    Rising,
    Falling,
}

impl AxisStep {
    pub fn moved(self) -> bool {
        self != AxisStep::AtTarget
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub drive: AxisStep,
    pub steer: AxisStep,
}

/// Step `current` one unit toward `target`.
pub fn step_toward(
    current: &mut i32,
    target: i32,
) -> AxisStep {
    if *current < target {
        *current += 1;
        AxisStep::Rising
    } else if *current > target {
        *current -= 1;
        AxisStep::Falling
    } else {
        AxisStep::AtTarget
    }
}

/// Owner of the `current` drive power and steering angle.
pub struct SlewController {
    current_drive: i32,
    current_steer: i32,
    register: u8,
    pattern: ChannelPattern,
}

impl SlewController {
    /// Start at rest, writing drive frames to `register` with `pattern`.
    pub fn new(
        register: u8,
        pattern: ChannelPattern,
    ) -> Self {
        SlewController {
            current_drive: 0,
            current_steer: 0,
            register,
            pattern,
        }
    }

    pub fn current_drive(&self) -> i32 {
        self.current_drive
    }

    pub fn current_steer(&self) -> i32 {
        self.current_steer
    }

    pub fn snapshot(
        &self,
        state: &ActuatorState,
    ) -> ActuatorSnapshot {
        ActuatorSnapshot {
            current_drive: self.current_drive,
            current_steer: self.current_steer,
            target_drive: state.drive_target(),
            target_steer: state.steer_target(),
        }
    }

    /// Run one controller step against the targets visible right now.
    ///
    /// Write failures are logged only; `current` has already advanced and the
    /// next tick carries on from it.
    pub fn tick<I2C, E>(
        &mut self,
        state: &ActuatorState,
        actuators: &mut Actuators<'_, I2C>,
    ) -> TickOutcome
    where
        I2C: I2c<Error = E> + 'static,
        E: core::fmt::Debug,
    {
        let drive = step_toward(&mut self.current_drive, state.drive_target());
        if drive.moved() {
            let frame = encode_drive_frame(
                self.register,
                scale_power(self.current_drive),
                self.pattern,
            );
            if let Err(e) = actuators.write_drive(&frame) {
                tracing::error!(?e, current = self.current_drive, "drive frame write failed");
            }
        }

        let steer = step_toward(&mut self.current_steer, state.steer_target());
        if steer.moved() {
            if let Err(e) = actuators.steer_pulse(angle_to_pulse(self.current_steer)) {
                tracing::error!(?e, current = self.current_steer, "steering pulse write failed");
            }
        }

        TickOutcome { drive, steer }
    }
}

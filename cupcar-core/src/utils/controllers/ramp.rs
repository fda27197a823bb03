//! Open-loop ramps between two drive powers or two steering angles.
//!
//! A ramp walks one unit at a time from its start value to its end value,
//! inclusive, writing one frame per step and awaiting the delay between
//! writes. Ramps never read or write [`ActuatorState`](super::state::ActuatorState),
//! and they hold the actuator lock for one frame at a time only. Nothing stops
//! a ramp and the slew task from writing the same channel in between.

use embassy_sync::{blocking_mutex::raw::RawMutex, mutex::Mutex};
use embedded_hal::i2c::I2c;
use embedded_hal_async::delay::DelayNs;

use crate::utils::{
    config::ChannelPattern,
    controllers::{frame::encode_drive_frame, i2c::Actuators},
    math::scaling::{angle_to_pulse, clamp_angle, clamp_power, scale_power},
};

/// Frames written by a ramp and how many of them failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RampSummary {
    pub frames: u32,
    pub failures: u32,
}

/// Every integer from `start` to `end` inclusive, in the direction of travel.
pub fn unit_steps(
    start: i32,
    end: i32,
) -> impl Iterator<Item = i32> {
    let ascending = start <= end;
    let span = start.abs_diff(end);
    (0..=span).map(move |i| {
        let i = i as i32;
        if ascending {
            start + i
        } else {
            start - i
        }
    })
}

/// Sweep the drive power from `start_power` to `end_power`.
///
/// Both endpoints are clamped and scaled first; the sweep then covers every
/// scaled value between them, so it issues
/// `|scale_power(end) - scale_power(start)| + 1` frames.
#[allow(clippy::too_many_arguments)]
pub async fn ramp_drive<M, I2C, E, D>(
    actuators: &Mutex<M, Actuators<'_, I2C>>,
    delay: &mut D,
    register: u8,
    start_power: i32,
    end_power: i32,
    step_ms: u32,
    pattern: ChannelPattern,
) -> RampSummary
where
    M: RawMutex,
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
    D: DelayNs,
{
    let start = scale_power(clamp_power(start_power));
    let end = scale_power(clamp_power(end_power));
    tracing::info!(start, end, step_ms, "drive ramp");

    let mut summary = RampSummary::default();
    for (i, scaled) in unit_steps(start, end).enumerate() {
        if i > 0 {
            delay.delay_ms(step_ms).await;
        }
        let result = {
            let mut acts = actuators.lock().await;
            let register = acts.config().register_or_default(register);
            acts.write_drive(&encode_drive_frame(register, scaled, pattern))
        };
        summary.frames += 1;
        if let Err(e) = result {
            summary.failures += 1;
            tracing::error!(?e, scaled, "drive ramp frame failed");
        }
    }
    summary
}

/// Sweep the steering from `start_angle` to `end_angle`, one degree per step.
///
/// Steps are whole degrees, not single units of the pulse width: each step
/// writes `angle_to_pulse(angle)`, so a full-lock sweep is 181 writes about
/// 5.6 µs of pulse apart. The pause between steps comes from the actuators'
/// configured `steer_step_ms`.
pub async fn ramp_steer<M, I2C, E, D>(
    actuators: &Mutex<M, Actuators<'_, I2C>>,
    delay: &mut D,
    start_angle: i32,
    end_angle: i32,
) -> RampSummary
where
    M: RawMutex,
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
    D: DelayNs,
{
    let start = clamp_angle(start_angle);
    let end = clamp_angle(end_angle);
    let step_ms = actuators.lock().await.config().steer_step_ms;
    tracing::info!(start, end, step_ms, "steering ramp");

    let mut summary = RampSummary::default();
    for (i, angle) in unit_steps(start, end).enumerate() {
        if i > 0 {
            delay.delay_ms(step_ms).await;
        }
        let result = actuators.lock().await.steer_pulse(angle_to_pulse(angle));
        summary.frames += 1;
        if let Err(e) = result {
            summary.failures += 1;
            tracing::error!(?e, angle, "steering ramp step failed");
        }
    }
    summary
}

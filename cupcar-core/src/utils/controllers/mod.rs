//! Module Exports
//!
//! This file exports the actuator controllers and the task loops that drive them.
//!
//! - `i2c`: motor driver and steering servo on the shared I2C bus.
//! - `frame`: motor driver frame encoding.
//! - `state`: lock-free target state shared with the command path.
//! - `slew`: one-unit-per-tick convergence toward the targets.
//! - `ramp`: open-loop power ramps and steering sweeps.
//! - `stop`: deferred stop frames for timed drive commands.

pub mod frame;
/// Module for managing I2C-connected actuators.
pub mod i2c;
pub mod ramp;
pub mod slew;
pub mod state;
pub mod stop;

use embassy_sync::{
    blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex},
    mutex::Mutex,
};
use embassy_time::{Delay, Duration, Ticker};
use embedded_hal::i2c::I2c;
use embedded_hal_async::delay::DelayNs;

use crate::utils::{
    command::maneuver::{ManeuverCommand, MANEUVER_CHANNEL},
    config::ActuatorConfig,
};

pub use frame::{encode_drive_frame, DriveFrame};
pub use i2c::{Actuator, Actuators, DeviceError};
pub use ramp::RampSummary;
pub use slew::SlewController;
pub use state::{ActuatorState, ACTUATOR_STATE};
pub use stop::{StopScheduler, STOP_SCHEDULER};

/// Actuators shared between the slew, maneuver and stop tasks.
pub type SharedActuators<'a, I2C> = Mutex<CriticalSectionRawMutex, Actuators<'a, I2C>>;

/// Run one maneuver to completion.
///
/// Drive writes its frame immediately and hands the duration to `stops`;
/// ramps and sweeps block the caller for their whole length.
pub async fn execute_maneuver<M, MS, I2C, E, D>(
    command: ManeuverCommand,
    actuators: &Mutex<M, Actuators<'_, I2C>>,
    stops: &StopScheduler<MS>,
    delay: &mut D,
) -> Result<(), DeviceError<E>>
where
    M: RawMutex,
    MS: RawMutex,
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
    D: DelayNs,
{
    match command {
        ManeuverCommand::Drive { r, p, d } => {
            let mut acts = actuators.lock().await;
            let pattern = acts.config().channel_pattern;
            let register = acts.config().register_or_default(r);
            let result = acts.drive_power(register, p, pattern);
            stops.schedule_stop(register, d);
            result.map(|_| ())
        }
        ManeuverCommand::Interp { r, s, e, t } => {
            let pattern = actuators.lock().await.config().channel_pattern;
            let summary = ramp::ramp_drive(actuators, delay, r, s, e, t, pattern).await;
            tracing::info!(?summary, "drive ramp finished");
            Ok(())
        }
        ManeuverCommand::Steer { s, e } => {
            let summary = ramp::ramp_steer(actuators, delay, s, e).await;
            tracing::info!(?summary, "steering ramp finished");
            Ok(())
        }
    }
}

/// Task loops over one shared actuator set.
///
/// Each loop is meant for its own executor task, so a long ramp never delays a
/// slew tick.
pub struct SystemController<I2C: 'static> {
    actuators: &'static SharedActuators<'static, I2C>,
    config: ActuatorConfig,
}

impl<I2C: 'static> Clone for SystemController<I2C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I2C: 'static> Copy for SystemController<I2C> {}

impl<I2C, E> SystemController<I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    pub fn new(
        actuators: &'static SharedActuators<'static, I2C>,
        config: ActuatorConfig,
    ) -> Self {
        SystemController { actuators, config }
    }

    pub fn actuators(&self) -> &'static SharedActuators<'static, I2C> {
        self.actuators
    }

    /// Periodic slew task: one controller tick every `tick_ms`.
    pub async fn slew_ch(&self) -> ! {
        let mut slew = SlewController::new(self.config.drive_register, self.config.channel_pattern);
        let mut ticker = Ticker::every(Duration::from_millis(self.config.tick_ms));
        tracing::info!(tick_ms = self.config.tick_ms, "slew controller running");
        loop {
            ticker.next().await;
            let outcome = {
                let mut acts = self.actuators.lock().await;
                slew.tick(&ACTUATOR_STATE, &mut *acts)
            };
            if outcome.drive.moved() || outcome.steer.moved() {
                tracing::trace!(snapshot = ?slew.snapshot(&ACTUATOR_STATE), "slew step");
            }
        }
    }

    /// Maneuver task: runs queued maneuvers one after another.
    pub async fn maneuver_ch(&self) -> ! {
        let mut delay = Delay;
        loop {
            let command = MANEUVER_CHANNEL.receiver().receive().await;
            tracing::info!("Received maneuver: {:?}", command);
            match execute_maneuver(command, self.actuators, &STOP_SCHEDULER, &mut delay).await {
                Ok(()) => tracing::info!("maneuver executed successfully"),
                Err(e) => tracing::error!(?e, "maneuver failed"),
            }
        }
    }

    /// Stop task: writes the zero frame for each timed drive that runs out.
    pub async fn stop_ch(&self) -> ! {
        let mut delay = Delay;
        STOP_SCHEDULER.run(self.actuators, &mut delay).await
    }
}

//! Deferred stop frames for timed drive commands.
//!
//! `schedule_stop` only records the request and returns. A dedicated task
//! running [`StopScheduler::run`] waits the duration out and then writes one
//! all-zero frame. At most one stop is pending: a newer request replaces it,
//! so a stale stop cannot cut short a later drive command.

use embassy_futures::select::{select, Either};
use embassy_sync::{
    blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex},
    mutex::Mutex,
    signal::Signal,
};
use embedded_hal::i2c::I2c;
use embedded_hal_async::delay::DelayNs;

use crate::utils::controllers::i2c::Actuators;

/// Stop scheduler shared by the maneuver path and the stop task.
pub static STOP_SCHEDULER: StopScheduler<CriticalSectionRawMutex> = StopScheduler::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// Stop `register` once `after_ms` has elapsed.
    Arm { register: u8, after_ms: u32 },
    /// Drop whatever stop is pending.
    Cancel,
}

pub struct StopScheduler<M: RawMutex> {
    request: Signal<M, StopRequest>,
}

impl<M: RawMutex> StopScheduler<M> {
    pub const fn new() -> Self {
        StopScheduler {
            request: Signal::new(),
        }
    }

    /// Arrange a stop `duration_s` seconds from now, replacing any pending one.
    ///
    /// A duration of `0` cancels the pending stop and schedules nothing.
    pub fn schedule_stop(
        &self,
        register: u8,
        duration_s: u32,
    ) {
        if duration_s == 0 {
            self.cancel();
            return;
        }
        tracing::debug!(register, duration_s, "stop scheduled");
        self.request.signal(StopRequest::Arm {
            register,
            after_ms: duration_s.saturating_mul(1000),
        });
    }

    pub fn cancel(&self) {
        self.request.signal(StopRequest::Cancel);
    }

    /// Wait until a pending stop runs out without being replaced.
    ///
    /// Returns the register the stop is aimed at.
    pub async fn next_stop<D: DelayNs>(
        &self,
        delay: &mut D,
    ) -> u8 {
        let mut request = self.request.wait().await;
        loop {
            match request {
                StopRequest::Cancel => {
                    tracing::debug!("pending stop cancelled");
                    request = self.request.wait().await;
                }
                StopRequest::Arm { register, after_ms } => {
                    match select(delay.delay_ms(after_ms), self.request.wait()).await {
                        Either::First(()) => return register,
                        Either::Second(next) => {
                            tracing::debug!(register, "pending stop superseded");
                            request = next;
                        }
                    }
                }
            }
        }
    }

    /// Wait for the next stop to fall due and write its zero frame.
    pub async fn run_once<MA, I2C, E, D>(
        &self,
        actuators: &Mutex<MA, Actuators<'_, I2C>>,
        delay: &mut D,
    ) -> u8
    where
        MA: RawMutex,
        I2C: I2c<Error = E> + 'static,
        E: core::fmt::Debug,
        D: DelayNs,
    {
        let register = self.next_stop(delay).await;
        let mut acts = actuators.lock().await;
        let register = acts.config().register_or_default(register);
        match acts.stop(register) {
            Ok(_) => tracing::info!("timed stop on register 0x{:02X}", register),
            Err(e) => tracing::error!(?e, "timed stop write failed"),
        }
        register
    }

    pub async fn run<MA, I2C, E, D>(
        &self,
        actuators: &Mutex<MA, Actuators<'_, I2C>>,
        delay: &mut D,
    ) -> !
    where
        MA: RawMutex,
        I2C: I2c<Error = E> + 'static,
        E: core::fmt::Debug,
        D: DelayNs,
    {
        loop {
            self.run_once(actuators, delay).await;
        }
    }
}

impl<M: RawMutex> Default for StopScheduler<M> {
    fn default() -> Self {
        Self::new()
    }
}

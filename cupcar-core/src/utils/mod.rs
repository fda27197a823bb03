//! Utility re-exports and helper macros for the robot car.
//!
//! This module re-exports the actuator controllers, timing, scaling, and the
//! inbound command surfaces:
//!
//! - `command`: raw `P`/`S` command decoding and the maneuver surface
//! - `config`: calibration and wiring defaults for the actuators
//! - `controllers`: motor driver, steering servo, slew, ramps and timed stops
//! - `math`: power and angle scaling into the physical ranges
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod command;
pub mod config;
pub mod controllers;
pub mod math;

pub use command::decoder::dispatch;
pub use config::ActuatorConfig;
pub use controllers::SystemController;
pub use embassy_time::*;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}

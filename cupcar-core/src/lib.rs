//! Actuator-control core for a small steered robot car on no-std embedded platforms.
//!
//! For a runnable host simulation, see the `mock-mcu` crate in `cupcar-app/`.
#![no_std]

pub mod utils;

//! Inbound command surfaces.
//!
//! - `decoder`: raw `P`/`S` target commands from the wireless transport
//! - `maneuver`: direct-drive maneuvers (timed drive, ramps, steering sweeps)

pub mod decoder;
pub mod maneuver;

pub use decoder::{CommandError, CommandFrame, Opcode};
pub use maneuver::{ManeuverCommand, MANEUVER_CHANNEL};

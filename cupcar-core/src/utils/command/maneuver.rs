//! Direct-drive maneuvers: timed drive, power ramps and steering sweeps.
//!
//! Maneuvers bypass the target/current model and talk to the actuators
//! directly. They arrive either as shell-style lines
//! (`drive <power> <duration_s> <register>`,
//! `interp <start> <end> <step_ms> <register>`, `steer <start> <end>`) or as
//! JSON tagged by `"mc"`, and are queued on `MANEUVER_CHANNEL` for the
//! maneuver task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};

use crate::utils::command::decoder::parse_operand;

/// Channel used to receive maneuvers (`ManeuverCommand` messages).
pub static MANEUVER_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    ManeuverCommand,
    16,
> = embassy_sync::channel::Channel::new();

/// Maneuver variants.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum ManeuverCommand {
    /// Drive at power `p` now; stop after `d` seconds unless `d` is 0.
    Drive { r: u8, p: i32, d: u32 },
    /// Ramp power from `s` to `e`, `t` milliseconds per step.
    Interp { r: u8, s: i32, e: i32, t: u32 },
    /// Sweep the steering from angle `s` to angle `e`.
    Steer { s: i32, e: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverParseError {
    Empty,
    UnknownCommand,
    MissingArgument(&'static str),
    InvalidArgument(&'static str),
    TrailingArguments,
}

impl ManeuverCommand {
    /// Parse a shell-style maneuver line.
    ///
    /// Each numeric argument is read by its leading decimal prefix, so
    /// `0x33` reads as register `0` and `50%` as power `50`. An argument with
    /// no digits, or whose value does not fit its field, is rejected.
    pub fn parse(line: &str) -> Result<Self, ManeuverParseError> {
        let mut args = line.split_whitespace();
        let name = args.next().ok_or(ManeuverParseError::Empty)?;

        let command = match name {
            "drive" => ManeuverCommand::Drive {
                p: arg(&mut args, "power")?,
                d: arg(&mut args, "duration")?,
                r: arg(&mut args, "register")?,
            },
            "interp" => ManeuverCommand::Interp {
                s: arg(&mut args, "start")?,
                e: arg(&mut args, "end")?,
                t: arg(&mut args, "step")?,
                r: arg(&mut args, "register")?,
            },
            "steer" => ManeuverCommand::Steer {
                s: arg(&mut args, "start")?,
                e: arg(&mut args, "end")?,
            },
            _ => return Err(ManeuverParseError::UnknownCommand),
        };

        if args.next().is_some() {
            return Err(ManeuverParseError::TrailingArguments);
        }
        Ok(command)
    }

    /// Deserialize a JSON maneuver such as `{"mc":"steer","s":-20,"e":20}`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

fn arg<'a, T: TryFrom<i32>>(
    args: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, ManeuverParseError> {
    let text = args.next().ok_or(ManeuverParseError::MissingArgument(name))?;
    let operand = parse_operand(text.as_bytes());
    if operand.digits == 0 {
        return Err(ManeuverParseError::InvalidArgument(name));
    }
    if !operand.well_formed {
        tracing::debug!(name, text, value = operand.value, "using numeric prefix");
    }
    T::try_from(operand.value).map_err(|_| ManeuverParseError::InvalidArgument(name))
}

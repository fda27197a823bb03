//! Decoder for the short commands written by the wireless transport.
//!
//! A command is one opcode byte followed by an ASCII decimal operand, e.g.
//! `P50` (drive at 50 %) or `S-30` (steer 30° left). The operand is parsed the
//! forgiving way the transport's clients expect: a numeric prefix is used and
//! anything after it is ignored, and no digits at all reads as `0`.

use crate::utils::controllers::state::ActuatorState;

/// Largest command the transport forwards, in bytes.
pub const MAX_COMMAND_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `P`: drive power target.
    Drive,
    /// `S`: steering angle target.
    Steer,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'P' => Some(Opcode::Drive),
            b'S' => Some(Opcode::Steer),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Opcode::Drive => 'P',
            Opcode::Steer => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub opcode: Opcode,
    pub operand: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    TooLong(usize),
    UnrecognizedOpcode(u8),
}

/// Operand parsed from a command suffix, and whether all of it was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub value: i32,
    /// Number of decimal digits consumed.
    pub digits: usize,
    pub well_formed: bool,
}

/// Parse a leading decimal integer: optional whitespace, optional sign, digits.
///
/// Leading whitespace is any of space, `\t`, `\n`, `\v`, `\f` and `\r`.
/// Parsing stops at the first byte that does not fit; out-of-range values
/// saturate.
pub fn parse_operand(bytes: &[u8]) -> Operand {
    let mut rest = bytes;
    while let [b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C, tail @ ..] = rest {
        rest = tail;
    }

    let negative = match rest {
        [b'-', tail @ ..] => {
            rest = tail;
            true
        }
        [b'+', tail @ ..] => {
            rest = tail;
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    let mut digits = 0;
    for &byte in rest {
        if !byte.is_ascii_digit() {
            break;
        }
        let digit = i32::from(byte - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
        digits += 1;
    }

    Operand {
        value,
        digits,
        well_formed: digits > 0 && digits == rest.len(),
    }
}

/// Split a raw command into opcode and operand.
///
/// The logical command ends at the first NUL byte, if any.
pub fn decode(buf: &[u8]) -> Result<CommandFrame, CommandError> {
    if buf.len() > MAX_COMMAND_LEN {
        return Err(CommandError::TooLong(buf.len()));
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let (&op, operand) = buf[..end].split_first().ok_or(CommandError::Empty)?;
    let opcode = Opcode::from_byte(op).ok_or(CommandError::UnrecognizedOpcode(op))?;

    let parsed = parse_operand(operand);
    if !parsed.well_formed {
        tracing::warn!(
            opcode = ?opcode,
            operand = parsed.value,
            "malformed operand, using numeric prefix"
        );
    }

    Ok(CommandFrame {
        opcode,
        operand: parsed.value,
    })
}

/// Decode a raw command and store its operand as the matching target.
pub fn dispatch(
    buf: &[u8],
    state: &ActuatorState,
) -> Result<CommandFrame, CommandError> {
    match decode(buf) {
        Ok(frame) => {
            match frame.opcode {
                Opcode::Drive => state.set_drive_target(frame.operand),
                Opcode::Steer => state.set_steer_target(frame.operand),
            }
            tracing::info!(opcode = %frame.opcode.as_char(), operand = frame.operand, "target updated");
            Ok(frame)
        }
        Err(e) => {
            tracing::warn!(?e, "command ignored");
            Err(e)
        }
    }
}

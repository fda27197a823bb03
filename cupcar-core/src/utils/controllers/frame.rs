//! Motor driver frame encoding.
//!
//! A frame is the five bytes written to the driver in one I2C transaction: a
//! register selector followed by one signed speed byte per channel.

use crate::utils::config::{ChannelPattern, DEFAULT_DRIVE_REGISTER};

/// Register selector plus four channel bytes, in the driver's native encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveFrame {
    pub register: u8,
    pub channels: [u8; 4],
}

impl DriveFrame {
    /// Wire layout: `[register, c0, c1, c2, c3]`.
    pub fn to_bytes(&self) -> [u8; 5] {
        let [c0, c1, c2, c3] = self.channels;
        [self.register, c0, c1, c2, c3]
    }

    /// True when every channel is commanded to zero.
    pub fn is_stop(&self) -> bool {
        self.channels == [0; 4]
    }
}

/// Build a frame from an already scaled power and a channel pattern.
///
/// Each channel byte is `pattern[i] * scaled_power` truncated to its low byte,
/// so negative speeds go out as two's complement. Values past `i8` range wrap.
/// A `register` of `0` selects [`DEFAULT_DRIVE_REGISTER`].
pub fn encode_drive_frame(
    register: u8,
    scaled_power: i32,
    channel_pattern: ChannelPattern,
) -> DriveFrame {
    let register = if register == 0 {
        DEFAULT_DRIVE_REGISTER
    } else {
        register
    };
    let channels = channel_pattern.map(|polarity| (i32::from(polarity) * scaled_power) as u8);

    DriveFrame { register, channels }
}

/// All-zero frame for `register`.
pub fn stop_frame(register: u8) -> DriveFrame {
    encode_drive_frame(register, 0, [0; 4])
}

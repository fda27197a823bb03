//! Wiring and calibration for the car's actuators.
//!
//! Every field has a calibrated default, so a partial JSON document only needs
//! to name what differs on a given board:
//!
//! ```rust
//! use cupcar_core::utils::config::ActuatorConfig;
//! let cfg: ActuatorConfig = serde_json::from_str(r#"{ "tick_ms": 10 }"#).unwrap();
//! assert_eq!(cfg.tick_ms, 10);
//! assert_eq!(cfg.drive_register, 0x33);
//! ```

use serde::{Deserialize, Serialize};

/// Per-wheel polarity vector applied to a scaled power.
pub type ChannelPattern = [i8; 4];

/// Channels 2 and 4 driven with opposite polarity so both rear wheels turn the same way.
pub const DEFAULT_PATTERN: ChannelPattern = [0, 1, 0, -1];

/// Motor driver register that sets the four channel speeds.
pub const DEFAULT_DRIVE_REGISTER: u8 = 0x33;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// I2C address of the four-channel motor driver.
    pub drive_address: u8,
    /// Register used when a command asks for register `0`.
    pub drive_register: u8,
    pub channel_pattern: ChannelPattern,
    /// I2C address of the PWM expander driving the steering servo.
    pub servo_address: u8,
    /// Expander channel (0..=15) wired to the servo.
    pub servo_channel: u8,
    /// Expander prescale; 121 gives ~50 Hz from the 25 MHz oscillator.
    pub servo_prescale: u8,
    /// Slew controller period.
    pub tick_ms: u64,
    /// Pause between steering sweep steps.
    pub steer_step_ms: u32,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        ActuatorConfig {
            drive_address: 0x04,
            drive_register: DEFAULT_DRIVE_REGISTER,
            channel_pattern: DEFAULT_PATTERN,
            servo_address: 0x40,
            servo_channel: 0,
            servo_prescale: 121,
            tick_ms: 20,
            steer_step_ms: 15,
        }
    }
}

impl ActuatorConfig {
    /// Resolve a caller-supplied register, where `0` means the default drive register.
    pub fn register_or_default(
        &self,
        register: u8,
    ) -> u8 {
        if register == 0 {
            self.drive_register
        } else {
            register
        }
    }
}

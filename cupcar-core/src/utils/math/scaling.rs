//! Scaling from logical commands into the actuators' physical ranges.
//!
//! Drive power is a percentage in `[-100, 100]` and is mapped onto the motor
//! driver's signed range `[-P_MAX, P_MAX]`. Steering angle is in degrees in
//! `[-STEER_CLAMP, STEER_CLAMP]` and is mapped onto a servo pulse width in
//! nanoseconds.
//!
//! # Example
//! ```rust
//! use cupcar_core::utils::math::scaling::{angle_to_pulse, scale_power, PULSE_MAX};
//! assert_eq!(scale_power(100), 53);
//! assert_eq!(angle_to_pulse(90), PULSE_MAX);
//! ```

/// Largest magnitude the motor driver accepts for a channel.
pub const P_MAX: i32 = 53;
/// Logical drive power bound (percent).
pub const POWER_LIMIT: i32 = 100;
/// Steering angle bound (degrees either side of centre).
pub const STEER_CLAMP: i32 = 90;

/// Servo pulse width at full left lock (ns).
pub const PULSE_MIN: u32 = 1_000_000;
/// Servo pulse width at full right lock (ns).
pub const PULSE_MAX: u32 = 2_000_000;
/// Servo signal period, 50 Hz (ns).
pub const PULSE_PERIOD: u32 = 20_000_000;

/// Resolution of the PWM expander driving the servo.
const PWM_STEPS: u64 = 4096;
/// Internal oscillator of the PWM expander (Hz).
pub const PWM_OSC_HZ: u64 = 25_000_000;

/// Map a power percentage onto the driver range, rounding half away from zero.
///
/// Callers clamp `power` to `[-100, 100]` first; nothing is checked here.
pub fn scale_power(power: i32) -> i32 {
    let product = power * P_MAX;
    let half = POWER_LIMIT / 2;
    if product >= 0 {
        (product + half) / POWER_LIMIT
    } else {
        (product - half) / POWER_LIMIT
    }
}

/// Map a steering angle onto a servo pulse width (ns).
///
/// `-STEER_CLAMP` yields [`PULSE_MIN`] and `+STEER_CLAMP` yields [`PULSE_MAX`].
/// Angles outside the clamp are limited to it.
pub fn angle_to_pulse(angle: i32) -> u32 {
    let offset = (clamp_angle(angle) + STEER_CLAMP) as u32;
    PULSE_MIN + offset * (PULSE_MAX - PULSE_MIN) / (2 * STEER_CLAMP as u32)
}

/// Convert a pulse width into the off-count of a 12-bit PWM channel.
pub fn pulse_to_ticks(
    pulse_ns: u32,
    period_ns: u32,
) -> u16 {
    if period_ns == 0 {
        return 0;
    }
    let ticks = u64::from(pulse_ns) * PWM_STEPS / u64::from(period_ns);
    ticks.min(PWM_STEPS - 1) as u16
}

/// Output period (ns) of a PCA9685 running at `prescale` on its internal oscillator.
///
/// The expander counts `PWM_STEPS` ticks of `(prescale + 1) / PWM_OSC_HZ` per
/// period, so the default prescale of 121 lands just under 20 ms.
pub fn servo_period_ns(prescale: u8) -> u32 {
    let ns = (u64::from(prescale) + 1) * PWM_STEPS * 1_000_000_000 / PWM_OSC_HZ;
    ns as u32
}

/// Limit a drive power to the logical range.
pub fn clamp_power(power: i32) -> i32 {
    power.clamp(-POWER_LIMIT, POWER_LIMIT)
}

/// Limit a steering angle to the logical range.
pub fn clamp_angle(angle: i32) -> i32 {
    angle.clamp(-STEER_CLAMP, STEER_CLAMP)
}

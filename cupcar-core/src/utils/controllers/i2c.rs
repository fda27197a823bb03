//! I2C actuator management for the robot car.
//!
//! This module owns the two physical actuators hanging off the shared I2C bus:
//! the four-channel motor driver, which takes raw five-byte frames, and the
//! PCA9685 PWM expander that generates the steering servo pulse.

use core::cell::RefCell;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::i2c::RefCellDevice;
use pwm_pca9685::{Address as PwmAddress, Channel, Error as PwmError, Pca9685};

use crate::utils::{
    config::{ActuatorConfig, ChannelPattern},
    controllers::frame::{encode_drive_frame, stop_frame, DriveFrame},
    math::scaling::{
        angle_to_pulse, clamp_power, pulse_to_ticks, scale_power, servo_period_ns, PULSE_PERIOD,
    },
};

/// The physical actuator an operation was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuator {
    Drive,
    Steer,
}

/// Errors that can occur when interacting with the I2C actuators.
#[derive(Debug)]
pub enum DeviceError<E: core::fmt::Debug> {
    /// The actuator failed its init-time check; writes to it are refused.
    DeviceNotReady(Actuator),
    /// A motor driver frame was not acknowledged.
    BusWriteFailed(E),
    PwmError(PwmError<E>),
}

/// Four-channel motor driver that accepts `[register, c0, c1, c2, c3]` writes.
pub struct MotorDriver<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> MotorDriver<I2C> {
    pub fn new(
        i2c: I2C,
        address: u8,
    ) -> Self {
        MotorDriver { i2c, address }
    }

    /// Address the driver with an empty write; an ACK means it is present.
    pub fn probe(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[])
    }

    pub fn write_frame(
        &mut self,
        frame: &DriveFrame,
    ) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &frame.to_bytes())
    }
}

/// Steering servo driven from one PCA9685 channel.
pub struct SteeringServo<I2C> {
    pwm: Pca9685<I2C>,
    channel: Channel,
    period_ns: u32,
}

impl<I2C, E> SteeringServo<I2C>
where
    I2C: I2c<Error = E>,
    E: core::fmt::Debug,
{
    /// Wrap an expander channel, assuming a 50 Hz output until `configure` runs.
    pub fn new(
        pwm: Pca9685<I2C>,
        channel: Channel,
    ) -> Self {
        SteeringServo {
            pwm,
            channel,
            period_ns: PULSE_PERIOD,
        }
    }

    /// Wake the expander and set its output frequency.
    ///
    /// Pulse widths written afterwards are converted against the period that
    /// `prescale` produces.
    pub fn configure(
        &mut self,
        prescale: u8,
    ) -> Result<(), PwmError<E>> {
        self.pwm.enable()?;
        self.pwm.set_prescale(prescale)?;
        self.period_ns = servo_period_ns(prescale);
        tracing::info!(prescale, period_ns = self.period_ns, "servo PWM configured");
        Ok(())
    }

    pub fn period_ns(&self) -> u32 {
        self.period_ns
    }

    /// Output a pulse of `pulse_ns` every servo period.
    pub fn set_pulse(
        &mut self,
        pulse_ns: u32,
    ) -> Result<(), PwmError<E>> {
        let off = pulse_to_ticks(pulse_ns, self.period_ns);
        self.pwm.set_channel_on_off(self.channel, 0, off)
    }
}

/// Map an expander output index onto its channel.
pub fn channel_from_index(index: u8) -> Option<Channel> {
    let channel = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        _ => return None,
    };
    Some(channel)
}

/// Motor driver and steering servo over a shared I2C bus.
///
/// An actuator left as `None` failed (or skipped) initialisation, and every
/// write aimed at it returns [`DeviceError::DeviceNotReady`].
pub struct Actuators<'a, I2C: 'static> {
    i2c: &'a RefCell<I2C>,
    config: ActuatorConfig,
    pub motor: Option<MotorDriver<RefCellDevice<'a, I2C>>>,
    pub servo: Option<SteeringServo<RefCellDevice<'a, I2C>>>,
}

impl<'a, I2C, E> Actuators<'a, I2C>
where
    I2C: I2c<Error = E> + 'static,
    E: core::fmt::Debug,
{
    /// Create an actuator set with nothing initialised yet.
    pub fn new(
        i2c_bus: &'a RefCell<I2C>,
        config: ActuatorConfig,
    ) -> Self {
        Actuators {
            i2c: i2c_bus,
            config,
            motor: None,
            servo: None,
        }
    }

    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Bring up both actuators.
    ///
    /// Each actuator is attempted independently; the first failure is returned
    /// and the failed actuator stays unavailable.
    pub fn init_devices(&mut self) -> Result<(), DeviceError<E>> {
        let motor = self.init_motor();
        let servo = self.init_servo();
        motor.and(servo)
    }

    /// Probe the motor driver and keep it if it acknowledges.
    pub fn init_motor(&mut self) -> Result<(), DeviceError<E>> {
        let mut driver = MotorDriver::new(RefCellDevice::new(self.i2c), self.config.drive_address);
        match driver.probe() {
            Ok(()) => {
                tracing::info!("motor driver ready at 0x{:02X}", self.config.drive_address);
                self.motor = Some(driver);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(?e, "motor driver not ready at 0x{:02X}", self.config.drive_address);
                self.motor = None;
                Err(DeviceError::DeviceNotReady(Actuator::Drive))
            }
        }
    }

    /// Configure the servo expander and centre the steering.
    pub fn init_servo(&mut self) -> Result<(), DeviceError<E>> {
        self.servo = None;
        let channel = channel_from_index(self.config.servo_channel).ok_or_else(|| {
            tracing::error!(channel = self.config.servo_channel, "invalid servo channel");
            DeviceError::DeviceNotReady(Actuator::Steer)
        })?;
        let pwm = Pca9685::new(
            RefCellDevice::new(self.i2c),
            PwmAddress::from(self.config.servo_address),
        )
        .map_err(DeviceError::PwmError)?;

        let mut servo = SteeringServo::new(pwm, channel);
        servo
            .configure(self.config.servo_prescale)
            .and_then(|()| servo.set_pulse(angle_to_pulse(0)))
            .map_err(|e| {
                tracing::warn!(?e, "steering servo not ready");
                DeviceError::DeviceNotReady(Actuator::Steer)
            })?;

        self.servo = Some(servo);
        Ok(())
    }

    /// Scan the I2C bus for devices and log any found addresses.
    pub fn scan_bus(&self) {
        let mut bus = self.i2c.borrow_mut();
        for addr in 0x03..0x78 {
            if bus.write(addr, &[]).is_ok() {
                tracing::warn!("I2C device found at 0x{:02X}", addr);
            }
        }
    }

    /// Write one frame to the motor driver.
    pub fn write_drive(
        &mut self,
        frame: &DriveFrame,
    ) -> Result<(), DeviceError<E>> {
        let motor = self
            .motor
            .as_mut()
            .ok_or(DeviceError::DeviceNotReady(Actuator::Drive))?;
        motor.write_frame(frame).map_err(DeviceError::BusWriteFailed)
    }

    /// Clamp, scale and write a drive power in one step.
    ///
    /// Returns the frame that was sent.
    pub fn drive_power(
        &mut self,
        register: u8,
        power: i32,
        pattern: ChannelPattern,
    ) -> Result<DriveFrame, DeviceError<E>> {
        let register = self.config.register_or_default(register);
        let frame = encode_drive_frame(register, scale_power(clamp_power(power)), pattern);
        tracing::debug!(power, ?frame, "drive");
        self.write_drive(&frame)?;
        Ok(frame)
    }

    /// Zero every channel behind `register`. Returns the register written.
    pub fn stop(
        &mut self,
        register: u8,
    ) -> Result<u8, DeviceError<E>> {
        let register = self.config.register_or_default(register);
        self.write_drive(&stop_frame(register))?;
        Ok(register)
    }

    /// Write a raw pulse width to the steering servo.
    pub fn steer_pulse(
        &mut self,
        pulse_ns: u32,
    ) -> Result<(), DeviceError<E>> {
        let servo = self
            .servo
            .as_mut()
            .ok_or(DeviceError::DeviceNotReady(Actuator::Steer))?;
        servo.set_pulse(pulse_ns).map_err(DeviceError::PwmError)
    }

    /// Point the steering at `angle` degrees. Returns the pulse width used.
    pub fn steer_angle(
        &mut self,
        angle: i32,
    ) -> Result<u32, DeviceError<E>> {
        let pulse = angle_to_pulse(angle);
        self.steer_pulse(pulse)?;
        Ok(pulse)
    }
}

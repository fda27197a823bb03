//! Math utilities for the robot car.
//!
//! This module maps logical drive power and steering angle into the ranges the
//! motor driver and steering servo accept.

pub mod scaling;

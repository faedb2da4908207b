//! # Roller Motor Interface
//!
//! Defines the interface to a single roller motor controller. The intake
//! carries two of these, mounted so that their rollers counter-rotate.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single roller motor controller.
///
/// Velocity demands are normalised duty cycles in the range [-1.0, +1.0].
/// Out of range demands shall be clamped by the implementing driver, callers
/// perform no validation of their own.
pub trait MotorDriver {
    /// Command the motor to the given normalised duty cycle.
    fn set_velocity(&mut self, velocity: f64);

    /// Get the last commanded duty cycle.
    ///
    /// This is the commanded value, not a measured one.
    fn current_velocity(&self) -> f64;

    /// Release the motor handle.
    ///
    /// Implementations shall be idempotent, releasing an already released
    /// handle shall succeed.
    fn release(&mut self) -> Result<(), MotorError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by a roller motor driver.
#[derive(Debug, Error)]
pub enum MotorError {
    #[error("Could not release the motor handle: {0}")]
    ReleaseFailed(String),
}

//! # Time of Flight Sensor Interface
//!
//! Defines the interface to the distance sensor mounted inside the intake,
//! and the sample type it produces.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Reading reported by the sensor when there is no valid echo, either because
/// the sensor is offline or the target is out of range.
pub const DISTANCE_SENTINEL_MM: i32 = -1;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A single distance reading from the time of flight sensor.
///
/// Units: integer millimetres. A value of [`DISTANCE_SENTINEL_MM`] marks the
/// sample as offline. Samples are produced once per control cycle and shall
/// not be retained beyond the cycle they were read in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceSample(pub i32);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A distance sensor from which one sample is read per control cycle.
pub trait DistanceSensor {
    /// Read the current distance. Non-blocking.
    fn read_distance_mm(&mut self) -> DistanceSample;

    /// Release the sensor handle.
    ///
    /// Implementations shall be idempotent, releasing an already released
    /// handle shall succeed.
    fn release(&mut self) -> Result<(), TofError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by a distance sensor driver.
#[derive(Debug, Error)]
pub enum TofError {
    #[error("Could not release the sensor handle: {0}")]
    ReleaseFailed(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DistanceSample {
    /// An offline (no valid echo) sample.
    pub fn offline() -> Self {
        DistanceSample(DISTANCE_SENTINEL_MM)
    }

    /// True if the sensor produced a valid echo for this sample.
    pub fn online(&self) -> bool {
        self.0 != DISTANCE_SENTINEL_MM
    }

    /// True if this sample is online and within the given activation
    /// threshold.
    ///
    /// Offline samples are never near.
    pub fn near(&self, threshold_mm: f64) -> bool {
        self.online() && (self.0 as f64) <= threshold_mm
    }

    /// The raw reading in millimetres, sentinel included.
    pub fn raw_mm(&self) -> i32 {
        self.0
    }
}

impl Default for DistanceSample {
    fn default() -> Self {
        DistanceSample::offline()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sample_predicates() {
        assert!(!DistanceSample::offline().online());
        assert!(!DistanceSample::offline().near(450.0));

        assert!(DistanceSample(0).online());
        assert!(DistanceSample(300).near(450.0));
        assert!(DistanceSample(450).near(450.0));
        assert!(!DistanceSample(451).near(450.0));
    }
}

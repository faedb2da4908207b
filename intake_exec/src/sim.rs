//! # Simulated intake equipment
//!
//! Provides simulated roller motors and a simulated ToF sensor so the
//! executable can run without robot hardware. The simulated sensor reading is
//! driven from TC scripts via `Tc::SimSetDistanceMm`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::trace;

// Internal
use eqpt_if::eqpt::roller::{MotorDriver, MotorError};
use eqpt_if::eqpt::tof::{DistanceSample, DistanceSensor, TofError};
use util::maths;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A simulated roller motor controller.
pub struct SimMotor {
    name: &'static str,
    velocity: f64,
    released: bool,
}

/// A simulated time of flight sensor.
///
/// Starts offline and reports whatever reading was last injected.
pub struct SimTofSensor {
    distance: DistanceSample,
    released: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotor {
    pub fn new(name: &'static str) -> Self {
        SimMotor {
            name,
            velocity: 0.0,
            released: false,
        }
    }
}

impl MotorDriver for SimMotor {
    fn set_velocity(&mut self, velocity: f64) {
        // Real motor controllers saturate at full duty, model that here
        self.velocity = maths::clamp(&velocity, &-1.0, &1.0);
        trace!("SimMotor {} commanded to {:.2}", self.name, self.velocity);
    }

    fn current_velocity(&self) -> f64 {
        self.velocity
    }

    fn release(&mut self) -> Result<(), MotorError> {
        if !self.released {
            trace!("SimMotor {} released", self.name);
        }
        self.released = true;
        Ok(())
    }
}

impl SimTofSensor {
    pub fn new() -> Self {
        SimTofSensor {
            distance: DistanceSample::offline(),
            released: false,
        }
    }

    /// Inject a new sensor reading.
    pub fn set_distance_mm(&mut self, mm: i32) {
        self.distance = DistanceSample(mm);
    }
}

impl DistanceSensor for SimTofSensor {
    fn read_distance_mm(&mut self) -> DistanceSample {
        // A released sensor can no longer produce an echo
        if self.released {
            DistanceSample::offline()
        }
        else {
            self.distance
        }
    }

    fn release(&mut self) -> Result<(), TofError> {
        self.released = true;
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sim_motor_clamps() {
        let mut m = SimMotor::new("test");

        m.set_velocity(2.0);
        assert_eq!(m.current_velocity(), 1.0);

        m.set_velocity(-2.0);
        assert_eq!(m.current_velocity(), -1.0);

        m.set_velocity(0.55);
        assert_eq!(m.current_velocity(), 0.55);
    }

    #[test]
    fn test_sim_tof_starts_offline() {
        let mut s = SimTofSensor::new();

        assert!(!s.read_distance_mm().online());

        s.set_distance_mm(300);
        assert_eq!(s.read_distance_mm(), DistanceSample(300));
    }

    #[test]
    fn test_sim_tof_release_goes_offline() {
        let mut s = SimTofSensor::new();

        s.set_distance_mm(300);
        s.release().unwrap();
        assert!(!s.read_distance_mm().online());

        // Release is idempotent
        s.release().unwrap();
    }
}

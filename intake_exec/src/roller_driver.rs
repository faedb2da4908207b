//! # Roller driver
//!
//! Drives the pair of counter-rotating intake rollers. A single signed
//! velocity demand fans out to the two motor controllers, with motor B always
//! commanded to the negation of motor A so the rollers grip rather than
//! fight each other.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::trace;
use std::cell::RefCell;
use std::rc::Rc;

// Internal
use crate::tm::TmSink;
use eqpt_if::eqpt::roller::{MotorDriver, MotorError};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Driver for the two counter-rotating intake roller motors.
///
/// Motor handles and the telemetry sink are injected at construction. The
/// driver performs no validation of the demanded velocity, out of range
/// demands are clamped by the motor drivers themselves.
pub struct RollerDriver {
    motor_a: Box<dyn MotorDriver>,
    motor_b: Box<dyn MotorDriver>,
    tm: Rc<RefCell<dyn TmSink>>,
    current_speed: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RollerDriver {
    /// Create a new roller driver over the given motor handles.
    pub fn new(
        motor_a: Box<dyn MotorDriver>,
        motor_b: Box<dyn MotorDriver>,
        tm: Rc<RefCell<dyn TmSink>>,
    ) -> Self {
        RollerDriver {
            motor_a,
            motor_b,
            tm,
            current_speed: 0.0,
        }
    }

    /// Command both rollers.
    ///
    /// Motor B always recieves the negation of motor A's demand. The
    /// commanded speed is published to the telemetry sink on every call.
    pub fn set_velocity(&mut self, velocity: f64) {
        self.motor_a.set_velocity(velocity);
        self.motor_b.set_velocity(-velocity);

        self.current_speed = velocity;

        self.tm.borrow_mut().publish_speed(velocity);

        trace!("Roller demand: {:.2}", velocity);
    }

    /// Stop both rollers.
    pub fn stop(&mut self) {
        self.set_velocity(0.0);
    }

    /// Get the last commanded velocity.
    ///
    /// This is the commanded value, not a measured one.
    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Release both motor handles.
    ///
    /// Best effort: both handles are released even if the first fails, and
    /// the first failure is reported to the caller. Safe to call more than
    /// once.
    pub fn release(&mut self) -> Result<(), MotorError> {
        let res_a = self.motor_a.release();
        let res_b = self.motor_b.release();

        res_a.and(res_b)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::tm::TmPacket;

    /// Motor mock recording every demand it is given.
    struct MockMotor {
        demands: Rc<RefCell<Vec<f64>>>,
        release_count: Rc<RefCell<u32>>,
        fail_release: bool,
    }

    impl MotorDriver for MockMotor {
        fn set_velocity(&mut self, velocity: f64) {
            self.demands.borrow_mut().push(velocity);
        }

        fn current_velocity(&self) -> f64 {
            *self.demands.borrow().last().unwrap_or(&0.0)
        }

        fn release(&mut self) -> Result<(), MotorError> {
            *self.release_count.borrow_mut() += 1;

            if self.fail_release {
                Err(MotorError::ReleaseFailed(String::from("mock failure")))
            }
            else {
                Ok(())
            }
        }
    }

    /// Sink mock recording every published speed.
    #[derive(Default)]
    struct MockSink {
        speeds: Vec<f64>,
    }

    impl TmSink for MockSink {
        fn publish_speed(&mut self, speed: f64) {
            self.speeds.push(speed);
        }

        fn publish_status(&mut self, _packet: &TmPacket) {}
    }

    fn driver(
        fail_release: bool,
    ) -> (
        RollerDriver,
        Rc<RefCell<Vec<f64>>>,
        Rc<RefCell<Vec<f64>>>,
        Rc<RefCell<MockSink>>,
        Rc<RefCell<u32>>,
    ) {
        let demands_a = Rc::new(RefCell::new(vec![]));
        let demands_b = Rc::new(RefCell::new(vec![]));
        let releases = Rc::new(RefCell::new(0));
        let sink = Rc::new(RefCell::new(MockSink::default()));

        let d = RollerDriver::new(
            Box::new(MockMotor {
                demands: demands_a.clone(),
                release_count: releases.clone(),
                fail_release,
            }),
            Box::new(MockMotor {
                demands: demands_b.clone(),
                release_count: releases.clone(),
                fail_release: false,
            }),
            sink.clone(),
        );

        (d, demands_a, demands_b, sink, releases)
    }

    #[test]
    fn test_anti_symmetry() {
        let (mut d, demands_a, demands_b, _, _) = driver(false);

        for v in [-1.0, -0.75, 0.0, 0.55, 1.0].iter() {
            d.set_velocity(*v);
        }

        // Motor B's command is the negation of motor A's, for every demand
        for (a, b) in demands_a
            .borrow()
            .iter()
            .zip(demands_b.borrow().iter())
        {
            assert_eq!(*b, -*a);
        }
        assert_eq!(demands_a.borrow().len(), 5);
    }

    #[test]
    fn test_current_speed_is_commanded_value() {
        let (mut d, _, _, _, _) = driver(false);

        assert_eq!(d.current_speed(), 0.0);

        d.set_velocity(0.55);
        assert_eq!(d.current_speed(), 0.55);

        d.stop();
        assert_eq!(d.current_speed(), 0.0);
    }

    #[test]
    fn test_speed_published_on_every_actuation() {
        let (mut d, _, _, sink, _) = driver(false);

        d.set_velocity(-0.75);
        d.set_velocity(-0.75);
        d.stop();

        assert_eq!(sink.borrow().speeds, vec![-0.75, -0.75, 0.0]);
    }

    #[test]
    fn test_release_best_effort() {
        let (mut d, _, _, _, releases) = driver(true);

        // The first motor's failure is reported, but both handles were
        // released
        assert!(d.release().is_err());
        assert_eq!(*releases.borrow(), 2);

        // Releasing again is allowed
        let _ = d.release();
        assert_eq!(*releases.borrow(), 4);
    }
}

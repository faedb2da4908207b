//! Implementations for the Possession state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, PossessionError};
use eqpt_if::eqpt::tof::DistanceSample;
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Possession state machine module state
#[derive(Default)]
pub struct Possession {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) state: PossessionState,
}

/// Input data to the possession state machine.
#[derive(Default)]
pub struct InputData {
    /// This cycle's distance sample, shared with all other consumers of the
    /// sensor within the cycle.
    pub distance: DistanceSample,
}

/// Status report for Possession processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the sensor produced a valid echo this cycle.
    pub online: bool,

    /// True if the sample was online and within the activation threshold.
    pub near: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possession of a game piece as inferred from the ToF sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PossessionState {
    /// No game piece is retained.
    Idle,

    /// A game piece is retained in the intake.
    Holding,

    /// A game piece is retained and staged for scoring.
    ///
    /// No sensor-driven transition enters this state, it is reached only via
    /// [`Possession::latch_score`]. It exits to `Idle` exactly as `Holding`
    /// does.
    HoldingForScore,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Possession {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = PossessionState;
    type StatusReport = StatusReport;
    type ProcError = PossessionError;

    /// Initialise the Possession module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        Ok(())
    }

    /// Perform cyclic processing of the possession state machine.
    ///
    /// Applies at most one transition per cycle based on this cycle's sample.
    /// An offline sample freezes the machine at its current state.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let online = input_data.distance.online();
        let near = input_data.distance
            .near(self.params.mm_cone_activation_threshold);

        self.report = StatusReport { online, near };

        // Change state (only if the sensor is online)
        if online {
            let next = match (self.state, near) {
                (PossessionState::Idle, true) => PossessionState::Holding,
                (PossessionState::Holding, false) => PossessionState::Idle,
                (PossessionState::HoldingForScore, false) => PossessionState::Idle,
                (s, _) => s,
            };

            if next != self.state {
                trace!("Possession transition {:?} -> {:?}", self.state, next);
                self.state = next;
            }
        }

        Ok((self.state, self.report))
    }
}

impl Possession {

    /// Get the current possession state without evaluating a transition.
    ///
    /// Unlike `proc` this is a pure read and may be called any number of
    /// times per cycle.
    pub fn current_state(&self) -> PossessionState {
        self.state
    }

    /// Latch the machine from `Holding` into `HoldingForScore`.
    ///
    /// This is the only path into the score state. A latch request in any
    /// other state is ignored.
    pub fn latch_score(&mut self) {
        if self.state == PossessionState::Holding {
            trace!("Possession latched into HoldingForScore");
            self.state = PossessionState::HoldingForScore;
        }
    }
}

impl PossessionState {
    /// Label used for telemetry output.
    pub fn label(&self) -> &'static str {
        match self {
            PossessionState::Idle => "IDLE",
            PossessionState::Holding => "HOLDING",
            PossessionState::HoldingForScore => "HOLDING_FOR_SCORE",
        }
    }
}

impl Default for PossessionState {
    fn default() -> Self {
        PossessionState::Idle
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build a machine with the nominal 450 mm threshold, skipping file-based
    /// init.
    fn machine() -> Possession {
        Possession {
            params: Params {
                mm_cone_activation_threshold: 450.0,
            },
            ..Default::default()
        }
    }

    fn step(m: &mut Possession, distance_mm: i32) -> PossessionState {
        let (state, _) = m
            .proc(&InputData {
                distance: DistanceSample(distance_mm),
            })
            .unwrap();
        state
    }

    #[test]
    fn test_transition_table() {
        let mut m = machine();
        assert_eq!(m.current_state(), PossessionState::Idle);

        // Idle + near -> Holding
        assert_eq!(step(&mut m, 300), PossessionState::Holding);

        // Holding + near -> Holding
        assert_eq!(step(&mut m, 200), PossessionState::Holding);

        // Holding + far -> Idle
        assert_eq!(step(&mut m, 500), PossessionState::Idle);

        // Idle + far -> Idle
        assert_eq!(step(&mut m, 500), PossessionState::Idle);
    }

    #[test]
    fn test_offline_freezes_state() {
        let mut m = machine();

        assert_eq!(step(&mut m, 300), PossessionState::Holding);

        // An offline sample never changes state, regardless of prior value
        assert_eq!(step(&mut m, -1), PossessionState::Holding);
        assert_eq!(step(&mut m, -1), PossessionState::Holding);

        // Back online and far, exit to Idle
        assert_eq!(step(&mut m, 600), PossessionState::Idle);
        assert_eq!(step(&mut m, -1), PossessionState::Idle);
    }

    #[test]
    fn test_scenario_sequence() {
        let mut m = machine();

        let distances = [500, 500, 300, 300, 500];
        let expected = [
            PossessionState::Idle,
            PossessionState::Idle,
            PossessionState::Holding,
            PossessionState::Holding,
            PossessionState::Idle,
        ];

        for (d, e) in distances.iter().zip(expected.iter()) {
            assert_eq!(step(&mut m, *d), *e);
        }
    }

    #[test]
    fn test_current_state_is_pure() {
        let mut m = machine();
        step(&mut m, 300);

        // Reading twice with no intervening proc returns the same value
        assert_eq!(m.current_state(), m.current_state());
        assert_eq!(m.current_state(), PossessionState::Holding);
    }

    #[test]
    fn test_latch_score() {
        let mut m = machine();

        // Latch from Idle is ignored
        m.latch_score();
        assert_eq!(m.current_state(), PossessionState::Idle);

        // Latch from Holding enters the score state
        step(&mut m, 300);
        m.latch_score();
        assert_eq!(m.current_state(), PossessionState::HoldingForScore);

        // A near sample keeps the score state, a far one exits to Idle
        assert_eq!(step(&mut m, 300), PossessionState::HoldingForScore);
        assert_eq!(step(&mut m, 500), PossessionState::Idle);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut m = machine();

        // Exactly on the threshold counts as near
        assert_eq!(step(&mut m, 450), PossessionState::Holding);
        assert_eq!(step(&mut m, 451), PossessionState::Idle);
    }
}

//! # Telecommand module
//!
//! This module provides the telecommand definitions for the intake control
//! software. TCs arrive as JSON packets, either from an operator console or
//! from a script interpreted on board.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Operator-selected game piece type.
///
/// The mode governs the sign and magnitude of the roller actuation. The signs
/// are conventions of the physical hardware and are not symmetric between the
/// two modes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    Cone,
    Cube,
}

/// A command for the intake controller.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntakeCmd {
    /// Spin the rollers to eject the currently selected game piece.
    Push,

    /// Spin the rollers to draw in the currently selected game piece.
    Pull,

    /// Keep the rollers biased inwards to retain a held game piece.
    ///
    /// Demands the same velocity as `Pull`.
    Hold,

    /// Stop the rollers. Cancels any pending timed action.
    Stop,

    /// Select cone mode.
    SetConeMode,

    /// Select cube mode.
    SetCubeMode,

    /// Toggle between cone and cube mode.
    ToggleMode,

    /// Force possession reporting regardless of the sensor reading.
    SetOverride {
        enabled: bool,
    },

    /// Pull for a fixed duration in the given mode, then stop.
    PullTimed {
        duration_s: f64,
        mode: Mode,
    },

    /// Push for a fixed duration in the given mode, then stop.
    PushTimed {
        duration_s: f64,
        mode: Mode,
    },

    /// Latch the possession state machine into its score state.
    LatchScore,
}

/// A telecommand, i.e. an instruction sent to the robot by the operator.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tc {
    /// Stop all actuation and reject intake TCs until made unsafe.
    MakeSafe,

    /// Leave safe mode.
    MakeUnsafe,

    /// A command for the intake controller.
    Intake(IntakeCmd),

    /// Set the simulated ToF sensor reading (sim equipment stack only).
    SimSetDistanceMm(i32),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        match serde_json::from_str(json_str) {
            Ok(tc) => Ok(tc),
            Err(e) => Err(TcParseError::InvalidJson(e)),
        }
    }

    /// Serialise the TC into a JSON packet.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Mode {
    /// The opposite mode.
    pub fn toggled(&self) -> Self {
        match self {
            Mode::Cone => Mode::Cube,
            Mode::Cube => Mode::Cone,
        }
    }

    /// Label used for telemetry output.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Cone => "CONE",
            Mode::Cube => "CUBE",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Cone
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_from_json() {
        assert_eq!(
            Tc::from_json(r#"{"Intake": "Pull"}"#).unwrap(),
            Tc::Intake(IntakeCmd::Pull)
        );
        assert_eq!(
            Tc::from_json(r#"{"Intake": {"PullTimed": {"duration_s": 2.0, "mode": "Cone"}}}"#)
                .unwrap(),
            Tc::Intake(IntakeCmd::PullTimed {
                duration_s: 2.0,
                mode: Mode::Cone
            })
        );
        assert_eq!(
            Tc::from_json(r#"{"SimSetDistanceMm": 300}"#).unwrap(),
            Tc::SimSetDistanceMm(300)
        );
        assert_eq!(Tc::from_json(r#""MakeSafe""#).unwrap(), Tc::MakeSafe);

        assert!(Tc::from_json("not json").is_err());
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::default(), Mode::Cone);
        assert_eq!(Mode::Cone.toggled(), Mode::Cube);
        assert_eq!(Mode::Cube.toggled(), Mode::Cone);
    }
}

//! Parameters structure for IntakeCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Intake control.
///
/// The speed signs are directional conventions of the physical hardware and
/// are not symmetric between the two modes, they must not be derived from one
/// another.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- SPEEDS ----

    /// Duty cycle commanded when intaking a cone.
    pub cone_intake_speed: f64,

    /// Duty cycle commanded when ejecting a cone.
    pub cone_outtake_speed: f64,

    /// Duty cycle commanded when intaking a cube.
    pub cube_intake_speed: f64,

    /// Duty cycle commanded when ejecting a cube.
    pub cube_outtake_speed: f64,

    // ---- SENSING ----

    /// Distance at or below which a cube is considered present for the
    /// has-piece query.
    ///
    /// Tracked separately from the cone activation threshold used by the
    /// possession state machine, the two are tuned independently.
    ///
    /// Units: millimetres
    pub mm_cube_activation_threshold: f64,
}

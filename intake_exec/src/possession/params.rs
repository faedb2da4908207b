//! Parameters structure for Possession

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the possession state machine.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    /// Distance at or below which a cone is considered present in the intake.
    ///
    /// Tracked separately from the cube activation threshold used by the
    /// has-piece query, the two are tuned independently.
    ///
    /// Units: millimetres
    pub mm_cone_activation_threshold: f64,
}

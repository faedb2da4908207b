//! Intake control module
//!
//! Binds the operator-facing contract together: the cone/cube mode flag, the
//! possession override, the speed policy and cooperatively scheduled timed
//! actions. Produces a roller velocity demand for the roller driver on cycles
//! where an actuation is required.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during IntakeCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum IntakeCtrlError {
    #[error("Recieved an invalid timed action duration: {0} s")]
    InvalidTimedDuration(f64),
}

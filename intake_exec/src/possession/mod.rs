//! Possession state machine module
//!
//! Converts the noisy/intermittent distance stream from the ToF sensor into a
//! stable three-state possession signal for the currently tracked game piece.
//! Transitions are latched: a single far (or offline) sample while idle, or a
//! single near sample while holding, is enough to move state, but an offline
//! sample never changes state at all.

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

/// Possible errors that can occur during Possession operation.
///
/// Possession processing has no failure modes of its own, the enum is
/// uninhabited.
#[derive(Debug, thiserror::Error)]
pub enum PossessionError {}

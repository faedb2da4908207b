//! # Telecommand processor module
//!
//! The telecommand processor handles various TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use eqpt_if::tc::{IntakeCmd, Tc};
use intake_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules. Intake TCs
/// are rejected while in safe mode, only `MakeUnsafe` can leave it.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {

    // Handle different Tcs
    match tc {
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc);
        },
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            ds.make_unsafe(SafeModeCause::MakeSafeTc).ok();
        },
        Tc::Intake(cmd) => {
            if ds.safe {
                warn!("Intake TC recieved while in safe mode, rejected");
                return
            }

            match cmd {
                // The score latch drives the possession module directly, it
                // is a setter rather than a roller actuation
                IntakeCmd::LatchScore => ds.possession.latch_score(),
                _ => ds.intake_ctrl_input.cmd = Some(*cmd)
            }
        },
        Tc::SimSetDistanceMm(mm) => {
            ds.pending_sim_distance_mm = Some(*mm);
        }
    }

}

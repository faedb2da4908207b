//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::tof::DistanceSample;
use log::{info, warn};

use crate::{intake_ctrl, possession};
use crate::intake_ctrl::IntakeCtrl;
use crate::possession::{Possession, PossessionState};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the intake has been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    CycleOverrunLimit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the intake is in safe mode.
    pub safe: bool,

    /// Gives the reason for the intake being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Sensing
    /// This cycle's distance sample. Read once per cycle and shared by all
    /// consumers within the cycle.
    pub distance: DistanceSample,

    /// A simulated sensor reading waiting to be applied, set by the TC
    /// processor.
    pub pending_sim_distance_mm: Option<i32>,

    // Possession
    pub possession: Possession,
    pub possession_input: possession::InputData,
    pub possession_state: PossessionState,
    pub possession_status_rpt: possession::StatusReport,

    // IntakeCtrl
    pub intake_ctrl: IntakeCtrl,
    pub intake_ctrl_input: intake_ctrl::InputData,
    pub intake_ctrl_output: intake_ctrl::OutputData,
    pub intake_ctrl_status_rpt: intake_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Puts the intake into safe mode with the given cause.
    pub fn make_safe(&mut self, cause: SafeModeCause) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            // Make intake_ctrl safe
            self.intake_ctrl.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled,
    /// or `Err(())` otherwise. To remove safe mode the provided cause must
    /// match the initial reason for safe mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) => {
                if cause == root_cause {
                    self.safe = false;
                    self.safe_cause = None;
                    info!("Make unsafe requested, root cause match, safe mode disabled");
                    Ok(())
                } else {
                    Err(())
                }
            }
            None => Ok(()),
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.distance = DistanceSample::offline();

        self.possession_input = possession::InputData::default();
        self.possession_status_rpt = possession::StatusReport::default();

        self.intake_ctrl_input = intake_ctrl::InputData::default();
        self.intake_ctrl_output = intake_ctrl::OutputData::default();
        self.intake_ctrl_status_rpt = intake_ctrl::StatusReport::default();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_safe_mode_cause_matching() {
        let mut ds = DataStore::default();

        ds.make_safe(SafeModeCause::MakeSafeTc);
        assert!(ds.safe);

        // A different cause cannot clear safe mode
        assert!(ds.make_unsafe(SafeModeCause::CycleOverrunLimit).is_err());
        assert!(ds.safe);

        // The root cause can
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
        assert!(!ds.safe);

        // Clearing while not safe is fine
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());
    }
}

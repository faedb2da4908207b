//! Implementations for the IntakeCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use super::{IntakeCtrlError, Params};
use eqpt_if::eqpt::tof::DistanceSample;
use eqpt_if::tc::{IntakeCmd, Mode};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Intake control module state
#[derive(Default)]
pub struct IntakeCtrl {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) mode: Mode,

    pub(crate) possession_override: bool,

    pub(crate) timed_action: Option<TimedAction>,

    /// Forces a stop demand on the next cycle, set on safe mode entry.
    pub(crate) stop_pending: bool,
}

/// Input data to Intake control.
#[derive(Default)]
pub struct InputData {
    /// The intake command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<IntakeCmd>,

    /// This cycle's distance sample, shared with all other consumers of the
    /// sensor within the cycle.
    pub distance: DistanceSample,

    /// Session elapsed time at the start of this cycle.
    ///
    /// Units: seconds
    pub elapsed_s: f64,
}

/// Output demand from IntakeCtrl that the roller driver must execute.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct OutputData {
    /// New roller duty cycle demand, or `None` to leave the rollers at their
    /// last commanded speed.
    pub roller_demand: Option<f64>,
}

/// Status report for IntakeCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The currently selected mode.
    pub mode: Mode,

    /// True if the intake retains a game piece (override included).
    pub has_piece: bool,

    /// True if the possession override is set.
    pub override_set: bool,

    /// True if a timed action is pending expiry.
    pub timed_action_active: bool,
}

/// A cooperatively scheduled roller action pending expiry.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TimedAction {
    /// Session elapsed time at which the rollers shall be stopped.
    ///
    /// Units: seconds
    pub end_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for IntakeCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = IntakeCtrlError;

    /// Initialise the IntakeCtrl module.
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

    /// Perform cyclic processing of Intake control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        let mut demand: Option<f64> = None;

        // A safe mode entry forces a stop before anything else
        if self.stop_pending {
            self.stop_pending = false;
            self.timed_action = None;
            demand = Some(0.0);
        }

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            debug!("New IntakeCmd::{:?}", cmd);

            if let Some(d) = self.exec_cmd(cmd, input_data.elapsed_s)? {
                demand = Some(d);
            }
        }

        // Expire any pending timed action. Expiry is checked after command
        // handling so that a command arriving on the expiry cycle wins.
        if let Some(ta) = self.timed_action {
            if input_data.elapsed_s >= ta.end_s {
                debug!("Timed action expired, stopping rollers");
                self.timed_action = None;
                demand = Some(0.0);
            }
        }

        self.report = StatusReport {
            mode: self.mode,
            has_piece: self.has_piece(input_data.distance),
            override_set: self.possession_override,
            timed_action_active: self.timed_action.is_some(),
        };

        Ok((OutputData { roller_demand: demand }, self.report))
    }
}

impl IntakeCtrl {

    /// True if the intake currently retains a game piece.
    ///
    /// Either the override is set, or this cycle's fresh sample is within the
    /// cube activation threshold. The possession state machine tracks the
    /// cone activation threshold separately and is not consulted here.
    pub fn has_piece(&self, distance: DistanceSample) -> bool {
        self.possession_override
            || distance.near(self.params.mm_cube_activation_threshold)
    }

    /// The currently selected mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True if a timed action is pending expiry.
    pub fn timed_action_active(&self) -> bool {
        self.timed_action.is_some()
    }

    /// Put the controller into a safe configuration.
    ///
    /// Cancels any pending timed action and forces a stop demand on the next
    /// processing cycle.
    pub fn make_safe(&mut self) {
        self.timed_action = None;
        self.stop_pending = true;
    }

    /// Execute a single intake command, returning the roller demand it
    /// produces, if any.
    ///
    /// The mode is read at actuation time, a mode change takes effect on the
    /// next actuation command.
    fn exec_cmd(
        &mut self,
        cmd: IntakeCmd,
        elapsed_s: f64,
    ) -> Result<Option<f64>, IntakeCtrlError> {
        let demand = match cmd {
            IntakeCmd::Push => {
                self.timed_action = None;
                Some(self.outtake_speed())
            }
            // Holding a piece against the rollers uses the same directional
            // bias as intaking it
            IntakeCmd::Pull | IntakeCmd::Hold => {
                self.timed_action = None;
                Some(self.intake_speed())
            }
            IntakeCmd::Stop => {
                self.timed_action = None;
                Some(0.0)
            }
            IntakeCmd::SetConeMode => {
                self.mode = Mode::Cone;
                None
            }
            IntakeCmd::SetCubeMode => {
                self.mode = Mode::Cube;
                None
            }
            IntakeCmd::ToggleMode => {
                self.mode = self.mode.toggled();
                None
            }
            IntakeCmd::SetOverride { enabled } => {
                self.possession_override = enabled;
                None
            }
            IntakeCmd::PullTimed { duration_s, mode } => {
                self.start_timed(duration_s, mode, elapsed_s)?;
                Some(self.intake_speed())
            }
            IntakeCmd::PushTimed { duration_s, mode } => {
                self.start_timed(duration_s, mode, elapsed_s)?;
                Some(self.outtake_speed())
            }
            // Routed to the possession module by the TC processor, nothing to
            // do here
            IntakeCmd::LatchScore => None,
        };

        Ok(demand)
    }

    /// Begin a timed action in the given mode.
    fn start_timed(
        &mut self,
        duration_s: f64,
        mode: Mode,
        elapsed_s: f64,
    ) -> Result<(), IntakeCtrlError> {
        if !duration_s.is_finite() || duration_s <= 0.0 {
            return Err(IntakeCtrlError::InvalidTimedDuration(duration_s));
        }

        self.mode = mode;
        self.timed_action = Some(TimedAction {
            end_s: elapsed_s + duration_s,
        });

        Ok(())
    }

    /// Get the intake speed for the current mode.
    fn intake_speed(&self) -> f64 {
        match self.mode {
            Mode::Cone => self.params.cone_intake_speed,
            Mode::Cube => self.params.cube_intake_speed,
        }
    }

    /// Get the outtake speed for the current mode.
    fn outtake_speed(&self) -> f64 {
        match self.mode {
            Mode::Cone => self.params.cone_outtake_speed,
            Mode::Cube => self.params.cube_outtake_speed,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build a controller with the nominal speed table, skipping file-based
    /// init.
    fn ctrl() -> IntakeCtrl {
        IntakeCtrl {
            params: Params {
                cone_intake_speed: -0.75,
                cone_outtake_speed: 0.75,
                cube_intake_speed: 0.55,
                cube_outtake_speed: -0.3,
                mm_cube_activation_threshold: 450.0,
            },
            ..Default::default()
        }
    }

    fn demand(
        c: &mut IntakeCtrl,
        cmd: IntakeCmd,
        elapsed_s: f64,
    ) -> Option<f64> {
        let (out, _) = c
            .proc(&InputData {
                cmd: Some(cmd),
                distance: DistanceSample::offline(),
                elapsed_s,
            })
            .unwrap();
        out.roller_demand
    }

    fn tick(c: &mut IntakeCtrl, elapsed_s: f64) -> Option<f64> {
        let (out, _) = c
            .proc(&InputData {
                cmd: None,
                distance: DistanceSample::offline(),
                elapsed_s,
            })
            .unwrap();
        out.roller_demand
    }

    #[test]
    fn test_mode_speed_table() {
        let mut c = ctrl();

        // Default mode is cone
        assert_eq!(demand(&mut c, IntakeCmd::Pull, 0.0), Some(-0.75));
        assert_eq!(demand(&mut c, IntakeCmd::Push, 0.0), Some(0.75));

        // Switching mode mid-action changes the next actuation only
        assert_eq!(demand(&mut c, IntakeCmd::SetCubeMode, 0.0), None);
        assert_eq!(demand(&mut c, IntakeCmd::Pull, 0.0), Some(0.55));
        assert_eq!(demand(&mut c, IntakeCmd::Push, 0.0), Some(-0.3));

        assert_eq!(demand(&mut c, IntakeCmd::SetConeMode, 0.0), None);
        assert_eq!(demand(&mut c, IntakeCmd::Pull, 0.0), Some(-0.75));
    }

    #[test]
    fn test_hold_matches_pull() {
        let mut c = ctrl();
        assert_eq!(
            demand(&mut c, IntakeCmd::Hold, 0.0),
            demand(&mut c, IntakeCmd::Pull, 0.0)
        );

        demand(&mut c, IntakeCmd::SetCubeMode, 0.0);
        assert_eq!(demand(&mut c, IntakeCmd::Hold, 0.0), Some(0.55));
    }

    #[test]
    fn test_toggle_mode() {
        let mut c = ctrl();
        demand(&mut c, IntakeCmd::ToggleMode, 0.0);
        assert_eq!(c.mode(), Mode::Cube);
        demand(&mut c, IntakeCmd::ToggleMode, 0.0);
        assert_eq!(c.mode(), Mode::Cone);
    }

    #[test]
    fn test_has_piece_override() {
        let mut c = ctrl();

        // Far and offline samples report no piece without the override
        assert!(!c.has_piece(DistanceSample(500)));
        assert!(!c.has_piece(DistanceSample::offline()));
        assert!(c.has_piece(DistanceSample(300)));

        // With the override set every query reports a piece
        demand(&mut c, IntakeCmd::SetOverride { enabled: true }, 0.0);
        assert!(c.has_piece(DistanceSample(500)));
        assert!(c.has_piece(DistanceSample::offline()));

        demand(&mut c, IntakeCmd::SetOverride { enabled: false }, 0.0);
        assert!(!c.has_piece(DistanceSample(500)));
    }

    #[test]
    fn test_timed_action_expiry() {
        let mut c = ctrl();

        // Pull is commanded immediately, in the requested mode
        assert_eq!(
            demand(
                &mut c,
                IntakeCmd::PullTimed {
                    duration_s: 2.0,
                    mode: Mode::Cone
                },
                0.0
            ),
            Some(-0.75)
        );
        assert!(c.timed_action_active());

        // No new demand while the action runs
        assert_eq!(tick(&mut c, 1.0), None);
        assert_eq!(tick(&mut c, 1.99), None);

        // Exactly zero once the duration has elapsed
        assert_eq!(tick(&mut c, 2.0), Some(0.0));
        assert!(!c.timed_action_active());

        // Nothing further
        assert_eq!(tick(&mut c, 3.0), None);
    }

    #[test]
    fn test_timed_action_sets_mode() {
        let mut c = ctrl();

        assert_eq!(
            demand(
                &mut c,
                IntakeCmd::PushTimed {
                    duration_s: 1.0,
                    mode: Mode::Cube
                },
                0.0
            ),
            Some(-0.3)
        );
        assert_eq!(c.mode(), Mode::Cube);
    }

    #[test]
    fn test_timed_action_cancel() {
        let mut c = ctrl();

        demand(
            &mut c,
            IntakeCmd::PullTimed {
                duration_s: 5.0,
                mode: Mode::Cone,
            },
            0.0,
        );

        // Stop cancels the pending action and halts the rollers at once
        assert_eq!(demand(&mut c, IntakeCmd::Stop, 1.0), Some(0.0));
        assert!(!c.timed_action_active());
        assert_eq!(tick(&mut c, 5.0), None);

        // Any manual actuation supersedes a pending action too
        demand(
            &mut c,
            IntakeCmd::PullTimed {
                duration_s: 5.0,
                mode: Mode::Cone,
            },
            10.0,
        );
        assert_eq!(demand(&mut c, IntakeCmd::Push, 11.0), Some(0.75));
        assert!(!c.timed_action_active());
    }

    #[test]
    fn test_timed_action_invalid_duration() {
        let mut c = ctrl();

        let res = c.proc(&InputData {
            cmd: Some(IntakeCmd::PullTimed {
                duration_s: -1.0,
                mode: Mode::Cone,
            }),
            distance: DistanceSample::offline(),
            elapsed_s: 0.0,
        });

        assert!(matches!(
            res,
            Err(IntakeCtrlError::InvalidTimedDuration(_))
        ));
    }

    #[test]
    fn test_make_safe_stops_rollers() {
        let mut c = ctrl();

        demand(
            &mut c,
            IntakeCmd::PullTimed {
                duration_s: 5.0,
                mode: Mode::Cone,
            },
            0.0,
        );

        c.make_safe();
        assert!(!c.timed_action_active());
        assert_eq!(tick(&mut c, 1.0), Some(0.0));

        // The stop demand fires once only
        assert_eq!(tick(&mut c, 2.0), None);
    }
}

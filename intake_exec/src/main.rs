//! Main intake control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - ToF sensor sensing (one read per cycle, shared by all
//!               consumers within that cycle)
//!         - Telecommand processing and handling
//!         - Possession state machine processing
//!         - Intake control processing
//!         - Roller actuation
//!         - Telemetry output
//!
//! # Modules
//!
//! All modules (e.g. `intake_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait.
//!     2. Have their `proc` function called exactly once per cycle from this
//!        loop, and nowhere else.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use intake_lib::data_store::{DataStore, SafeModeCause};
use intake_lib::roller_driver::RollerDriver;
#[cfg(feature = "sim")]
use intake_lib::sim::{SimMotor, SimTofSensor};
use intake_lib::tm::{SessionTm, TmPacket, TmSink};

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use eqpt_if::eqpt::tof::DistanceSensor;
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

#[cfg(not(feature = "sim"))]
compile_error!("no equipment stack enabled, build with the `sim` feature");

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Limit on the number of consecutive cycle overruns before safe mode is
/// engaged.
const MAX_CONSEC_CYCLE_OVERRUNS: u64 = 50;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "intake_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Talos Intake Control Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SOURCE ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // The single argument is the path to the TC script to run
    let mut script = if args.len() == 2 {

        info!("Loading script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(
            &args[1]).wrap_err("Failed to load script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            si.get_duration(),
            si.get_num_tcs()
        );

        si
    }
    else {
        return Err(eyre!(
            "Expected exactly one argument (the TC script path), found {}",
            args.len() - 1)
        );
    };

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.possession.init("possession.toml", &session)
        .wrap_err("Failed to initialise Possession")?;
    info!("Possession init complete");

    ds.intake_ctrl.init("intake_ctrl.toml", &session)
        .wrap_err("Failed to initialise IntakeCtrl")?;
    info!("IntakeCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    info!("Initialising equipment");

    // The telemetry sink is shared between the roller driver (speed on every
    // actuation) and this loop (status once per cycle)
    let tm = Rc::new(RefCell::new(
        SessionTm::new(&session)
            .wrap_err("Failed to initialise the telemetry sink")?,
    ));
    let tm_sink: Rc<RefCell<dyn TmSink>> = tm.clone();

    #[cfg(feature = "sim")]
    let mut roller = {
        let r = RollerDriver::new(
            Box::new(SimMotor::new("roller_a")),
            Box::new(SimMotor::new("roller_b")),
            tm_sink.clone(),
        );
        info!("RollerDriver initialised (sim motors)");
        r
    };

    #[cfg(feature = "sim")]
    let mut tof_sensor = {
        let s = SimTofSensor::new();
        info!("ToF sensor initialised (sim)");
        s
    };

    info!("Equipment initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        // Apply any pending simulated reading before the cycle's single
        // sensor read
        #[cfg(feature = "sim")]
        if let Some(mm) = ds.pending_sim_distance_mm.take() {
            tof_sensor.set_distance_mm(mm);
        }

        // The one sensor read of this cycle, shared by possession, intake
        // control and telemetry
        ds.distance = tof_sensor.read_distance_mm();

        // ---- TELECOMMAND PROCESSING ----

        match script.get_pending_tcs() {
            PendingTcs::None => (),
            PendingTcs::Some(tc_vec) => {
                for tc in tc_vec.iter() {
                    tc_processor::exec(&mut ds, tc);
                }
            }
            PendingTcs::EndOfScript => {
                // Run on until any pending timed action has expired, so that
                // scripted timed pulls terminate properly
                if !ds.intake_ctrl.timed_action_active() {
                    info!("End of TC script reached, stopping");
                    break
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // Possession processing
        ds.possession_input.distance = ds.distance;
        match ds.possession.proc(&ds.possession_input) {
            Ok((state, report)) => {
                ds.possession_state = state;
                ds.possession_status_rpt = report;
            },
            Err(e) => warn!("Error during Possession processing: {}", e)
        }

        // IntakeCtrl processing
        ds.intake_ctrl_input.distance = ds.distance;
        ds.intake_ctrl_input.elapsed_s = session::get_elapsed_seconds();
        match ds.intake_ctrl.proc(&ds.intake_ctrl_input) {
            Ok((output, report)) => {
                ds.intake_ctrl_output = output;
                ds.intake_ctrl_status_rpt = report;
            },
            Err(e) => {
                // IntakeCtrl errors usually just mean a bad TC payload, so
                // just issue the warning and continue.
                warn!("Error during IntakeCtrl processing: {}", e)
            }
        }

        // ---- ACTUATION ----

        if let Some(demand) = ds.intake_ctrl_output.roller_demand {
            roller.set_velocity(demand);
        }

        // ---- TELEMETRY ----

        tm.borrow_mut().publish_status(&TmPacket {
            commanded_speed: roller.current_speed(),
            mode: ds.intake_ctrl_status_rpt.mode.label(),
            has_piece: ds.intake_ctrl_status_rpt.has_piece,
            sensor_online: ds.distance.online(),
            distance_mm: ds.distance.raw_mm(),
            possession_state: ds.possession_state.label(),
        });

        if ds.is_1_hz_cycle {
            debug!(
                "Mode: {}, possession: {}, has piece: {}",
                ds.intake_ctrl_status_rpt.mode.label(),
                ds.possession_state.label(),
                ds.intake_ctrl_status_rpt.has_piece
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                ds.make_unsafe(SafeModeCause::CycleOverrunLimit).ok();
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;

                // If number of overruns greater than the limit make safe, the
                // intake must not keep driving on stale commands
                if ds.num_consec_cycle_overruns > MAX_CONSEC_CYCLE_OVERRUNS {
                    ds.make_safe(SafeModeCause::CycleOverrunLimit);
                }
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    // Bring the rollers to rest and release the equipment handles. Release is
    // best effort, a failure here cannot affect the (finished) control loop.
    roller.stop();

    match roller.release() {
        Ok(_) => info!("Roller motor handles released"),
        Err(e) => warn!("Could not release the roller motor handles: {}", e)
    }

    match tof_sensor.release() {
        Ok(_) => info!("ToF sensor handle released"),
        Err(e) => warn!("Could not release the ToF sensor handle: {}", e)
    }

    session.exit();

    info!("End of execution");

    Ok(())
}

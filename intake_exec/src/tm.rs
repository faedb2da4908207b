//! # Telemetry sink
//!
//! The controller publishes two telemetry streams: the commanded roller speed
//! on every actuation, and a status packet once per control cycle. Sinks are
//! injected at construction, modules never reach into global registries.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use util::archive::{ArchiveError, Archiver};
use util::session::{get_elapsed_seconds, Session};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Telemetry packet output once per control cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TmPacket {
    /// Last commanded roller duty cycle.
    pub commanded_speed: f64,

    /// Label of the currently selected mode.
    pub mode: &'static str,

    /// True if the intake retains a game piece (override included).
    pub has_piece: bool,

    /// True if the ToF sensor produced a valid echo this cycle.
    pub sensor_online: bool,

    /// Raw distance reading, sentinel included.
    ///
    /// Units: millimetres
    pub distance_mm: i32,

    /// Label of the possession state.
    pub possession_state: &'static str,
}

/// Telemetry sink writing CSV archives into the session directory.
pub struct SessionTm {
    speed_arch: Archiver,
    status_arch: Archiver,
}

#[derive(Serialize)]
struct SpeedRecord {
    time_s: f64,
    speed: f64,
}

#[derive(Serialize)]
struct StatusRecord {
    time_s: f64,
    commanded_speed: f64,
    mode: &'static str,
    has_piece: bool,
    sensor_online: bool,
    distance_mm: i32,
    possession_state: &'static str,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A write-only telemetry sink.
///
/// Publishing never affects control loop correctness, failures inside a sink
/// shall be swallowed (and logged) by the implementation.
pub trait TmSink {
    /// Publish the commanded roller speed. Called on every actuation.
    fn publish_speed(&mut self, speed: f64);

    /// Publish the per-cycle status packet.
    fn publish_status(&mut self, packet: &TmPacket);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SessionTm {
    /// Create a new session-backed telemetry sink.
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(SessionTm {
            speed_arch: Archiver::from_path(session, "intake/roller_speed.csv")?,
            status_arch: Archiver::from_path(session, "intake/status.csv")?,
        })
    }
}

impl TmSink for SessionTm {
    fn publish_speed(&mut self, speed: f64) {
        let record = SpeedRecord {
            time_s: get_elapsed_seconds(),
            speed,
        };

        if let Err(e) = self.speed_arch.serialise(record) {
            warn!("Could not archive roller speed: {}", e);
        }
    }

    fn publish_status(&mut self, packet: &TmPacket) {
        let record = StatusRecord {
            time_s: get_elapsed_seconds(),
            commanded_speed: packet.commanded_speed,
            mode: packet.mode,
            has_piece: packet.has_piece,
            sensor_online: packet.sensor_online,
            distance_mm: packet.distance_mm,
            possession_state: packet.possession_state,
        };

        if let Err(e) = self.status_arch.serialise(record) {
            warn!("Could not archive status packet: {}", e);
        }
    }
}

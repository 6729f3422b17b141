//! # Telemetry
//!
//! All telemetry for a cycle is gathered into one `TmPacket` snapshot and handed to a single
//! `TmSink::publish` call, so the control loop stays testable without any telemetry backend
//! attached. Publication is best-effort: a failed publish is logged by the caller and never
//! affects control-loop correctness.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::act_ctrl::ActId;
use crate::data_store::DataStore;
use util::archive::Archiver;
use util::session::Session;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry packet built once per cycle.
///
/// Kept flat so a packet serialises as one CSV row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TmPacket {
    pub time_s: f64,

    pub num_cycles: u64,

    // Pose estimate
    pub pose_x_m: f64,
    pub pose_y_m: f64,
    pub heading_rad: f64,

    // Robot-relative velocity estimate
    pub vel_x_ms: f64,
    pub vel_y_ms: f64,
    pub vel_omega_rads: f64,

    // Drive module speeds
    pub mod_0_speed_ms: f64,
    pub mod_1_speed_ms: f64,
    pub mod_2_speed_ms: f64,
    pub mod_3_speed_ms: f64,

    // Actuator demands
    pub fire_speed_norm: f64,
    pub intake_speed_norm: f64,
    pub turret_pos_dem_rot: Option<f64>,

    // Status flags
    pub desaturated: bool,
    pub sensor_gap: bool,

    // Environment flags
    pub sim_active: bool,
    pub device_connected: bool,
    pub demo_active: bool,
    pub enabled: bool,
}

/// Telemetry sink writing each packet as a row of a session CSV archive.
pub struct ArchiveTmSink {
    arch: Archiver,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TmError {
    #[error("Could not create the telemetry archive: {0}")]
    ArchiveInitError(String),

    #[error("Could not write the telemetry archive: {0}")]
    ArchiveWriteError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Sink accepting one telemetry packet per cycle.
pub trait TmSink {
    /// Publish a packet.
    ///
    /// Best-effort: the caller logs a failure and carries on.
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmPacket {
    /// Build the packet for this cycle from the data store.
    pub fn from_datastore(ds: &DataStore) -> Self {
        Self {
            time_s: ds.time_s,
            num_cycles: ds.num_cycles as u64,

            pose_x_m: ds.drive_est_output.pose.x_m,
            pose_y_m: ds.drive_est_output.pose.y_m,
            heading_rad: ds.drive_est_output.pose.heading_rad,

            vel_x_ms: ds.drive_est_output.velocity_rr.x_ms,
            vel_y_ms: ds.drive_est_output.velocity_rr.y_ms,
            vel_omega_rads: ds.drive_est_output.velocity_rr.omega_rads,

            mod_0_speed_ms: ds.drive_est_output.module_speeds_ms[0],
            mod_1_speed_ms: ds.drive_est_output.module_speeds_ms[1],
            mod_2_speed_ms: ds.drive_est_output.module_speeds_ms[2],
            mod_3_speed_ms: ds.drive_est_output.module_speeds_ms[3],

            fire_speed_norm: ds.act_dems.speed(ActId::Fire).unwrap_or(0.0),
            intake_speed_norm: ds.act_dems.speed(ActId::Intake).unwrap_or(0.0),
            turret_pos_dem_rot: ds.act_dems.pos(ActId::Turret),

            desaturated: ds.drive_est_status_rpt.desaturated,
            sensor_gap: ds.drive_est_status_rpt.sensor_gap,

            sim_active: ds.drive_est.is_simulated(),
            device_connected: ds.device_connected,
            demo_active: ds.demo_active,
            enabled: ds.enabled,
        }
    }
}

impl ArchiveTmSink {
    /// Create a new archive sink writing to `tm.csv` under the session archive root.
    pub fn new(session: &Session) -> Result<Self, TmError> {
        let arch = Archiver::from_path(session, "tm.csv")
            .map_err(|e| TmError::ArchiveInitError(e.to_string()))?;

        Ok(Self { arch })
    }
}

impl TmSink for ArchiveTmSink {
    fn publish(&mut self, packet: &TmPacket) -> Result<(), TmError> {
        self.arch
            .serialise(packet)
            .map_err(|e| TmError::ArchiveWriteError(e.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_est::{ChassisVelocity, Pose2d};

    #[test]
    fn test_packet_reflects_datastore() {
        let mut ds = DataStore::default();

        ds.time_s = 1.5;
        ds.num_cycles = 75;
        ds.enabled = true;
        ds.demo_active = true;
        ds.drive_est_output.pose = Pose2d::new(8.2296, 4.1148, 0.1);
        ds.drive_est_output.velocity_rr = ChassisVelocity::robot(0.35, 0.0, 0.05);
        ds.drive_est_output.module_speeds_ms = [0.1, 0.2, 0.3, 0.4];
        ds.drive_est_status_rpt.desaturated = true;
        ds.act_dems.set_speed(ActId::Fire, 0.5);

        let packet = TmPacket::from_datastore(&ds);

        assert_eq!(packet.time_s, 1.5);
        assert_eq!(packet.num_cycles, 75);
        assert_eq!(packet.pose_x_m, 8.2296);
        assert_eq!(packet.heading_rad, 0.1);
        assert_eq!(packet.vel_x_ms, 0.35);
        assert_eq!(packet.mod_3_speed_ms, 0.4);
        assert_eq!(packet.fire_speed_norm, 0.5);
        assert!(packet.desaturated);
        assert!(packet.sim_active);
        assert!(packet.demo_active);
        assert!(packet.enabled);
        assert!(!packet.device_connected);

        // No turret command has run, so there is no position demand
        assert!(packet.turret_pos_dem_rot.is_none());
    }
}

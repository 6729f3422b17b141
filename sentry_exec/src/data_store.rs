//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{act_ctrl, drive_est, input_map};

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

    /// Time since the start of the session, sampled once at the start of the cycle.
    ///
    /// Units: seconds
    pub time_s: f64,

    // Operating state
    /// True if the sentry is in an enabled operating state.
    pub enabled: bool,

    /// True if the operator input device is connected this cycle.
    pub device_connected: bool,

    /// True if the demonstration fallback drives the sentry this cycle.
    pub demo_active: bool,

    // VelMap
    pub vel_mapper: input_map::VelocityMapper,
    pub vel_map_input: input_map::InputData,
    pub vel_map_output: drive_est::ChassisVelocity,
    pub vel_map_status_rpt: input_map::StatusReport,

    // DriveEst
    pub drive_est: drive_est::DriveEstimator,
    pub drive_est_input: drive_est::InputData,
    pub drive_est_output: drive_est::OutputData,
    pub drive_est_status_rpt: drive_est::StatusReport,

    // Actuator control
    /// Input sampled once per cycle for the command state machines.
    pub cmd_input: act_ctrl::CmdInput,

    /// Actuator demands written by the command state machines this cycle.
    pub act_dems: act_ctrl::ActDems,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need wiping at the start of a cycle, and sets the 1Hz cycle
    /// flag. Actuator demands are reset to their safe defaults so nothing can carry a stale
    /// demand across cycles.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, time_s: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.vel_map_input = input_map::InputData::default();
        self.vel_map_output = drive_est::ChassisVelocity::zero();
        self.vel_map_status_rpt = input_map::StatusReport::default();

        self.drive_est_input = drive_est::InputData::default();
        self.drive_est_output = drive_est::OutputData::default();
        self.drive_est_status_rpt = drive_est::StatusReport::default();

        self.cmd_input = act_ctrl::CmdInput::default();
        self.act_dems = act_ctrl::ActDems::default();

        self.time_s = time_s;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_ctrl::ActId;

    #[test]
    fn test_cycle_start_wipes_demands() {
        let mut ds = DataStore::default();

        ds.act_dems.set_speed(ActId::Intake, -1.0);
        ds.act_dems.set_pos(ActId::Turret, 0.25);

        ds.cycle_start(50.0, 0.02);

        assert_eq!(ds.act_dems.speed(ActId::Intake).unwrap(), 0.0);
        assert!(ds.act_dems.pos(ActId::Turret).is_none());
        assert_eq!(ds.time_s, 0.02);
    }

    #[test]
    fn test_1_hz_cycle_flag() {
        let mut ds = DataStore::default();

        ds.cycle_start(50.0, 0.0);
        assert!(ds.is_1_hz_cycle);

        ds.num_cycles = 1;
        ds.cycle_start(50.0, 0.02);
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 50;
        ds.cycle_start(50.0, 1.0);
        assert!(ds.is_1_hz_cycle);
    }
}

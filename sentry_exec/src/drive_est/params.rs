//! Parameters structure for DriveEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_DRV_MODULES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive estimator.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The position of the drive modules in the sentry body frame.
    ///
    /// Units: meters,
    /// Frame: body
    pub mod_pos_m_rb: [[f64; 2]; NUM_DRV_MODULES],

    // ---- CAPABILITIES ----

    /// Maximum linear speed of any drive module.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    // ---- INITIAL STATE ----

    /// Pose at the start of the session as (x, y, heading).
    ///
    /// Units: meters, meters, radians,
    /// Frame: field
    pub start_pose: [f64; 3],
}

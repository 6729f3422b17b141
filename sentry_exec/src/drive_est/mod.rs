//! Drive estimator module
//!
//! Maintains the sentry's field pose, robot-relative velocity and drive module speeds behind a
//! single API, regardless of whether a physical drivetrain is attached. The backend is selected
//! once at construction and never switched at runtime: either the hardware backend refreshes the
//! state from its own odometry, or the kinematic simulation integrates commanded velocities.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod hw;
mod params;
mod pose;
mod sim;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use hw::*;
pub use params::*;
pub use pose::*;
pub use sim::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of drive modules on the sentry.
pub const NUM_DRV_MODULES: usize = 4;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveEst operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveEstError {
    #[error("Could not load the drive estimator parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Invalid drivetrain geometry: {0}")]
    InvalidGeometry(String),
}

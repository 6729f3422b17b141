//! Actuator control module
//!
//! Runs the command state machines for the fire, intake and turret actuators. Each command
//! exclusively owns one actuator and follows the `start`/`step`/`is_done`/`stop` lifecycle,
//! driven once per cycle by the command executor.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod exec;
mod fire;
mod slider;
mod turret;
mod unjam;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use exec::*;
pub use fire::*;
pub use slider::*;
pub use turret::*;
pub use unjam::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum time the fire actuator runs once commanded.
///
/// Units: seconds
pub const FIRE_MIN_DURATION_S: f64 = 2.0;

/// Deadband applied to the raw fire input magnitude.
pub const FIRE_DEADBAND: f64 = 0.1;

/// Fixed reverse demand used to unjam the intake.
pub const UNJAM_SPEED_NORM: f64 = -1.0;

/// Time the intake is reversed for during an unjam.
///
/// Units: seconds
pub const UNJAM_DURATION_S: f64 = 2.0;

/// Position tolerance within which the turret is considered on target.
///
/// Units: rotations
pub const TURRET_POS_TOL_ROT: f64 = 0.05;

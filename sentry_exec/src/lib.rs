//! # Sentry library.
//!
//! This library allows other crates in the workspace to access items defined inside the sentry
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator control module - runs the fire, intake and turret command state machines
pub mod act_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Drive estimator module - maintains the pose and velocity estimate over either the physical
/// drivetrain or the kinematic simulation
pub mod drive_est;

/// Velocity mapper module - converts raw operator input into chassis velocity commands
pub mod input_map;

/// Telemetry module - builds and publishes the cyclic telemetry packet
pub mod tm;

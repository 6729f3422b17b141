//! Physical drivetrain backend interface
//!
//! The physical drivetrain, its motor controllers and its odometry fusion are external to this
//! crate. DriveEst only ever talks to them through the `DriveHardware` trait, which an
//! integration crate implements against the real electronics.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ChassisVelocity, Pose2d, NUM_DRV_MODULES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State read back from the physical drivetrain in one refresh.
#[derive(Clone, Copy, Debug)]
pub struct HwDriveState {
    /// The fused odometry pose.
    pub pose: Pose2d,

    /// The measured robot-relative velocity.
    pub velocity_rr: ChassisVelocity,

    /// The measured speed of each drive module.
    ///
    /// Units: meters/second
    pub module_speeds_ms: [f64; NUM_DRV_MODULES],
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the physical drivetrain backend.
pub trait DriveHardware {
    /// Forward a chassis velocity command to the hardware.
    ///
    /// Fire-and-forget: the command is assumed to take effect before the next tick.
    fn command_velocity(&mut self, cmd: &ChassisVelocity);

    /// Refresh the pose, velocity and module state from the hardware's own odometry.
    ///
    /// `None` indicates a transient sensor gap. The estimator retains its last known state for
    /// the cycle and no error is raised.
    fn refresh(&mut self) -> Option<HwDriveState>;

    /// Zero the hardware's heading reference.
    fn reset_heading(&mut self);
}

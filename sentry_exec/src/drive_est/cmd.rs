//! Chassis velocity commands passed into DriveEst

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A chassis velocity demand, tagged with the frame it is expressed in.
///
/// Commands are produced fresh each cycle and never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ChassisVelocity {
    /// Velocity along the frame's X axis (forward for the robot frame).
    ///
    /// Units: meters/second
    pub x_ms: f64,

    /// Velocity along the frame's Y axis (strafe left for the robot frame).
    ///
    /// Units: meters/second
    pub y_ms: f64,

    /// Angular rate about the Z axis, positive counter-clockwise.
    ///
    /// Units: radians/second
    pub omega_rads: f64,

    /// The frame this velocity is expressed in.
    pub frame: VelFrame,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible frames for a chassis velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VelFrame {
    /// Fixed world frame, independent of the sentry's heading.
    Field,

    /// Frame attached to the sentry body, X forward.
    Robot,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChassisVelocity {
    /// Build a field-relative velocity command.
    pub fn field(x_ms: f64, y_ms: f64, omega_rads: f64) -> Self {
        Self {
            x_ms,
            y_ms,
            omega_rads,
            frame: VelFrame::Field,
        }
    }

    /// Build a robot-relative velocity command.
    pub fn robot(x_ms: f64, y_ms: f64, omega_rads: f64) -> Self {
        Self {
            x_ms,
            y_ms,
            omega_rads,
            frame: VelFrame::Robot,
        }
    }

    /// The zero velocity command.
    pub fn zero() -> Self {
        Self::robot(0.0, 0.0, 0.0)
    }

    /// Express this velocity in the robot frame, given the current heading.
    ///
    /// Field-relative commands are rotated by the negative heading. Robot-relative commands are
    /// returned unchanged.
    pub fn into_robot(self, heading_rad: f64) -> Self {
        match self.frame {
            VelFrame::Robot => self,
            VelFrame::Field => {
                let linear =
                    Rotation2::new(-heading_rad) * Vector2::new(self.x_ms, self.y_ms);

                Self {
                    x_ms: linear.x,
                    y_ms: linear.y,
                    omega_rads: self.omega_rads,
                    frame: VelFrame::Robot,
                }
            }
        }
    }

    /// Express this velocity in the field frame, given the current heading.
    ///
    /// The inverse of `into_robot`: robot-relative commands are rotated by the heading,
    /// field-relative commands are returned unchanged.
    pub fn into_field(self, heading_rad: f64) -> Self {
        match self.frame {
            VelFrame::Field => self,
            VelFrame::Robot => {
                let linear =
                    Rotation2::new(heading_rad) * Vector2::new(self.x_ms, self.y_ms);

                Self {
                    x_ms: linear.x,
                    y_ms: linear.y,
                    omega_rads: self.omega_rads,
                    frame: VelFrame::Field,
                }
            }
        }
    }
}

impl Default for ChassisVelocity {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_field_to_robot_rotation() {
        // Heading +90 deg: a field +X demand points to the robot's right (-Y)
        let vel = ChassisVelocity::field(1.0, 0.0, 0.5).into_robot(FRAC_PI_2);

        assert!(vel.x_ms.abs() < 1e-12);
        assert!((vel.y_ms + 1.0).abs() < 1e-12);
        assert_eq!(vel.omega_rads, 0.5);
        assert_eq!(vel.frame, VelFrame::Robot);
    }

    #[test]
    fn test_robot_frame_unchanged() {
        let vel = ChassisVelocity::robot(0.5, -0.2, 0.1);
        assert_eq!(vel.into_robot(1.234), vel);
    }

    #[test]
    fn test_robot_to_field_inverts_conversion() {
        let vel = ChassisVelocity::field(0.8, -0.3, 0.2);
        let back = vel.into_robot(0.7).into_field(0.7);

        assert!((back.x_ms - vel.x_ms).abs() < 1e-12);
        assert!((back.y_ms - vel.y_ms).abs() < 1e-12);
        assert_eq!(back.frame, VelFrame::Field);
    }
}

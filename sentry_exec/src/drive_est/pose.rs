//! Field pose representation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::wrap_to_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose of the sentry body frame in the field frame.
///
/// The heading is the angle between the field X axis and the body X axis, and is always
/// normalised into the range (-pi, pi].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Pose2d {
    /// Position along the field X axis.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the field Y axis.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Heading about the field Z axis, positive counter-clockwise.
    ///
    /// Units: radians, range (-pi, pi]
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2d {
    /// Build a new pose, normalising the heading into (-pi, pi].
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            x_m,
            y_m,
            heading_rad: wrap_to_pi(heading_rad),
        }
    }

    /// Return this pose with the heading zeroed and the translation preserved.
    pub fn with_zero_heading(&self) -> Self {
        Self {
            x_m: self.x_m,
            y_m: self.y_m,
            heading_rad: 0.0,
        }
    }
}

impl Default for Pose2d {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_heading_normalised_on_construction() {
        assert!((Pose2d::new(0.0, 0.0, 3.0 * PI).heading_rad - PI).abs() < 1e-12);
        assert!((Pose2d::new(0.0, 0.0, -PI).heading_rad - PI).abs() < 1e-12);
        assert!((Pose2d::new(0.0, 0.0, PI + 0.1).heading_rad - (-PI + 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_heading_preserves_translation() {
        let pose = Pose2d::new(1.2, -3.4, 0.7);
        let zeroed = pose.with_zero_heading();

        assert_eq!(zeroed.x_m, 1.2);
        assert_eq!(zeroed.y_m, -3.4);
        assert_eq!(zeroed.heading_rad, 0.0);
    }
}

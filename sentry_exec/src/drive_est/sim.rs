//! Kinematic drivetrain simulation
//!
//! Used as the DriveEst backend when no physical drivetrain is attached. Commanded velocities
//! are integrated into a simulated pose with the rigid-body exponential map, and per-module
//! speeds are derived from the fixed module mount positions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Rotation2, Vector2};

// Internal
use super::{ChassisVelocity, Params, Pose2d, VelFrame, NUM_DRV_MODULES};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Rotation magnitude below which the small-angle series is used in the exponential map.
///
/// Units: radians
const SMALL_ANGLE_THRESHOLD_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Simulated drivetrain state.
pub struct SimDrive {
    pose: Pose2d,

    /// The most recent command, held until the next tick consumes it.
    buffered_cmd: Option<ChassisVelocity>,

    velocity_rr: ChassisVelocity,

    module_speeds_ms: [f64; NUM_DRV_MODULES],

    mod_pos_m_rb: [[f64; 2]; NUM_DRV_MODULES],

    max_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimDrive {
    /// Create a new simulated drivetrain at the parameterised start pose.
    pub fn new(params: &Params) -> Self {
        Self {
            pose: Pose2d::new(
                params.start_pose[0],
                params.start_pose[1],
                params.start_pose[2],
            ),
            buffered_cmd: None,
            velocity_rr: ChassisVelocity::zero(),
            module_speeds_ms: [0.0; NUM_DRV_MODULES],
            mod_pos_m_rb: params.mod_pos_m_rb,
            max_speed_ms: params.max_speed_ms,
        }
    }

    /// Buffer a velocity command for the next tick.
    ///
    /// The command has no effect on the simulated pose until `tick` is called.
    pub fn buffer_cmd(&mut self, cmd: ChassisVelocity) {
        self.buffered_cmd = Some(cmd);
    }

    /// Advance the simulation by one control period.
    ///
    /// When the system is not enabled the buffered command is treated as zero, bringing the
    /// simulated sentry to an immediate stop.
    ///
    /// Returns true if the derived module speeds had to be desaturated.
    pub fn tick(&mut self, dt_s: f64, enabled: bool) -> bool {
        let cmd = match (enabled, self.buffered_cmd) {
            (true, Some(c)) => c,
            _ => ChassisVelocity::zero(),
        };

        let vel_rr = cmd.into_robot(self.pose.heading_rad);

        self.pose = integrate(&self.pose, &vel_rr, dt_s);

        let mut speeds = to_module_speeds(&vel_rr, &self.mod_pos_m_rb);
        let desaturated = desaturate(&mut speeds, self.max_speed_ms);

        self.velocity_rr = vel_rr;
        self.module_speeds_ms = speeds;

        desaturated
    }

    /// The current simulated pose.
    pub fn pose(&self) -> Pose2d {
        self.pose
    }

    /// The robot-relative velocity used at the last tick.
    pub fn velocity_rr(&self) -> ChassisVelocity {
        self.velocity_rr
    }

    /// The desaturated module speeds derived at the last tick.
    pub fn module_speeds_ms(&self) -> [f64; NUM_DRV_MODULES] {
        self.module_speeds_ms
    }

    /// Zero the simulated heading while preserving the translation.
    pub fn reset_heading(&mut self) {
        self.pose = self.pose.with_zero_heading();
    }
}

impl Default for SimDrive {
    fn default() -> Self {
        Self::new(&Params::default())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate a constant robot-relative velocity over one time step.
///
/// Uses the closed-form exponential map so that simultaneous translation and rotation compose
/// correctly. A naive per-axis Euler step drifts when a rotation demand runs for many cycles
/// alongside a translation demand, which happens whenever a turret or fire command is active
/// while the operator is driving.
///
/// The velocity must be expressed in the robot frame.
pub fn integrate(pose: &Pose2d, vel_rr: &ChassisVelocity, dt_s: f64) -> Pose2d {
    debug_assert!(vel_rr.frame == VelFrame::Robot);

    let dx_m = vel_rr.x_ms * dt_s;
    let dy_m = vel_rr.y_ms * dt_s;
    let dtheta_rad = vel_rr.omega_rads * dt_s;

    // Closed-form coefficients, with a series expansion near zero rotation to avoid the 0/0
    let (s, c) = if dtheta_rad.abs() < SMALL_ANGLE_THRESHOLD_RAD {
        (
            1.0 - dtheta_rad * dtheta_rad / 6.0,
            dtheta_rad / 2.0,
        )
    }
    else {
        (
            dtheta_rad.sin() / dtheta_rad,
            (1.0 - dtheta_rad.cos()) / dtheta_rad,
        )
    };

    let body_disp_m = Vector2::new(dx_m * s - dy_m * c, dx_m * c + dy_m * s);
    let field_disp_m = Rotation2::new(pose.heading_rad) * body_disp_m;

    Pose2d::new(
        pose.x_m + field_disp_m.x,
        pose.y_m + field_disp_m.y,
        pose.heading_rad + dtheta_rad,
    )
}

/// Derive the linear speed of each drive module from a robot-relative chassis velocity.
///
/// Each module moves with the chassis velocity plus the contribution of the angular rate acting
/// over the module's mount offset.
pub fn to_module_speeds(
    vel_rr: &ChassisVelocity,
    mod_pos_m_rb: &[[f64; 2]; NUM_DRV_MODULES],
) -> [f64; NUM_DRV_MODULES] {
    debug_assert!(vel_rr.frame == VelFrame::Robot);

    let mut speeds_ms = [0.0; NUM_DRV_MODULES];

    for (i, pos) in mod_pos_m_rb.iter().enumerate() {
        let vx_ms = vel_rr.x_ms - vel_rr.omega_rads * pos[1];
        let vy_ms = vel_rr.y_ms + vel_rr.omega_rads * pos[0];

        speeds_ms[i] = Vector2::new(vx_ms, vy_ms).norm();
    }

    speeds_ms
}

/// Uniformly scale down the module speeds so that none exceeds the maximum.
///
/// Scaling all modules by the same factor preserves the speed ratios between modules, and hence
/// the commanded turning behaviour. Returns true if any scaling was applied.
pub fn desaturate(speeds_ms: &mut [f64; NUM_DRV_MODULES], max_speed_ms: f64) -> bool {
    let top_speed_ms = speeds_ms.iter().cloned().fold(0.0, f64::max);

    if top_speed_ms > max_speed_ms {
        let scale = max_speed_ms / top_speed_ms;

        for speed in speeds_ms.iter_mut() {
            *speed *= scale;
        }

        true
    }
    else {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;

    fn test_params() -> Params {
        Params {
            mod_pos_m_rb: [[0.3, 0.3], [0.3, -0.3], [-0.3, 0.3], [-0.3, -0.3]],
            max_speed_ms: 4.5,
            start_pose: [0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_integrate_pure_translation() {
        let mut pose = Pose2d::default();
        let vel = ChassisVelocity::robot(0.35, 0.0, 0.0);

        let mut last_dist_m = 0.0;

        for _ in 0..10 {
            pose = integrate(&pose, &vel, 0.02);

            // Translation magnitude grows monotonically under constant velocity
            let dist_m = (pose.x_m.powi(2) + pose.y_m.powi(2)).sqrt();
            assert!(dist_m > last_dist_m);
            last_dist_m = dist_m;
        }

        assert!((pose.x_m - 0.07).abs() < 1e-9);
        assert!(pose.y_m.abs() < 1e-12);
        assert!(pose.heading_rad.abs() < 1e-12);
    }

    #[test]
    fn test_integrate_pure_rotation() {
        let mut pose = Pose2d::default();
        let vel = ChassisVelocity::robot(0.0, 0.0, FRAC_PI_2);

        pose = integrate(&pose, &vel, 1.0);

        assert!(pose.x_m.abs() < 1e-12);
        assert!(pose.y_m.abs() < 1e-12);
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_integrate_arc() {
        // Forward at 1 m/s while turning at pi/2 rad/s for 1 s traces a quarter circle of
        // radius 2/pi
        let pose = integrate(
            &Pose2d::default(),
            &ChassisVelocity::robot(1.0, 0.0, FRAC_PI_2),
            1.0,
        );

        assert!((pose.x_m - 2.0 / PI).abs() < 1e-9);
        assert!((pose.y_m - 2.0 / PI).abs() < 1e-9);
        assert!((pose.heading_rad - FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_integrate_heading_wraps() {
        let mut pose = Pose2d::default();
        let vel = ChassisVelocity::robot(0.0, 0.0, 1.0);

        // 400 ticks of 0.02 s at 1 rad/s pass the pi boundary
        for _ in 0..400 {
            pose = integrate(&pose, &vel, 0.02);
            assert!(pose.heading_rad > -PI && pose.heading_rad <= PI);
        }

        assert!((pose.heading_rad - (8.0 - 2.0 * PI)).abs() < 1e-9);
    }

    #[test]
    fn test_module_speeds_pure_translation() {
        let params = test_params();
        let speeds = to_module_speeds(&ChassisVelocity::robot(1.5, 0.0, 0.0), &params.mod_pos_m_rb);

        for speed in speeds.iter() {
            assert!((speed - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_module_speeds_pure_rotation() {
        let params = test_params();
        let speeds = to_module_speeds(&ChassisVelocity::robot(0.0, 0.0, 1.0), &params.mod_pos_m_rb);

        // All modules sit at the same radius so rotate at the same speed
        let radius_m = (0.3f64.powi(2) + 0.3f64.powi(2)).sqrt();
        for speed in speeds.iter() {
            assert!((speed - radius_m).abs() < 1e-12);
        }
    }

    #[test]
    fn test_desaturate_preserves_ratios() {
        let mut speeds = [6.0, 3.0, 1.5, 0.75];
        let ratio_before = speeds[0] / speeds[1];

        let limited = desaturate(&mut speeds, 4.5);

        assert!(limited);
        assert!((speeds[0] - 4.5).abs() < 1e-12);
        assert!((speeds[0] / speeds[1] - ratio_before).abs() < 1e-12);
        assert!((speeds[1] / speeds[2] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_desaturate_no_op_below_max() {
        let mut speeds = [1.0, 2.0, 3.0, 4.0];
        let limited = desaturate(&mut speeds, 4.5);

        assert!(!limited);
        assert_eq!(speeds, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sim_cmd_buffered_until_tick() {
        let params = test_params();
        let mut sim = SimDrive::new(&params);

        sim.buffer_cmd(ChassisVelocity::robot(1.0, 0.0, 0.0));
        assert_eq!(sim.pose(), Pose2d::default());

        sim.tick(0.02, true);
        assert!((sim.pose().x_m - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_sim_disabled_zeroes_cmd() {
        let params = test_params();
        let mut sim = SimDrive::new(&params);

        sim.buffer_cmd(ChassisVelocity::robot(1.0, 0.0, 0.0));
        sim.tick(0.02, false);

        assert_eq!(sim.pose(), Pose2d::default());
        assert_eq!(sim.velocity_rr(), ChassisVelocity::zero());
    }
}

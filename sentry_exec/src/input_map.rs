//! Velocity mapper module
//!
//! Converts raw operator axis samples into field-relative chassis velocity commands: deadband,
//! sign correction and scaling to the configured maximum speeds. When the demonstration
//! fallback is active the raw axes are bypassed entirely and a fixed synthetic command is
//! emitted instead, so unattended runs still produce motion.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::drive_est::ChassisVelocity;
use util::{
    maths::apply_deadband,
    module::State,
    params,
    session::Session};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Normalised forward velocity commanded in demo mode.
const DEMO_FWD_NORM: f64 = 0.35;

/// Amplitude of the oscillating strafe component in demo mode.
const DEMO_STRAFE_NORM: f64 = 0.15;

/// Angular frequency of the demo strafe oscillation.
///
/// Units: radians/second
const DEMO_STRAFE_FREQ_RADS: f64 = 1.0;

/// Normalised rotation rate commanded in demo mode.
const DEMO_ROT_NORM: f64 = 0.15;

/// Margin past full scale accepted before a raw sample is rejected as out of range.
const AXIS_RANGE_MARGIN: f64 = 1e-6;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during VelMap operation.
#[derive(Debug, thiserror::Error)]
pub enum InputMapError {
    #[error("Raw axis sample outside the expected [-1, 1] range: {0}")]
    AxisOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Raw operator axis samples, each in [-1, 1].
#[derive(Clone, Copy, Debug, Default)]
pub struct RawAxes {
    /// Forward/backward axis sample.
    pub fwd: f64,

    /// Left/right strafe axis sample.
    pub strafe: f64,

    /// Rotation axis sample.
    pub rot: f64,
}

/// Parameters for the velocity mapper.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Symmetric deadband applied to each raw axis sample.
    pub axis_deadband: f64,

    /// Maximum commanded linear speed.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum commanded angular rate.
    ///
    /// Units: radians/second
    pub max_ang_rate_rads: f64,

    /// Set true for axes whose physical convention is opposite the control convention.
    pub invert_fwd: bool,
    pub invert_strafe: bool,
    pub invert_rot: bool,
}

/// Velocity mapper module state
#[derive(Default)]
pub struct VelocityMapper {
    params: Params,
}

/// Input data to VelMap.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// The raw axis samples for this cycle, or `None` if no device is connected.
    pub raw: Option<RawAxes>,

    /// True if the demonstration fallback shall drive the sentry this cycle.
    pub demo_active: bool,

    /// Time since the start of the session.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Status report for VelMap processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the demo command was emitted in place of operator input.
    pub demo_active: bool,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Interface to the operator input device, polled once per cycle.
pub trait InputDevice {
    /// True while the device is connected.
    fn connected(&self) -> bool;

    /// The drive axis samples, each in [-1, 1].
    fn axes(&self) -> RawAxes;

    /// Raw axis sample controlling the fire speed.
    fn fire_axis(&self) -> f64;

    /// True while the fire trigger is held.
    fn trigger_held(&self) -> bool;

    /// Raw throttle axis sample driving the intake slider.
    fn throttle_axis(&self) -> f64;

    /// True while the heading-reset button is pressed.
    fn reset_heading_pressed(&self) -> bool;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES (DEVICES)
// ---------------------------------------------------------------------------

/// Placeholder device used when no physical input device is attached.
///
/// Always reads as disconnected, with all axes centred and the throttle parked at the
/// zero-speed end.
pub struct DisconnectedDevice;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputDevice for DisconnectedDevice {
    fn connected(&self) -> bool {
        false
    }

    fn axes(&self) -> RawAxes {
        RawAxes::default()
    }

    fn fire_axis(&self) -> f64 {
        0.0
    }

    fn trigger_held(&self) -> bool {
        false
    }

    fn throttle_axis(&self) -> f64 {
        -1.0
    }

    fn reset_heading_pressed(&self) -> bool {
        false
    }
}

impl State for VelocityMapper {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = ChassisVelocity;
    type StatusReport = StatusReport;
    type ProcError = InputMapError;

    /// Initialise the VelMap module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of the velocity mapper.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let report = StatusReport {
            demo_active: input_data.demo_active,
        };

        let vel = if input_data.demo_active {
            self.demo_cmd(input_data.time_s)
        }
        else {
            match input_data.raw {
                Some(raw) => self.map(&raw)?,
                // No device and no demo fallback (e.g. disabled): command a stop
                None => ChassisVelocity::zero(),
            }
        };

        Ok((vel, report))
    }
}

impl VelocityMapper {

    /// Build a mapper from already-loaded parameters.
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    /// Map raw operator axes into a field-relative chassis velocity.
    pub fn map(&self, raw: &RawAxes) -> Result<ChassisVelocity, InputMapError> {
        for axis in [raw.fwd, raw.strafe, raw.rot].iter() {
            if axis.abs() > 1.0 + AXIS_RANGE_MARGIN {
                return Err(InputMapError::AxisOutOfRange(*axis));
            }
        }

        let fwd_sign = if self.params.invert_fwd { -1.0 } else { 1.0 };
        let strafe_sign = if self.params.invert_strafe { -1.0 } else { 1.0 };
        let rot_sign = if self.params.invert_rot { -1.0 } else { 1.0 };

        let deadband = self.params.axis_deadband;

        Ok(ChassisVelocity::field(
            fwd_sign * apply_deadband(raw.fwd, deadband) * self.params.max_speed_ms,
            strafe_sign * apply_deadband(raw.strafe, deadband) * self.params.max_speed_ms,
            rot_sign * apply_deadband(raw.rot, deadband) * self.params.max_ang_rate_rads,
        ))
    }

    /// The deterministic synthetic command emitted in demo mode.
    ///
    /// A fixed forward velocity, a slowly oscillating strafe and a constant small rotation, so
    /// automated runs can assert monotonic pose change without any input hardware.
    pub fn demo_cmd(&self, time_s: f64) -> ChassisVelocity {
        ChassisVelocity::field(
            DEMO_FWD_NORM * self.params.max_speed_ms,
            DEMO_STRAFE_NORM * (time_s * DEMO_STRAFE_FREQ_RADS).sin() * self.params.max_speed_ms,
            DEMO_ROT_NORM * self.params.max_ang_rate_rads,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_mapper() -> VelocityMapper {
        VelocityMapper::with_params(Params {
            axis_deadband: 0.1,
            max_speed_ms: 4.5,
            max_ang_rate_rads: std::f64::consts::PI,
            invert_fwd: true,
            invert_strafe: true,
            invert_rot: true,
        })
    }

    #[test]
    fn test_deadband_zeroes_noise() {
        let mapper = test_mapper();

        let vel = mapper
            .map(&RawAxes { fwd: 0.05, strafe: -0.09, rot: 0.0999 })
            .unwrap();

        assert_eq!(vel.x_ms, 0.0);
        assert_eq!(vel.y_ms, 0.0);
        assert_eq!(vel.omega_rads, 0.0);
    }

    #[test]
    fn test_full_deflection_scaled_and_inverted() {
        let mapper = test_mapper();

        // Pushing the stick forward reads -1 on the device, commands full speed forward
        let vel = mapper
            .map(&RawAxes { fwd: -1.0, strafe: 0.0, rot: -1.0 })
            .unwrap();

        assert!((vel.x_ms - 4.5).abs() < 1e-9);
        assert_eq!(vel.y_ms, 0.0);
        assert!((vel.omega_rads - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_axis_out_of_range_rejected() {
        let mapper = test_mapper();

        assert!(matches!(
            mapper.map(&RawAxes { fwd: 1.5, strafe: 0.0, rot: 0.0 }),
            Err(InputMapError::AxisOutOfRange(_))
        ));
    }

    #[test]
    fn test_demo_cmd_deterministic() {
        let mapper = test_mapper();

        let vel = mapper.demo_cmd(0.0);
        assert!((vel.x_ms - 0.35 * 4.5).abs() < 1e-12);
        assert_eq!(vel.y_ms, 0.0);
        assert!((vel.omega_rads - 0.15 * std::f64::consts::PI).abs() < 1e-12);

        // Strafe oscillates with session time
        let later = mapper.demo_cmd(std::f64::consts::FRAC_PI_2);
        assert!((later.y_ms - 0.15 * 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_proc_demo_bypasses_raw_axes() {
        let mut mapper = test_mapper();

        let input = InputData {
            raw: Some(RawAxes { fwd: -1.0, strafe: -1.0, rot: -1.0 }),
            demo_active: true,
            time_s: 0.0,
        };

        let (vel, report) = mapper.proc(&input).unwrap();
        assert!(report.demo_active);
        assert!((vel.x_ms - 0.35 * 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_proc_no_device_no_demo_commands_stop() {
        let mut mapper = test_mapper();

        let input = InputData {
            raw: None,
            demo_active: false,
            time_s: 0.0,
        };

        let (vel, report) = mapper.proc(&input).unwrap();
        assert!(!report.demo_active);
        assert_eq!(vel, ChassisVelocity::zero());
    }
}

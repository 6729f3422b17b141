//! Implementations for the DriveEst state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    ChassisVelocity, DriveEstError, DriveHardware, Params, Pose2d, SimDrive,
    NUM_DRV_MODULES};
use util::{
    params,
    module::State,
    session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive estimator module state
pub struct DriveEstimator {

    params: Params,

    backend: DriveBackend,

    pose: Pose2d,

    velocity_rr: ChassisVelocity,

    module_speeds_ms: [f64; NUM_DRV_MODULES],

    report: StatusReport,
}

/// Data required to initialise DriveEst.
pub struct InitData {
    /// Name of the parameter file to load, relative to the params directory.
    pub params_file: &'static str,

    /// The physical drivetrain backend, if one is attached. `None` selects the kinematic
    /// simulation backend.
    pub hardware: Option<Box<dyn DriveHardware>>,
}

/// Input data to DriveEst.
#[derive(Default)]
pub struct InputData {
    /// The chassis velocity command for this cycle, or `None` if there is no new command.
    pub cmd: Option<ChassisVelocity>,

    /// Length of the control period being processed.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// True if the system is in an enabled operating state.
    pub enabled: bool,
}

/// Output data from DriveEst processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// The current pose estimate.
    pub pose: Pose2d,

    /// The current robot-relative velocity estimate.
    pub velocity_rr: ChassisVelocity,

    /// The current drive module speeds.
    ///
    /// Units: meters/second
    pub module_speeds_ms: [f64; NUM_DRV_MODULES],
}

/// Status report for DriveEst processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the module speeds were limited by desaturation this cycle.
    pub desaturated: bool,

    /// True if the hardware backend could not refresh this cycle and the last known state was
    /// retained.
    pub sensor_gap: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The backend providing pose, velocity and module state.
///
/// Selected once at construction and never switched at runtime. While simulated, all pose
/// mutation happens inside `SimDrive`; while physical, `SimDrive` is never invoked.
pub enum DriveBackend {
    /// A physical drivetrain is attached.
    Physical(Box<dyn DriveHardware>),

    /// No physical drivetrain, the kinematic simulation provides the state.
    Simulated(SimDrive),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveEstimator {
    fn default() -> Self {
        Self {
            params: Params::default(),
            backend: DriveBackend::Simulated(SimDrive::default()),
            pose: Pose2d::default(),
            velocity_rr: ChassisVelocity::zero(),
            module_speeds_ms: [0.0; NUM_DRV_MODULES],
            report: StatusReport::default(),
        }
    }
}

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            pose: Pose2d::default(),
            velocity_rr: ChassisVelocity::zero(),
            module_speeds_ms: [0.0; NUM_DRV_MODULES],
        }
    }
}

impl State for DriveEstimator {
    type InitData = InitData;
    type InitError = DriveEstError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = DriveEstError;

    /// Initialise the DriveEst module.
    ///
    /// Loads the geometry parameters and selects the backend. A malformed parameter file is a
    /// fatal startup error, there is no degraded mode.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params = params::load(init_data.params_file)?;

        *self = Self::with_params(params, init_data.hardware)?;

        Ok(())
    }

    /// Perform cyclic processing of the drive estimator.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            self.drive(cmd);
        }

        self.tick(input_data.dt_s, input_data.enabled);

        trace!(
            "DriveEst pose: x {:.4} m, y {:.4} m, heading {:.4} rad",
            self.pose.x_m,
            self.pose.y_m,
            self.pose.heading_rad
        );

        let output = OutputData {
            pose: self.pose,
            velocity_rr: self.velocity_rr,
            module_speeds_ms: self.module_speeds_ms,
        };

        Ok((output, self.report))
    }
}

impl DriveEstimator {

    /// Build an estimator from already-loaded parameters.
    ///
    /// The backend is selected here, once: `Some(hardware)` gives the physical backend, `None`
    /// gives the kinematic simulation.
    pub fn with_params(
        params: Params,
        hardware: Option<Box<dyn DriveHardware>>,
    ) -> Result<Self, DriveEstError> {
        validate_geometry(&params)?;

        let pose = Pose2d::new(
            params.start_pose[0],
            params.start_pose[1],
            params.start_pose[2],
        );

        let backend = match hardware {
            Some(hw) => DriveBackend::Physical(hw),
            None => DriveBackend::Simulated(SimDrive::new(&params)),
        };

        Ok(Self {
            params,
            backend,
            pose,
            velocity_rr: ChassisVelocity::zero(),
            module_speeds_ms: [0.0; NUM_DRV_MODULES],
            report: StatusReport::default(),
        })
    }

    /// Record a chassis velocity command.
    ///
    /// Physical backend: forwarded to the hardware immediately, fire-and-forget. Simulated
    /// backend: buffered for the next tick, with no immediate effect on the pose.
    pub fn drive(&mut self, cmd: ChassisVelocity) {
        match self.backend {
            DriveBackend::Physical(ref mut hw) => hw.command_velocity(&cmd),
            DriveBackend::Simulated(ref mut sim) => sim.buffer_cmd(cmd),
        }
    }

    /// Advance the state estimate by one control period.
    pub fn tick(&mut self, dt_s: f64, enabled: bool) {
        match self.backend {
            DriveBackend::Physical(ref mut hw) => match hw.refresh() {
                Some(state) => {
                    self.pose = state.pose;
                    self.velocity_rr = state.velocity_rr;
                    self.module_speeds_ms = state.module_speeds_ms;
                }
                // Transient sensor gap, retain the last known state for this cycle
                None => self.report.sensor_gap = true,
            },
            DriveBackend::Simulated(ref mut sim) => {
                self.report.desaturated = sim.tick(dt_s, enabled);
                self.pose = sim.pose();
                self.velocity_rr = sim.velocity_rr();
                self.module_speeds_ms = sim.module_speeds_ms();
            }
        }
    }

    /// The current pose estimate.
    ///
    /// Always defined: either the last physical reading or the last simulated integration,
    /// defaulting to the parameterised start pose.
    pub fn get_pose(&self) -> Pose2d {
        self.pose
    }

    /// The current robot-relative velocity estimate.
    pub fn get_robot_relative_velocity(&self) -> ChassisVelocity {
        self.velocity_rr
    }

    /// The current drive module speeds.
    pub fn get_module_speeds(&self) -> [f64; NUM_DRV_MODULES] {
        self.module_speeds_ms
    }

    /// Zero the heading component of the pose, preserving the translation.
    pub fn reset_heading(&mut self) {
        match self.backend {
            DriveBackend::Physical(ref mut hw) => {
                hw.reset_heading();
                self.pose = self.pose.with_zero_heading();
            }
            DriveBackend::Simulated(ref mut sim) => {
                sim.reset_heading();
                self.pose = sim.pose();
            }
        }
    }

    /// The parameters the estimator was initialised with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// True if the kinematic simulation backend is in use.
    pub fn is_simulated(&self) -> bool {
        matches!(self.backend, DriveBackend::Simulated(_))
    }

    /// Determine whether the demonstration fallback shall drive the sentry.
    ///
    /// Demo mode is active iff the backend is simulated, the system is enabled and no input
    /// device is connected. It must never engage while physical hardware is attached and the
    /// sentry is under operator control.
    pub fn demo_active(&self, enabled: bool, device_connected: bool) -> bool {
        self.is_simulated() && enabled && !device_connected
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that the loaded geometry describes a usable drivetrain.
fn validate_geometry(params: &Params) -> Result<(), DriveEstError> {
    if !params.max_speed_ms.is_finite() || params.max_speed_ms <= 0.0 {
        return Err(DriveEstError::InvalidGeometry(format!(
            "max_speed_ms must be positive and finite, got {}",
            params.max_speed_ms
        )));
    }

    for (i, pos) in params.mod_pos_m_rb.iter().enumerate() {
        if !pos[0].is_finite() || !pos[1].is_finite() {
            return Err(DriveEstError::InvalidGeometry(format!(
                "module {} mount position is not finite: {:?}",
                i, pos
            )));
        }
    }

    Ok(())
}

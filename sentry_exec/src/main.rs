//! Main sentry-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Input device sampling
//!         - Velocity mapping
//!         - Actuator command execution
//!         - Drive estimator processing
//!         - Telemetry publication
//!
//! # Modules
//!
//! All modules (e.g. `drive_est`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!
//! With no physical drivetrain or input device attached the executable runs the demonstration
//! fallback: the kinematic simulation integrates a deterministic synthetic drive command, and a
//! short command script exercises the turret, unjam and fire state machines.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use sentry_lib::{
    act_ctrl::{ActId, CmdExecutor, CmdInput, FireCmd, IntakeSliderCmd, TurretPosCmd, UnjamCmd},
    data_store::DataStore,
    drive_est,
    input_map::{self, DisconnectedDevice, InputDevice},
    tm::{ArchiveTmSink, TmPacket, TmSink},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Report};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Duration of the run if none is given on the command line.
const DEFAULT_RUN_DURATION_S: f64 = 15.0;

/// Session time at which the demo script sets a turret target.
const DEMO_TURRET_TIME_S: f64 = 2.0;

/// Turret target used by the demo script.
///
/// Units: rotations
const DEMO_TURRET_TARGET_ROT: f64 = 0.25;

/// Session time at which the demo script interrupts the turret command. Without hardware the
/// encoder never converges, so the script exercises the interruption path instead.
const DEMO_TURRET_CANCEL_TIME_S: f64 = 5.0;

/// Session time at which the demo script runs an intake unjam.
const DEMO_UNJAM_TIME_S: f64 = 6.0;

/// Session time at which the demo script runs a fire command.
const DEMO_FIRE_TIME_S: f64 = 9.0;

/// Fire axis value fed to the fire command by the demo script.
const DEMO_FIRE_AXIS: f64 = 0.75;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "sentry_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Sentry Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- PARSE ARGUMENTS ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // An optional single argument gives the run duration in seconds
    let run_duration_s = match args.len() {
        1 => DEFAULT_RUN_DURATION_S,
        2 => args[1]
            .parse::<f64>()
            .wrap_err("Expected the run duration in seconds")?,
        _ => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}", args.len() - 1)
            )
        }
    };

    info!("Running for {:.02} s\n", run_duration_s);

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    // No physical drivetrain is attached to this executable, so DriveEst runs the kinematic
    // simulation backend. An integration build would pass the hardware box here instead.
    ds.drive_est.init(
        drive_est::InitData {
            params_file: "drive_est.toml",
            hardware: None,
        },
        &session,
    ).wrap_err("Failed to initialise DriveEst")?;
    info!(
        "DriveEst init complete (max module speed {:.02} m/s)",
        ds.drive_est.params().max_speed_ms
    );

    ds.vel_mapper.init("input_map.toml", &session)
        .wrap_err("Failed to initialise VelMap")?;
    info!("VelMap init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE COMMAND EXECUTOR ----

    let mut cmd_exec = CmdExecutor::default();

    // The intake runs the throttle slider whenever no command owns it
    cmd_exec.set_default(Box::new(IntakeSliderCmd::new()));

    // ---- INITIALISE TELEMETRY ----

    let mut tm_sink = ArchiveTmSink::new(&session)
        .wrap_err("Failed to initialise the telemetry archive")?;
    info!("Telemetry archive initialised");

    // No physical input device is attached to this executable
    let device = DisconnectedDevice;

    // Demo script bookkeeping
    let mut turret_scheduled = false;
    let mut turret_cancelled = false;
    let mut unjam_scheduled = false;
    let mut fire_scheduled = false;

    let mut last_reset_pressed = false;

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ, util::session::get_elapsed_seconds());

        // ---- INPUT SAMPLING ----

        ds.enabled = true;
        ds.device_connected = device.connected();
        ds.demo_active = ds.drive_est.demo_active(ds.enabled, ds.device_connected);

        // Heading reset on the button's rising edge, only while a device is attached
        let reset_pressed = ds.device_connected && device.reset_heading_pressed();
        if reset_pressed && !last_reset_pressed {
            ds.drive_est.reset_heading();
            info!("Heading reset");
        }
        last_reset_pressed = reset_pressed;

        ds.vel_map_input = input_map::InputData {
            raw: if ds.device_connected {
                Some(device.axes())
            } else {
                None
            },
            demo_active: ds.demo_active,
            time_s: ds.time_s,
        };

        match ds.vel_mapper.proc(&ds.vel_map_input) {
            Ok((o, r)) => {
                ds.vel_map_output = o;
                ds.vel_map_status_rpt = r;
            }
            Err(e) => {
                // A bad axis sample just means this cycle's command is dropped, so warn and
                // carry on with the zero command left by cycle_start
                warn!("Error during VelMap processing: {}", e)
            }
        };

        // ---- COMMAND PROCESSING ----

        ds.cmd_input = CmdInput {
            time_s: ds.time_s,
            fire_axis: if ds.demo_active {
                DEMO_FIRE_AXIS
            } else {
                device.fire_axis()
            },
            trigger_held: device.trigger_held(),
            throttle_axis: device.throttle_axis(),
            // No turret encoder without hardware
            turret_pos_rot: 0.0,
        };

        if ds.demo_active {
            if !turret_scheduled && ds.time_s >= DEMO_TURRET_TIME_S {
                info!("Demo script: turret to {:.02} rot", DEMO_TURRET_TARGET_ROT);
                cmd_exec.schedule(
                    Box::new(TurretPosCmd::new(DEMO_TURRET_TARGET_ROT)),
                    &ds.cmd_input,
                    &mut ds.act_dems,
                );
                turret_scheduled = true;
            }

            if turret_scheduled && !turret_cancelled && ds.time_s >= DEMO_TURRET_CANCEL_TIME_S {
                info!("Demo script: interrupting turret command");
                cmd_exec.cancel(ActId::Turret, &mut ds.act_dems);
                turret_cancelled = true;
            }

            if !unjam_scheduled && ds.time_s >= DEMO_UNJAM_TIME_S {
                info!("Demo script: unjamming intake");
                cmd_exec.schedule(Box::new(UnjamCmd::new()), &ds.cmd_input, &mut ds.act_dems);
                unjam_scheduled = true;
            }

            if !fire_scheduled && ds.time_s >= DEMO_FIRE_TIME_S {
                info!("Demo script: firing");
                cmd_exec.schedule(Box::new(FireCmd::new()), &ds.cmd_input, &mut ds.act_dems);
                fire_scheduled = true;
            }
        }

        cmd_exec.run_cycle(&ds.cmd_input, &mut ds.act_dems);

        // ---- DRIVE ESTIMATOR PROCESSING ----

        ds.drive_est_input = drive_est::InputData {
            cmd: Some(ds.vel_map_output),
            dt_s: CYCLE_PERIOD_S,
            enabled: ds.enabled,
        };

        match ds.drive_est.proc(&ds.drive_est_input) {
            Ok((o, r)) => {
                ds.drive_est_output = o;
                ds.drive_est_status_rpt = r;
            }
            Err(e) => {
                warn!("Error during DriveEst processing: {}", e)
            }
        };

        // ---- TELEMETRY ----

        let packet = TmPacket::from_datastore(&ds);

        match tm_sink.publish(&packet) {
            Ok(_) => (),
            Err(e) => warn!("Telemetry publication error: {}", e)
        };

        if ds.is_1_hz_cycle {
            info!(
                "Pose: x {:.03} m, y {:.03} m, heading {:.03} rad",
                packet.pose_x_m, packet.pose_y_m, packet.heading_rad
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;

        if ds.time_s >= run_duration_s {
            info!("Run duration reached, stopping");
            break;
        }
    }

    // ---- SHUTDOWN ----

    // Save the final telemetry snapshot for post-run inspection
    session.save("final_tm.json", TmPacket::from_datastore(&ds));

    info!("End of execution");

    session.exit();

    Ok(())
}

//! Actuator command interface and demands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// IDs of all actuators available to the command state machines.
#[derive(Serialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    Fire,
    Intake,
    Turret,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Demands produced by the actuator commands, consumed by the external motor drivers.
#[derive(Serialize, Debug, Clone)]
pub struct ActDems {
    /// Normalised speed demand per actuator, between -1 and +1.
    pub speed_norm: HashMap<ActId, f64>,

    /// Closed-loop position demand per actuator.
    ///
    /// An absent entry means the actuator's own controller keeps its last reference, which is
    /// how a position demand persists after the commanding state machine has exited.
    ///
    /// Units: rotations
    pub pos_rot: HashMap<ActId, f64>,
}

/// Input data sampled once per cycle and shared read-only by all commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct CmdInput {
    /// Time since the start of the session, sampled once at the start of the cycle.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Raw axis sample controlling the fire speed, between -1 and +1.
    pub fire_axis: f64,

    /// True while the operator holds the fire trigger.
    pub trigger_held: bool,

    /// Raw throttle axis sample driving the intake slider, between -1 and +1.
    pub throttle_axis: f64,

    /// Measured turret position from the encoder.
    ///
    /// Units: rotations
    pub turret_pos_rot: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A command state machine which exclusively owns one actuator for its lifetime.
///
/// Lifecycle: `start` once when scheduled, then `step` followed by `is_done` every cycle, then
/// `stop` exactly once, with `interrupted` set when an external interruption ended the command
/// before its completion condition was met.
///
/// At most one command writes to a given actuator per cycle. The executor's per-actuator slots
/// guarantee this, the commands themselves never defend against a violation.
pub trait ActCommand {
    /// The actuator this command writes to.
    fn act_id(&self) -> ActId;

    /// Called once when the command is scheduled.
    fn start(&mut self, input: &CmdInput, dems: &mut ActDems);

    /// Called every cycle while the command is running.
    fn step(&mut self, input: &CmdInput, dems: &mut ActDems);

    /// True when the command's completion condition is met.
    fn is_done(&self, input: &CmdInput) -> bool;

    /// Called exactly once when the command ends, normally or by interruption.
    ///
    /// Every command must leave its actuator in a safe state here. The only exception is the
    /// turret position command, which deliberately preserves its position reference.
    fn stop(&mut self, interrupted: bool, dems: &mut ActDems);
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ActDems {
    fn default() -> Self {
        let mut speed_norm = HashMap::new();

        // Speed-controlled actuators default to stopped each cycle
        speed_norm.insert(ActId::Fire, 0.0);
        speed_norm.insert(ActId::Intake, 0.0);

        Self {
            speed_norm,
            pos_rot: HashMap::new(),
        }
    }
}

impl ActDems {
    /// Set the normalised speed demand for an actuator.
    pub fn set_speed(&mut self, id: ActId, speed_norm: f64) {
        self.speed_norm.insert(id, speed_norm);
    }

    /// Get the normalised speed demand for an actuator.
    pub fn speed(&self, id: ActId) -> Option<f64> {
        self.speed_norm.get(&id).copied()
    }

    /// Set the closed-loop position demand for an actuator.
    pub fn set_pos(&mut self, id: ActId, pos_rot: f64) {
        self.pos_rot.insert(id, pos_rot);
    }

    /// Get the closed-loop position demand for an actuator.
    pub fn pos(&self, id: ActId) -> Option<f64> {
        self.pos_rot.get(&id).copied()
    }
}

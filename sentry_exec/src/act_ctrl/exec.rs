//! Command executor
//!
//! Holds one slot per actuator and drives the command lifecycle each cycle. The slots are what
//! guarantee the single-writer-per-actuator rule: an actuator's demand is only ever written by
//! the slot's active command, or by its default behaviour when the slot is idle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::collections::HashMap;

// Internal
use super::{ActCommand, ActDems, ActId, CmdInput};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Fixed slot execution order, keeps cycles deterministic.
const SLOT_ORDER: [ActId; 3] = [ActId::Fire, ActId::Intake, ActId::Turret];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-actuator command slots.
#[derive(Default)]
pub struct CmdExecutor {
    slots: HashMap<ActId, Slot>,
}

#[derive(Default)]
struct Slot {
    active: Option<Box<dyn ActCommand>>,

    default: Option<Box<dyn ActCommand>>,

    /// True once the default behaviour's `start` has run for the current idle period.
    default_started: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdExecutor {
    /// Install the default behaviour for an actuator, run whenever no command owns it.
    pub fn set_default(&mut self, cmd: Box<dyn ActCommand>) {
        let slot = self.slots.entry(cmd.act_id()).or_default();
        slot.default = Some(cmd);
        slot.default_started = false;
    }

    /// Schedule a command on its actuator's slot.
    ///
    /// If another command currently owns the slot it is stopped with `interrupted = true`
    /// before the newcomer starts, within the same cycle. The released default behaviour will
    /// be restarted when the slot next goes idle.
    pub fn schedule(
        &mut self,
        mut cmd: Box<dyn ActCommand>,
        input: &CmdInput,
        dems: &mut ActDems,
    ) {
        let id = cmd.act_id();
        let slot = self.slots.entry(id).or_default();

        if let Some(mut incumbent) = slot.active.take() {
            incumbent.stop(true, dems);
            info!("{:?} command interrupted", id);
        }

        cmd.start(input, dems);
        slot.active = Some(cmd);
        slot.default_started = false;
    }

    /// Interrupt the active command on an actuator, if any.
    pub fn cancel(&mut self, id: ActId, dems: &mut ActDems) {
        if let Some(slot) = self.slots.get_mut(&id) {
            if let Some(mut cmd) = slot.active.take() {
                cmd.stop(true, dems);
                info!("{:?} command interrupted", id);
            }
        }
    }

    /// True if a command (not a default behaviour) owns the actuator.
    pub fn is_active(&self, id: ActId) -> bool {
        self.slots
            .get(&id)
            .map(|s| s.active.is_some())
            .unwrap_or(false)
    }

    /// Run one cycle over all slots in the fixed order.
    ///
    /// Each active command is stepped and then polled for completion; a finished command is
    /// stopped in the same cycle. Idle slots run their default behaviour instead.
    pub fn run_cycle(&mut self, input: &CmdInput, dems: &mut ActDems) {
        for id in SLOT_ORDER.iter() {
            let slot = match self.slots.get_mut(id) {
                Some(s) => s,
                None => continue,
            };

            let finished = match slot.active.as_mut() {
                Some(cmd) => {
                    cmd.step(input, dems);
                    cmd.is_done(input)
                }
                None => false,
            };

            if finished {
                if let Some(mut cmd) = slot.active.take() {
                    cmd.stop(false, dems);
                    info!("{:?} command complete", id);
                }
            }
            else if slot.active.is_none() {
                if let Some(default) = slot.default.as_mut() {
                    if !slot.default_started {
                        default.start(input, dems);
                        slot.default_started = true;
                    }

                    default.step(input, dems);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::act_ctrl::{IntakeSliderCmd, UnjamCmd, UNJAM_SPEED_NORM};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Command recording its lifecycle events for inspection.
    struct ProbeCmd {
        id: ActId,
        events: Rc<RefCell<Vec<String>>>,
        tag: &'static str,
        done: bool,
    }

    impl ProbeCmd {
        fn new(id: ActId, tag: &'static str, events: Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                id,
                events,
                tag,
                done: false,
            }
        }
    }

    impl ActCommand for ProbeCmd {
        fn act_id(&self) -> ActId {
            self.id
        }

        fn start(&mut self, _input: &CmdInput, _dems: &mut ActDems) {
            self.events.borrow_mut().push(format!("{}:start", self.tag));
        }

        fn step(&mut self, _input: &CmdInput, _dems: &mut ActDems) {
            self.events.borrow_mut().push(format!("{}:step", self.tag));
        }

        fn is_done(&self, _input: &CmdInput) -> bool {
            self.done
        }

        fn stop(&mut self, interrupted: bool, _dems: &mut ActDems) {
            self.events
                .borrow_mut()
                .push(format!("{}:stop({})", self.tag, interrupted));
        }
    }

    #[test]
    fn test_interruption_stops_incumbent_before_newcomer_starts() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut exec = CmdExecutor::default();
        let mut dems = ActDems::default();
        let input = CmdInput::default();

        exec.schedule(
            Box::new(ProbeCmd::new(ActId::Fire, "a", events.clone())),
            &input,
            &mut dems,
        );
        exec.schedule(
            Box::new(ProbeCmd::new(ActId::Fire, "b", events.clone())),
            &input,
            &mut dems,
        );

        assert_eq!(
            *events.borrow(),
            vec!["a:start", "a:stop(true)", "b:start"]
        );
    }

    #[test]
    fn test_unjam_overrides_slider_then_returns_control() {
        let mut exec = CmdExecutor::default();
        let mut dems = ActDems::default();

        exec.set_default(Box::new(IntakeSliderCmd::new()));

        // Full throttle: the slider demands full intake speed
        let input = CmdInput {
            time_s: 0.0,
            throttle_axis: 1.0,
            ..CmdInput::default()
        };
        exec.run_cycle(&input, &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 1.0);

        // Unjam takes the slot: the slider is not stepped and the demand is reverse
        exec.schedule(Box::new(UnjamCmd::new()), &input, &mut dems);
        dems = ActDems::default();
        exec.run_cycle(&input, &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), UNJAM_SPEED_NORM);
        assert!(exec.is_active(ActId::Intake));

        // After the unjam duration the command stops with a zero demand, in the same cycle
        let input_late = CmdInput {
            time_s: 2.5,
            throttle_axis: 1.0,
            ..CmdInput::default()
        };
        dems = ActDems::default();
        exec.run_cycle(&input_late, &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 0.0);
        assert!(!exec.is_active(ActId::Intake));

        // Next cycle the slider is back in control
        dems = ActDems::default();
        exec.run_cycle(&input_late, &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 1.0);
    }

    #[test]
    fn test_cancel_interrupts_active_command() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut exec = CmdExecutor::default();
        let mut dems = ActDems::default();
        let input = CmdInput::default();

        exec.schedule(
            Box::new(ProbeCmd::new(ActId::Turret, "t", events.clone())),
            &input,
            &mut dems,
        );
        assert!(exec.is_active(ActId::Turret));

        exec.cancel(ActId::Turret, &mut dems);
        assert!(!exec.is_active(ActId::Turret));
        assert_eq!(*events.borrow(), vec!["t:start", "t:stop(true)"]);
    }

    #[test]
    fn test_finished_command_stopped_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut exec = CmdExecutor::default();
        let mut dems = ActDems::default();
        let input = CmdInput::default();

        let mut cmd = ProbeCmd::new(ActId::Fire, "f", events.clone());
        cmd.done = true;

        exec.schedule(Box::new(cmd), &input, &mut dems);
        exec.run_cycle(&input, &mut dems);
        exec.run_cycle(&input, &mut dems);

        assert_eq!(*events.borrow(), vec!["f:start", "f:step", "f:stop(false)"]);
    }
}

//! Intake unjam command state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ActCommand, ActDems, ActId, CmdInput, UNJAM_DURATION_S, UNJAM_SPEED_NORM};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Timed-reverse command for the intake actuator.
///
/// Forces the intake into full reverse for a fixed duration to clear a jam, overriding the
/// throttle-driven slider behaviour for as long as it runs.
pub struct UnjamCmd {
    start_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl UnjamCmd {
    pub fn new() -> Self {
        Self { start_time_s: 0.0 }
    }
}

impl Default for UnjamCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl ActCommand for UnjamCmd {
    fn act_id(&self) -> ActId {
        ActId::Intake
    }

    fn start(&mut self, input: &CmdInput, _dems: &mut ActDems) {
        self.start_time_s = input.time_s;
    }

    fn step(&mut self, _input: &CmdInput, dems: &mut ActDems) {
        // Reverse regardless of the throttle position
        dems.set_speed(ActId::Intake, UNJAM_SPEED_NORM);
    }

    fn is_done(&self, input: &CmdInput) -> bool {
        input.time_s - self.start_time_s >= UNJAM_DURATION_S
    }

    fn stop(&mut self, _interrupted: bool, dems: &mut ActDems) {
        dems.set_speed(ActId::Intake, 0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_forces_reverse_regardless_of_throttle() {
        let mut cmd = UnjamCmd::new();
        let mut dems = ActDems::default();

        let input = CmdInput {
            time_s: 0.0,
            throttle_axis: 1.0,
            ..CmdInput::default()
        };

        cmd.start(&input, &mut dems);
        cmd.step(&input, &mut dems);

        assert_eq!(dems.speed(ActId::Intake).unwrap(), UNJAM_SPEED_NORM);
    }

    #[test]
    fn test_finishes_after_duration() {
        let mut cmd = UnjamCmd::new();
        let mut dems = ActDems::default();

        let start = CmdInput { time_s: 1.0, ..CmdInput::default() };
        cmd.start(&start, &mut dems);

        assert!(!cmd.is_done(&CmdInput { time_s: 2.9, ..CmdInput::default() }));
        assert!(cmd.is_done(&CmdInput { time_s: 3.0, ..CmdInput::default() }));
    }

    #[test]
    fn test_stop_zeroes_intake() {
        let mut cmd = UnjamCmd::new();
        let mut dems = ActDems::default();

        cmd.start(&CmdInput::default(), &mut dems);
        cmd.step(&CmdInput::default(), &mut dems);
        cmd.stop(false, &mut dems);

        assert_eq!(dems.speed(ActId::Intake).unwrap(), 0.0);
    }
}

//! Fire command state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ActCommand, ActDems, ActId, CmdInput, FIRE_DEADBAND, FIRE_MIN_DURATION_S};
use util::maths::{apply_deadband, clamp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Bounded-hold command for the fire actuator.
///
/// Runs for at least the minimum fire duration, then continues for as long as the trigger is
/// held. The speed is taken from the magnitude of the fire axis, deadbanded and clamped into
/// [0, 1], so the sign of the axis never reverses the mechanism.
pub struct FireCmd {
    start_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FireCmd {
    pub fn new() -> Self {
        Self { start_time_s: 0.0 }
    }
}

impl Default for FireCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl ActCommand for FireCmd {
    fn act_id(&self) -> ActId {
        ActId::Fire
    }

    fn start(&mut self, input: &CmdInput, _dems: &mut ActDems) {
        self.start_time_s = input.time_s;
    }

    fn step(&mut self, input: &CmdInput, dems: &mut ActDems) {
        let speed_norm = clamp(
            &apply_deadband(input.fire_axis.abs(), FIRE_DEADBAND),
            &0.0,
            &1.0,
        );

        dems.set_speed(ActId::Fire, speed_norm);
    }

    fn is_done(&self, input: &CmdInput) -> bool {
        let minimum_time_met = input.time_s - self.start_time_s >= FIRE_MIN_DURATION_S;

        minimum_time_met && !input.trigger_held
    }

    fn stop(&mut self, _interrupted: bool, dems: &mut ActDems) {
        // The fire actuator must never be left running past command end, interrupted or not
        dems.set_speed(ActId::Fire, 0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input_at(time_s: f64, fire_axis: f64, trigger_held: bool) -> CmdInput {
        CmdInput {
            time_s,
            fire_axis,
            trigger_held,
            ..CmdInput::default()
        }
    }

    #[test]
    fn test_not_done_before_minimum_time() {
        let mut cmd = FireCmd::new();
        let mut dems = ActDems::default();

        cmd.start(&input_at(0.0, 0.5, true), &mut dems);

        // Before 2.0 s the command never finishes, held or not
        assert!(!cmd.is_done(&input_at(1.9, 0.5, true)));
        assert!(!cmd.is_done(&input_at(1.9, 0.5, false)));
    }

    #[test]
    fn test_done_after_minimum_time_iff_released() {
        let mut cmd = FireCmd::new();
        let mut dems = ActDems::default();

        cmd.start(&input_at(0.0, 0.5, true), &mut dems);

        assert!(!cmd.is_done(&input_at(2.1, 0.5, true)));
        assert!(cmd.is_done(&input_at(2.1, 0.5, false)));
    }

    #[test]
    fn test_speed_deadbanded_and_sign_discarded() {
        let mut cmd = FireCmd::new();
        let mut dems = ActDems::default();

        cmd.start(&input_at(0.0, 0.0, true), &mut dems);

        cmd.step(&input_at(0.1, -0.55, true), &mut dems);
        assert!((dems.speed(ActId::Fire).unwrap() - 0.5).abs() < 1e-12);

        cmd.step(&input_at(0.2, 0.05, true), &mut dems);
        assert_eq!(dems.speed(ActId::Fire).unwrap(), 0.0);
    }

    #[test]
    fn test_stop_zeroes_even_when_interrupted() {
        let mut cmd = FireCmd::new();
        let mut dems = ActDems::default();

        cmd.start(&input_at(0.0, 1.0, true), &mut dems);
        cmd.step(&input_at(0.1, 1.0, true), &mut dems);
        assert!(dems.speed(ActId::Fire).unwrap() > 0.0);

        cmd.stop(true, &mut dems);
        assert_eq!(dems.speed(ActId::Fire).unwrap(), 0.0);
    }
}

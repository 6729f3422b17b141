//! Intake slider default behaviour

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ActCommand, ActDems, ActId, CmdInput};
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Default command for the intake actuator.
///
/// Maps the raw throttle axis from [-1, 1] onto a [0, 1] intake speed, so the slider acts as a
/// continuously variable speed control. Never finishes by itself; it runs whenever no other
/// command owns the intake.
pub struct IntakeSliderCmd;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl IntakeSliderCmd {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IntakeSliderCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl ActCommand for IntakeSliderCmd {
    fn act_id(&self) -> ActId {
        ActId::Intake
    }

    fn start(&mut self, _input: &CmdInput, _dems: &mut ActDems) {}

    fn step(&mut self, input: &CmdInput, dems: &mut ActDems) {
        // Clamp after mapping so slight noise past the end stops cannot push the demand out of range
        let speed_norm = clamp(
            &lin_map((-1.0, 1.0), (0.0, 1.0), input.throttle_axis),
            &0.0,
            &1.0,
        );

        dems.set_speed(ActId::Intake, speed_norm);
    }

    fn is_done(&self, _input: &CmdInput) -> bool {
        // A default behaviour never finishes by itself
        false
    }

    fn stop(&mut self, _interrupted: bool, dems: &mut ActDems) {
        dems.set_speed(ActId::Intake, 0.0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input_at_throttle(throttle_axis: f64) -> CmdInput {
        CmdInput {
            throttle_axis,
            ..CmdInput::default()
        }
    }

    #[test]
    fn test_throttle_mapped_to_unit_range() {
        let mut cmd = IntakeSliderCmd::new();
        let mut dems = ActDems::default();

        cmd.step(&input_at_throttle(-1.0), &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 0.0);

        cmd.step(&input_at_throttle(0.0), &mut dems);
        assert!((dems.speed(ActId::Intake).unwrap() - 0.5).abs() < 1e-12);

        cmd.step(&input_at_throttle(1.0), &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 1.0);
    }

    #[test]
    fn test_noisy_throttle_clamped() {
        let mut cmd = IntakeSliderCmd::new();
        let mut dems = ActDems::default();

        cmd.step(&input_at_throttle(1.02), &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 1.0);

        cmd.step(&input_at_throttle(-1.02), &mut dems);
        assert_eq!(dems.speed(ActId::Intake).unwrap(), 0.0);
    }

    #[test]
    fn test_never_finishes() {
        let cmd = IntakeSliderCmd::new();
        assert!(!cmd.is_done(&CmdInput::default()));
    }
}

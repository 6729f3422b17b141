//! Turret positioning command state machine

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ActCommand, ActDems, ActId, CmdInput, TURRET_POS_TOL_ROT};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tolerance-converge command for the turret actuator.
///
/// Pushes a target position to the turret's own closed-loop controller and finishes once the
/// measured position is within tolerance. The convergence itself is performed by the external
/// controller, this command only asserts the reference and watches the encoder.
pub struct TurretPosCmd {
    target_rot: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurretPosCmd {
    pub fn new(target_rot: f64) -> Self {
        Self { target_rot }
    }
}

impl ActCommand for TurretPosCmd {
    fn act_id(&self) -> ActId {
        ActId::Turret
    }

    fn start(&mut self, _input: &CmdInput, dems: &mut ActDems) {
        dems.set_pos(ActId::Turret, self.target_rot);
    }

    fn step(&mut self, _input: &CmdInput, dems: &mut ActDems) {
        // Re-assert the reference each cycle in case the controller was reset under us
        dems.set_pos(ActId::Turret, self.target_rot);
    }

    fn is_done(&self, input: &CmdInput) -> bool {
        (input.turret_pos_rot - self.target_rot).abs() <= TURRET_POS_TOL_ROT
    }

    fn stop(&mut self, _interrupted: bool, _dems: &mut ActDems) {
        // Deliberately no safe-stop here: the position reference is left with the turret's
        // closed-loop controller so holding torque keeps the mechanism on target after the
        // command exits. This is a documented exception to the zero-on-stop rule the other
        // commands follow.
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn input_at_pos(turret_pos_rot: f64) -> CmdInput {
        CmdInput {
            turret_pos_rot,
            ..CmdInput::default()
        }
    }

    #[test]
    fn test_done_iff_within_tolerance() {
        let cmd = TurretPosCmd::new(0.0);

        assert!(cmd.is_done(&input_at_pos(0.0)));
        assert!(cmd.is_done(&input_at_pos(0.05)));
        assert!(cmd.is_done(&input_at_pos(-0.05)));
        assert!(!cmd.is_done(&input_at_pos(0.0501)));
        assert!(!cmd.is_done(&input_at_pos(-0.0501)));
    }

    #[test]
    fn test_reference_asserted_each_cycle() {
        let mut cmd = TurretPosCmd::new(0.25);
        let mut dems = ActDems::default();

        cmd.start(&input_at_pos(0.0), &mut dems);
        assert_eq!(dems.pos(ActId::Turret).unwrap(), 0.25);

        dems.pos_rot.clear();
        cmd.step(&input_at_pos(0.1), &mut dems);
        assert_eq!(dems.pos(ActId::Turret).unwrap(), 0.25);
    }

    #[test]
    fn test_stop_preserves_position_reference() {
        let mut cmd = TurretPosCmd::new(0.25);
        let mut dems = ActDems::default();

        cmd.start(&input_at_pos(0.0), &mut dems);
        cmd.step(&input_at_pos(0.1), &mut dems);
        cmd.stop(false, &mut dems);

        // The reference stays with the controller and no speed demand is written
        assert_eq!(dems.pos(ActId::Turret).unwrap(), 0.25);
        assert!(dems.speed(ActId::Turret).is_none());
    }
}

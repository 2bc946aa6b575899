use super::offset::{OffsetController, OffsetState, StepDirection};

const DIRECTIONS: [StepDirection; 4] = [
    StepDirection::Left,
    StepDirection::Right,
    StepDirection::Up,
    StepDirection::Down,
];

/// Owns the set of currently-active pan directions, fed by discrete
/// press/release events. Directions are independent, not mutually exclusive:
/// two active axes applied in the same tick give diagonal movement.
pub struct InputController {
    active: [bool; 4],
}

impl Default for InputController {
    fn default() -> Self {
        InputController::new()
    }
}

impl InputController {
    pub fn new() -> Self {
        InputController { active: [false; 4] }
    }

    pub fn press(&mut self, direction: StepDirection) {
        self.active[slot(direction)] = true;
    }

    pub fn release(&mut self, direction: StepDirection) {
        self.active[slot(direction)] = false;
    }

    pub fn is_active(&self, direction: StepDirection) -> bool {
        self.active[slot(direction)]
    }

    /// Apply one step per active direction; called once per frame tick
    pub fn apply_active(&self, offset_controller: &mut OffsetController) -> OffsetState {
        for direction in DIRECTIONS {
            if self.is_active(direction) {
                offset_controller.apply_step(direction);
            }
        }
        offset_controller.state()
    }
}

fn slot(direction: StepDirection) -> usize {
    match direction {
        StepDirection::Left => 0,
        StepDirection::Right => 1,
        StepDirection::Up => 2,
        StepDirection::Down => 3,
    }
}

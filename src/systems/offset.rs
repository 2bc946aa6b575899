use serde::{Deserialize, Serialize};

/// Screen-space pan offset for the local overlay, in pixels. `right` grows
/// towards the right edge, `up` towards the top.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OffsetState {
    pub right: i32,
    pub up: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Left,
    Right,
    Up,
    Down,
}

impl StepDirection {
    /// Parse the direction field of an overlayControl message
    pub fn from_name(name: &str) -> Option<StepDirection> {
        match name {
            "left" => Some(StepDirection::Left),
            "right" => Some(StepDirection::Right),
            "up" => Some(StepDirection::Up),
            "down" => Some(StepDirection::Down),
            _ => None,
        }
    }
}

/// Holds the 2D pan offset and a fixed step size. Each step adjusts exactly
/// one axis; the offset is deliberately unclamped, so the overlay may pan
/// arbitrarily far off-frame.
pub struct OffsetController {
    state: OffsetState,
    step: i32,
}

impl OffsetController {
    pub fn new(step: i32) -> Self {
        if step == 0 {
            panic!("Offset step size must be non-zero");
        }
        OffsetController {
            state: OffsetState::default(),
            step,
        }
    }

    pub fn apply_step(&mut self, direction: StepDirection) -> OffsetState {
        match direction {
            StepDirection::Left => self.state.right -= self.step,
            StepDirection::Right => self.state.right += self.step,
            StepDirection::Up => self.state.up += self.step,
            StepDirection::Down => self.state.up -= self.step,
        }
        self.state
    }

    pub fn state(&self) -> OffsetState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_steps_restore_offset() {
        let mut controller = OffsetController::new(25);
        let before = controller.state();

        controller.apply_step(StepDirection::Left);
        controller.apply_step(StepDirection::Right);
        assert_eq!(controller.state(), before);

        controller.apply_step(StepDirection::Up);
        controller.apply_step(StepDirection::Down);
        assert_eq!(controller.state(), before);
    }

    #[test]
    fn test_steps_adjust_single_axis() {
        let mut controller = OffsetController::new(10);

        let after_right = controller.apply_step(StepDirection::Right);
        assert_eq!(after_right, OffsetState { right: 10, up: 0 });

        let after_down = controller.apply_step(StepDirection::Down);
        assert_eq!(after_down, OffsetState { right: 10, up: -10 });
    }

    #[test]
    fn test_offset_is_unclamped() {
        let mut controller = OffsetController::new(1000);
        for _ in 0..100 {
            controller.apply_step(StepDirection::Left);
        }
        assert_eq!(controller.state().right, -100_000);
    }
}

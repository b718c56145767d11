//! Push-button pairing
//!
//! Only one button may be held at a time. A press while another button is
//! held, or a release for a button that is not held, is dropped so that the
//! device always sees a clean press/release pair per button.

use crate::data::WidgetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Idle,
    Active(WidgetId),
}

/// Outcome of feeding a button event to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTransition {
    Pressed(WidgetId),
    Released(WidgetId),
    Ignored,
}

#[derive(Debug, Default)]
pub struct ButtonStateMachine {
    state: ButtonState,
}

impl ButtonStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn press(&mut self, id: WidgetId) -> ButtonTransition {
        match self.state {
            ButtonState::Idle => {
                self.state = ButtonState::Active(id);
                ButtonTransition::Pressed(id)
            }
            ButtonState::Active(_) => ButtonTransition::Ignored,
        }
    }

    pub fn release(&mut self, id: WidgetId) -> ButtonTransition {
        match self.state {
            ButtonState::Active(active) if active == id => {
                self.state = ButtonState::Idle;
                ButtonTransition::Released(id)
            }
            _ => ButtonTransition::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_pair() {
        let mut buttons = ButtonStateMachine::new();
        assert_eq!(buttons.press(3), ButtonTransition::Pressed(3));
        assert_eq!(buttons.state(), ButtonState::Active(3));
        assert_eq!(buttons.release(3), ButtonTransition::Released(3));
        assert_eq!(buttons.state(), ButtonState::Idle);
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut buttons = ButtonStateMachine::new();
        buttons.press(1);
        assert_eq!(buttons.press(2), ButtonTransition::Ignored);
        assert_eq!(buttons.press(1), ButtonTransition::Ignored);
        assert_eq!(buttons.state(), ButtonState::Active(1));
    }

    #[test]
    fn test_foreign_release_is_ignored() {
        let mut buttons = ButtonStateMachine::new();
        assert_eq!(buttons.release(1), ButtonTransition::Ignored);

        buttons.press(1);
        assert_eq!(buttons.release(2), ButtonTransition::Ignored);
        assert_eq!(buttons.state(), ButtonState::Active(1));
    }
}

use serde::{Deserialize, Serialize};

use crate::buttons::ButtonState;

/// Outbound controller command for one tick, consumed by the emulator
/// bridge. Constructed fresh each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub player1_buttons: ButtonState,
    pub player2_buttons: ButtonState,
}

impl Command {
    pub fn neutral() -> Self {
        Self::default()
    }
}

/// Pure aggregation of both players' final button states; validity of the
/// inputs is guaranteed upstream and not re-checked here.
pub fn build_command(player1: &ButtonState, player2: &ButtonState) -> Command {
    Command {
        player1_buttons: *player1,
        player2_buttons: *player2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::Button;

    #[test]
    fn build_copies_both_sides() {
        let mut p1 = ButtonState::neutral();
        p1.set(Button::Down, true);
        let p2 = ButtonState::neutral();

        let command = build_command(&p1, &p2);
        assert!(command.player1_buttons.down);
        assert!(command.player2_buttons.is_neutral());
    }

    #[test]
    fn all_false_states_build_a_valid_command() {
        let command = build_command(&ButtonState::neutral(), &ButtonState::neutral());
        assert_eq!(command, Command::neutral());
    }

    #[test]
    fn command_json_roundtrips() {
        let mut p1 = ButtonState::neutral();
        p1.set(Button::Y, true);
        let command = build_command(&p1, &ButtonState::neutral());

        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}

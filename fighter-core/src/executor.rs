use crate::buttons::{Button, ButtonState};
use crate::token::{CompiledMacro, MacroToken};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorState {
    Idle,
    Running,
    /// Transient: observed once by the arbiter, then settled back to `Idle`.
    Completed,
    /// Transient: runtime fault; buttons keep their last valid value.
    Error,
}

/// Per-player progress marker through an in-flight macro. Exclusively owned
/// by that player's session; never shared across players.
#[derive(Clone, Debug)]
pub struct ExecutionCursor {
    active: Option<CompiledMacro>,
    position: usize,
    state: CursorState,
}

impl Default for ExecutionCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionCursor {
    pub fn new() -> Self {
        Self {
            active: None,
            position: 0,
            state: CursorState::Idle,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn active_macro(&self) -> Option<&str> {
        self.active.as_ref().map(CompiledMacro::name)
    }

    /// Arms the cursor with a compiled macro. Every button NOT referenced by
    /// the first token resets to false so the sequence always begins from a
    /// known baseline; referenced buttons are written by the first
    /// `advance`. Does not consume a tick.
    pub fn start(&mut self, compiled: &CompiledMacro, buttons: &mut ButtonState) {
        let first = compiled.token(0).map(MacroToken::buttons).unwrap_or(&[]);
        for button in Button::ALL {
            if !first.contains(&button) {
                buttons.set(button, false);
            }
        }
        self.active = Some(compiled.clone());
        self.position = 0;
        self.state = CursorState::Running;
    }

    /// Executes exactly one tick of the active macro: applies the current
    /// token's edges and moves the position forward. Only buttons named by
    /// the token are written; everything else keeps its prior value.
    pub fn advance(&mut self, buttons: &mut ButtonState) -> CursorState {
        if self.state != CursorState::Running {
            return self.state;
        }

        let token = match self.active.as_ref().and_then(|m| m.token(self.position)) {
            Some(token) => token.clone(),
            None => {
                // Position ran past the compiled sequence: a runtime fault.
                // Leave the buttons untouched.
                self.state = CursorState::Error;
                return self.state;
            }
        };

        match &token {
            MacroToken::Press(pressed) => {
                for button in pressed {
                    buttons.set(*button, true);
                }
            }
            MacroToken::Release(released) => {
                for button in released {
                    buttons.set(*button, false);
                }
            }
            MacroToken::Hold => {}
        }

        self.position += 1;
        let len = self.active.as_ref().map(CompiledMacro::len).unwrap_or(0);
        if self.position == len {
            self.state = CursorState::Completed;
        }
        self.state
    }

    /// Settles a transient `Completed`/`Error` state back to `Idle` so the
    /// next tick can take a fresh decision.
    pub fn settle(&mut self) {
        if matches!(self.state, CursorState::Completed | CursorState::Error) {
            self.active = None;
            self.position = 0;
            self.state = CursorState::Idle;
        }
    }

    /// Drops an in-flight macro without running its remaining tokens.
    pub fn abort(&mut self) {
        self.active = None;
        self.position = 0;
        self.state = CursorState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::compile;

    fn charge_macro() -> CompiledMacro {
        compile("charge", &["v+<", "-", "!v+!<"]).unwrap()
    }

    #[test]
    fn scenario_down_back_charge_from_neutral() {
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        cursor.start(&charge_macro(), &mut buttons);

        // Tick 1: down+left pressed, all else false.
        assert_eq!(cursor.advance(&mut buttons), CursorState::Running);
        assert!(buttons.down && buttons.left);
        assert_eq!(buttons.pressed_count(), 2);

        // Tick 2: hold, unchanged.
        assert_eq!(cursor.advance(&mut buttons), CursorState::Running);
        assert!(buttons.down && buttons.left);
        assert_eq!(buttons.pressed_count(), 2);

        // Tick 3: both released, macro completed.
        assert_eq!(cursor.advance(&mut buttons), CursorState::Completed);
        assert!(buttons.is_neutral());

        cursor.settle();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.active_macro(), None);
    }

    #[test]
    fn completes_after_exactly_n_advances() {
        let compiled = compile(
            "long",
            &[">", "-", "!>", "v+>", "-", "!v+!>", "v", "-", "!v"],
        )
        .unwrap();
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        cursor.start(&compiled, &mut buttons);

        for tick in 1..compiled.len() {
            assert_eq!(cursor.advance(&mut buttons), CursorState::Running, "tick {tick}");
        }
        assert_eq!(cursor.advance(&mut buttons), CursorState::Completed);
    }

    #[test]
    fn start_resets_only_unreferenced_buttons() {
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        buttons.set(Button::Down, true);
        buttons.set(Button::Y, true);

        cursor.start(&charge_macro(), &mut buttons);
        // Down is named by the first token and keeps its value until the
        // first advance; Y is not and resets.
        assert!(buttons.down);
        assert!(!buttons.y);
    }

    #[test]
    fn partial_write_keeps_unnamed_buttons_across_ticks() {
        let compiled = compile("build-up", &["v", "<", "Y", "!v+!<+!Y"]).unwrap();
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        cursor.start(&compiled, &mut buttons);

        cursor.advance(&mut buttons);
        assert!(buttons.down);
        cursor.advance(&mut buttons);
        assert!(buttons.down && buttons.left, "down must survive the left press");
        cursor.advance(&mut buttons);
        assert!(buttons.down && buttons.left && buttons.y);
        assert_eq!(cursor.advance(&mut buttons), CursorState::Completed);
        assert!(buttons.is_neutral());
    }

    #[test]
    fn hold_changes_nothing() {
        let compiled = compile("pause", &["v", "-", "-"]).unwrap();
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        cursor.start(&compiled, &mut buttons);

        cursor.advance(&mut buttons);
        let after_press = buttons;
        cursor.advance(&mut buttons);
        assert_eq!(buttons, after_press);
    }

    #[test]
    fn advance_outside_running_is_a_no_op() {
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        buttons.set(Button::A, true);
        assert_eq!(cursor.advance(&mut buttons), CursorState::Idle);
        assert!(buttons.a);
    }

    #[test]
    fn runtime_fault_leaves_buttons_untouched_and_settles_to_idle() {
        let mut buttons = ButtonState::neutral();
        buttons.set(Button::Down, true);
        let mut cursor = ExecutionCursor {
            active: None,
            position: 0,
            state: CursorState::Running,
        };

        assert_eq!(cursor.advance(&mut buttons), CursorState::Error);
        assert!(buttons.down);

        cursor.settle();
        assert_eq!(cursor.state(), CursorState::Idle);
    }

    #[test]
    fn abort_drops_the_macro_mid_flight() {
        let mut cursor = ExecutionCursor::new();
        let mut buttons = ButtonState::neutral();
        cursor.start(&charge_macro(), &mut buttons);
        cursor.advance(&mut buttons);
        assert_eq!(cursor.state(), CursorState::Running);

        cursor.abort();
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.active_macro(), None);
    }
}

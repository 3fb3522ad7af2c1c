use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::buttons::{Button, ButtonState};
use crate::decision::{ActionVector, Decision, DecisionSource};
use crate::executor::{CursorState, ExecutionCursor};
use crate::library::MacroLibrary;
use crate::snapshot::{GameStateSnapshot, PlayerSide, PlayerView};

#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionStats {
    pub ticks: u64,
    pub macros_started: u64,
    pub macros_completed: u64,
    pub macros_aborted: u64,
    pub neutral_fallbacks: u64,
    pub starts_by_name: BTreeMap<String, u64>,
}

/// One player's controller driver: the exclusively-owned cursor and live
/// button state, the decision source consulted when idle, and the per-tick
/// arbitration between them. Two sessions never share mutable state, so two
/// players (or two matches) can run on separate threads without
/// coordination.
pub struct PlayerSession {
    side: PlayerSide,
    cursor: ExecutionCursor,
    buttons: ButtonState,
    source: Box<dyn DecisionSource>,
    library: Arc<MacroLibrary>,
    stats: SessionStats,
}

impl PlayerSession {
    pub fn new(side: PlayerSide, source: Box<dyn DecisionSource>, library: Arc<MacroLibrary>) -> Self {
        Self {
            side,
            cursor: ExecutionCursor::new(),
            buttons: ButtonState::neutral(),
            source,
            library,
            stats: SessionStats::default(),
        }
    }

    pub fn side(&self) -> PlayerSide {
        self.side
    }

    pub fn source_id(&self) -> &str {
        self.source.id()
    }

    pub fn buttons(&self) -> &ButtonState {
        &self.buttons
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Returns the session to its match-start state.
    pub fn reset(&mut self, seed: u32) {
        self.cursor = ExecutionCursor::new();
        self.buttons = ButtonState::neutral();
        self.stats = SessionStats::default();
        self.source.reset(seed);
    }

    /// The per-tick arbitration. Hard priority rule: while a macro is in
    /// flight the decision source is never consulted; per-tick faults never
    /// escape, they fall back to a neutral state for that tick only.
    pub fn tick(&mut self, snapshot: &GameStateSnapshot) -> &ButtonState {
        self.stats.ticks += 1;
        trace!(
            side = ?self.side,
            has_round_started = snapshot.has_round_started,
            is_round_over = snapshot.is_round_over,
            "round status"
        );

        if !snapshot.has_round_started || snapshot.is_round_over {
            if self.cursor.state() == CursorState::Running {
                debug!(side = ?self.side, "round boundary, aborting in-flight macro");
                self.cursor.abort();
                self.stats.macros_aborted += 1;
            }
            self.buttons.clear();
            return &self.buttons;
        }

        if self.cursor.state() == CursorState::Running {
            self.advance_macro();
            return &self.buttons;
        }

        let view = PlayerView {
            snapshot,
            side: self.side,
        };
        match self.source.decide(&view) {
            Ok(Decision::Action(actions)) => {
                apply_action_vector(&mut self.buttons, &actions);
            }
            Ok(Decision::Macro(name)) => {
                let library = Arc::clone(&self.library);
                match library.lookup(&name) {
                    Ok(compiled) => {
                        self.cursor.start(compiled, &mut self.buttons);
                        self.stats.macros_started += 1;
                        *self.stats.starts_by_name.entry(name.clone()).or_default() += 1;
                        debug!(side = ?self.side, name = %name, "macro started");
                        self.advance_macro();
                    }
                    Err(err) => {
                        warn!(side = ?self.side, error = %err, "macro start rejected");
                        self.buttons.clear();
                        self.stats.neutral_fallbacks += 1;
                    }
                }
            }
            Err(err) => {
                warn!(side = ?self.side, error = %err, "decision failed, neutral tick");
                self.buttons.clear();
                self.stats.neutral_fallbacks += 1;
            }
        }

        &self.buttons
    }

    fn advance_macro(&mut self) {
        match self.cursor.advance(&mut self.buttons) {
            CursorState::Completed => {
                self.stats.macros_completed += 1;
                debug!(side = ?self.side, name = ?self.cursor.active_macro(), "macro completed");
                self.cursor.settle();
            }
            CursorState::Error => {
                warn!(side = ?self.side, "macro runtime fault, buttons left at last valid value");
                self.cursor.settle();
            }
            _ => {}
        }
    }
}

fn apply_action_vector(buttons: &mut ButtonState, actions: &ActionVector) {
    for button in Button::ALL {
        buttons.set(button, actions[button.index()]);
    }
}

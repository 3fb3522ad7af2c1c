use std::time::{Duration, Instant};

use crate::buttons::BUTTON_COUNT;
use crate::error::{PredictorError, TickError};
use crate::rng::SeededRng;
use crate::snapshot::{extract_features, PlayerView};

pub const FEATURE_COUNT: usize = 13;

pub type FeatureVector = [f64; FEATURE_COUNT];
pub type ActionVector = [bool; BUTTON_COUNT];

/// What a decision source wants this tick: either a direct single-tick
/// action vector, or the name of a macro to hand to the sequencer. Never
/// both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Action(ActionVector),
    Macro(String),
}

/// Pluggable per-tick strategy, consulted only when no macro is in flight.
pub trait DecisionSource {
    fn id(&self) -> &str;

    fn reset(&mut self, _seed: u32) {}

    fn decide(&mut self, view: &PlayerView<'_>) -> Result<Decision, TickError>;
}

/// Synchronous inference over the 13-feature vector. Loading and shape of
/// the trained model are the implementor's concern, not the core's.
pub trait Predictor {
    fn predict(&self, features: &FeatureVector) -> Result<ActionVector, PredictorError>;
}

pub struct ClassifierSource {
    predictor: Box<dyn Predictor>,
    deadline: Option<Duration>,
}

impl ClassifierSource {
    pub fn new(predictor: Box<dyn Predictor>) -> Self {
        Self {
            predictor,
            deadline: None,
        }
    }

    /// Per-tick inference budget. An over-deadline call is reported as
    /// `TickError::PredictorTimeout` instead of stalling the tick loop;
    /// there is no concurrent work to cancel, only a deadline to honor.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl DecisionSource for ClassifierSource {
    fn id(&self) -> &str {
        "classifier"
    }

    fn decide(&mut self, view: &PlayerView<'_>) -> Result<Decision, TickError> {
        let features = extract_features(view.snapshot)?;
        let started = Instant::now();
        let actions = self.predictor.predict(&features)?;
        if let Some(budget) = self.deadline {
            let elapsed = started.elapsed();
            if elapsed > budget {
                return Err(TickError::PredictorTimeout {
                    elapsed_ms: elapsed.as_millis() as u64,
                    budget_ms: budget.as_millis() as u64,
                });
            }
        }
        Ok(Decision::Action(actions))
    }
}

const FAR_THRESHOLD: i32 = 60;
const OFFENSE_RIGHT: [&str; 3] = ["spin-kick-right", "leap-kick-right", "fireball-right"];
const OFFENSE_LEFT: [&str; 3] = ["spin-kick-left", "leap-kick-left", "fireball-left"];
const GUARD: &str = "crouch-guard";

/// Distance-based macro selection: at long range, one of three offensive
/// sequences facing the opponent; in close, a coin flip between stepping in
/// and guarding.
pub struct HeuristicSource {
    rng: SeededRng,
}

impl HeuristicSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SeededRng::new(seed),
        }
    }
}

impl DecisionSource for HeuristicSource {
    fn id(&self) -> &str {
        "heuristic"
    }

    fn reset(&mut self, seed: u32) {
        self.rng = SeededRng::new(seed);
    }

    fn decide(&mut self, view: &PlayerView<'_>) -> Result<Decision, TickError> {
        let distance = view.distance_x();
        let name = if distance > FAR_THRESHOLD {
            OFFENSE_RIGHT[self.rng.next_int(3) as usize]
        } else if distance < -FAR_THRESHOLD {
            OFFENSE_LEFT[self.rng.next_int(3) as usize]
        } else if self.rng.next_int(2) == 1 {
            if distance >= 0 {
                "step-right"
            } else {
                "step-left"
            }
        } else {
            GUARD
        };
        Ok(Decision::Macro(name.to_string()))
    }
}

/// Always names the same macro; the old hardcoded test strategies behind the
/// common interface.
pub struct FixedMacroSource {
    id: String,
    macro_name: String,
}

impl FixedMacroSource {
    pub fn new(macro_name: impl Into<String>) -> Self {
        let macro_name = macro_name.into();
        Self {
            id: format!("fixed-{macro_name}"),
            macro_name,
        }
    }
}

impl DecisionSource for FixedMacroSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn decide(&mut self, _view: &PlayerView<'_>) -> Result<Decision, TickError> {
        Ok(Decision::Macro(self.macro_name.clone()))
    }
}

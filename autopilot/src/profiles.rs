use std::sync::Arc;
use std::time::Duration;

use fighter_core::{
    ActionVector, Button, ClassifierSource, DecisionSource, FeatureVector, FixedMacroSource,
    HeuristicSource, MacroLibrary, PlayerSession, PlayerSide, Predictor, PredictorError,
    BUTTON_COUNT,
};

// Feature column indices, matching the trained model's layout.
const F_P1_X: usize = 2;
const F_P2_X: usize = 8;

// Inference must fit the tick budget comfortably; anything slower is treated
// as a timeout and the tick goes out neutral.
const PREDICTOR_DEADLINE: Duration = Duration::from_millis(4);

/// All-false baseline: proves the plumbing without a trained model attached.
pub struct NullPredictor;

impl Predictor for NullPredictor {
    fn predict(&self, _features: &FeatureVector) -> Result<ActionVector, PredictorError> {
        Ok([false; BUTTON_COUNT])
    }
}

/// Deterministic rule baseline standing in for the trained classifier:
/// walk toward the opponent, with a positional cadence of jumps and pokes.
pub struct RulePredictor;

impl Predictor for RulePredictor {
    fn predict(&self, features: &FeatureVector) -> Result<ActionVector, PredictorError> {
        let mut actions = [false; BUTTON_COUNT];
        let dx = features[F_P2_X] - features[F_P1_X];
        if dx > 20.0 {
            actions[Button::Right.index()] = true;
        } else if dx < -20.0 {
            actions[Button::Left.index()] = true;
        }

        let cadence = (features[F_P1_X] + features[F_P2_X]) as i64 % 11;
        match cadence {
            0 => actions[Button::Up.index()] = true,
            1 => actions[Button::A.index()] = true,
            2 => actions[Button::Y.index()] = true,
            _ => {}
        }
        Ok(actions)
    }
}

struct ProfileSpec {
    id: &'static str,
    description: &'static str,
}

// Curated roster: one profile per decision-source configuration.
const PROFILES: &[ProfileSpec] = &[
    ProfileSpec {
        id: "heuristic-rushdown",
        description: "Distance-based macro selection with seeded randomness.",
    },
    ProfileSpec {
        id: "classifier-null",
        description: "Classifier path with the all-false baseline predictor.",
    },
    ProfileSpec {
        id: "classifier-rules",
        description: "Classifier path with the deterministic rule predictor.",
    },
    ProfileSpec {
        id: "fixed-fireball",
        description: "Repeats the right-facing fireball macro every time it is idle.",
    },
    ProfileSpec {
        id: "fixed-guard",
        description: "Repeats the crouch guard macro; defensive smoke profile.",
    },
];

pub fn profile_ids() -> Vec<&'static str> {
    PROFILES.iter().map(|spec| spec.id).collect()
}

pub fn describe_profiles() -> Vec<(&'static str, &'static str)> {
    PROFILES
        .iter()
        .map(|spec| (spec.id, spec.description))
        .collect()
}

fn create_source(id: &str, seed: u32) -> Option<Box<dyn DecisionSource>> {
    match id {
        "heuristic-rushdown" => Some(Box::new(HeuristicSource::new(seed))),
        "classifier-null" => Some(Box::new(
            ClassifierSource::new(Box::new(NullPredictor)).with_deadline(PREDICTOR_DEADLINE),
        )),
        "classifier-rules" => Some(Box::new(
            ClassifierSource::new(Box::new(RulePredictor)).with_deadline(PREDICTOR_DEADLINE),
        )),
        "fixed-fireball" => Some(Box::new(FixedMacroSource::new("fireball-right"))),
        "fixed-guard" => Some(Box::new(FixedMacroSource::new("crouch-guard"))),
        _ => None,
    }
}

pub fn create_session(
    id: &str,
    side: PlayerSide,
    library: Arc<MacroLibrary>,
    seed: u32,
) -> Option<PlayerSession> {
    let source = create_source(id, seed)?;
    let mut session = PlayerSession::new(side, source, library);
    session.reset(seed);
    Some(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_profile_constructs() {
        let library = Arc::new(MacroLibrary::builtin());
        for id in profile_ids() {
            assert!(
                create_session(id, PlayerSide::One, Arc::clone(&library), 0xDEAD_BEEF).is_some(),
                "profile {id} failed to construct"
            );
        }
    }

    #[test]
    fn unknown_profile_is_none() {
        let library = Arc::new(MacroLibrary::builtin());
        assert!(create_session("mash-everything", PlayerSide::One, library, 1).is_none());
    }

    #[test]
    fn rule_predictor_walks_toward_the_opponent() {
        let mut features = [0.0; 13];
        features[F_P1_X] = 100.0;
        features[F_P2_X] = 260.0;
        let actions = RulePredictor.predict(&features).unwrap();
        assert!(actions[Button::Right.index()]);
        assert!(!actions[Button::Left.index()]);
    }
}

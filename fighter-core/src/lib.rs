pub mod arbiter;
pub mod buttons;
pub mod command;
pub mod decision;
pub mod error;
pub mod executor;
pub mod library;
pub mod rng;
pub mod snapshot;
pub mod token;

pub use arbiter::{PlayerSession, SessionStats};
pub use buttons::{Button, ButtonState, BUTTON_COUNT};
pub use command::{build_command, Command};
pub use decision::{
    ActionVector, ClassifierSource, Decision, DecisionSource, FeatureVector, FixedMacroSource,
    HeuristicSource, Predictor, FEATURE_COUNT,
};
pub use error::{DecodeFault, MacroError, PredictorError, TickError};
pub use executor::{CursorState, ExecutionCursor};
pub use library::MacroLibrary;
pub use snapshot::{extract_features, GameStateSnapshot, PlayerSide, PlayerSnapshot, PlayerView};
pub use token::{compile, CompiledMacro, MacroToken};

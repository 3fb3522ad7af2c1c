use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeFault {
    UnknownButton,
    EmptySubtoken,
    DanglingRelease,
    MixedEdges,
    DuplicateButton,
    HoldJoined,
    EmptyToken,
}

impl fmt::Display for DecodeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownButton => write!(f, "unknown button name"),
            Self::EmptySubtoken => write!(f, "empty subtoken in '+' join"),
            Self::DanglingRelease => write!(f, "'!' without a button name"),
            Self::MixedEdges => write!(f, "press and release mixed in one token"),
            Self::DuplicateButton => write!(f, "button named twice in one token"),
            Self::HoldJoined => write!(f, "'-' cannot be joined with other subtokens"),
            Self::EmptyToken => write!(f, "empty token"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MacroError {
    UnknownMacro { name: String },
    Decode { token: String, fault: DecodeFault },
    EmptyMacro { name: String },
    Definition { message: String },
}

impl fmt::Display for MacroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMacro { name } => write!(f, "unknown macro '{name}'"),
            Self::Decode { token, fault } => {
                write!(f, "malformed token '{token}': {fault}")
            }
            Self::EmptyMacro { name } => write!(f, "macro '{name}' has no tokens"),
            Self::Definition { message } => {
                write!(f, "invalid macro definition file: {message}")
            }
        }
    }
}

impl std::error::Error for MacroError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictorError {
    pub message: String,
}

impl PredictorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PredictorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "predictor failed: {}", self.message)
    }
}

impl std::error::Error for PredictorError {}

/// Per-tick faults. All of these are recovered locally by the arbiter with a
/// neutral state for the offending tick; none may escape the match loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickError {
    FeatureExtraction { field: &'static str, value: i64 },
    Predictor { message: String },
    PredictorTimeout { elapsed_ms: u64, budget_ms: u64 },
    Macro(MacroError),
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeatureExtraction { field, value } => {
                write!(f, "invalid snapshot field {field}={value}")
            }
            Self::Predictor { message } => write!(f, "predictor failed: {message}"),
            Self::PredictorTimeout {
                elapsed_ms,
                budget_ms,
            } => write!(
                f,
                "predictor over deadline: {elapsed_ms}ms elapsed, {budget_ms}ms budget"
            ),
            Self::Macro(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TickError {}

impl From<MacroError> for TickError {
    fn from(err: MacroError) -> Self {
        Self::Macro(err)
    }
}

impl From<PredictorError> for TickError {
    fn from(err: PredictorError) -> Self {
        Self::Predictor {
            message: err.message,
        }
    }
}

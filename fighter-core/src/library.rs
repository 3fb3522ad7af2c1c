use std::collections::BTreeMap;

use crate::error::MacroError;
use crate::token::{compile, CompiledMacro};

// Curated catalog: the move set the heuristic source draws from. Left-facing
// entries are mirrors of the right-facing ones.
const BUILTIN_MACROS: &[(&str, &[&str])] = &[
    (
        "fireball-right",
        &[
            "<", "-", "!<", "v+<", "-", "!v+!<", "v", "-", "!v", "v+>", "-", "!v+!>", ">+Y", "-",
            "!>+!Y",
        ],
    ),
    (
        "fireball-left",
        &[
            ">", "-", "!>", "v+>", "-", "!v+!>", "v", "-", "!v", "v+<", "-", "!v+!<", "<+Y", "-",
            "!<+!Y",
        ],
    ),
    (
        "spin-kick-right",
        &[
            ">", "-", "!>", "v+>", "-", "!v+!>", "v", "-", "!v", "v+<", "-", "!v+!<", "<+Y", "-",
            "!<+!Y",
        ],
    ),
    (
        "spin-kick-left",
        &[
            "<", "-", "!<", "v+<", "-", "!v+!<", "v", "-", "!v", "v+>", "-", "!v+!>", ">+Y", "-",
            "!>+!Y",
        ],
    ),
    ("leap-kick-right", &[">+^+B", ">+^+B", "!>+!^+!B"]),
    ("leap-kick-left", &["<+^+B", "<+^+B", "!<+!^+!B"]),
    ("step-right", &[">", ">", "!>"]),
    ("step-left", &["<", "<", "!<"]),
    ("crouch-guard", &["v+R", "v+R", "v+R", "!v+!R"]),
];

/// Read-only catalog of compiled macros. Built once, then safe to share
/// across players behind an `Arc`.
#[derive(Clone, Debug)]
pub struct MacroLibrary {
    macros: BTreeMap<String, CompiledMacro>,
}

impl MacroLibrary {
    /// The built-in move set. Definitions are static and compile-checked by
    /// tests, so failure here is a programming error.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_MACROS
                .iter()
                .map(|(name, tokens)| (*name, tokens.to_vec())),
        )
        .expect("built-in macro definitions always compile")
    }

    /// Loads a `{name: [token, ...]}` definition file. Every entry compiles
    /// eagerly; a single malformed token fails the whole load so a bad file
    /// never yields a partial library.
    pub fn from_json_str(json: &str) -> Result<Self, MacroError> {
        let defs: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|err| MacroError::Definition {
                message: err.to_string(),
            })?;
        Self::from_entries(defs.iter().map(|(name, tokens)| (name.as_str(), tokens.clone())))
    }

    pub fn from_entries<N, S, I>(entries: I) -> Result<Self, MacroError>
    where
        N: AsRef<str>,
        S: AsRef<str>,
        I: IntoIterator<Item = (N, Vec<S>)>,
    {
        let mut macros = BTreeMap::new();
        for (name, tokens) in entries {
            let name = name.as_ref();
            let compiled = compile(name, &tokens)?;
            macros.insert(name.to_string(), compiled);
        }
        Ok(Self { macros })
    }

    pub fn lookup(&self, name: &str) -> Result<&CompiledMacro, MacroError> {
        self.macros.get(name).ok_or_else(|| MacroError::UnknownMacro {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.macros.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

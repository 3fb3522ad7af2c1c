use crate::buttons::Button;
use crate::error::{DecodeFault, MacroError};

/// One tick's worth of edges. A token either presses a set of buttons,
/// releases a set of buttons, or holds the current state for one tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MacroToken {
    Press(Vec<Button>),
    Release(Vec<Button>),
    Hold,
}

impl MacroToken {
    /// Buttons named by this token. Empty for `Hold`.
    pub fn buttons(&self) -> &[Button] {
        match self {
            Self::Press(buttons) | Self::Release(buttons) => buttons,
            Self::Hold => &[],
        }
    }

    /// Parses one token. Whitespace around subtokens is tolerated
    /// (`>+^ +B` parses fine); the canonical encoding emits none.
    pub fn parse(raw: &str) -> Result<Self, DecodeFault> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DecodeFault::EmptyToken);
        }
        if trimmed == "-" {
            return Ok(Self::Hold);
        }

        let mut buttons: Vec<Button> = Vec::new();
        let mut release: Option<bool> = None;
        for part in trimmed.split('+') {
            let part = part.trim();
            if part.is_empty() {
                return Err(DecodeFault::EmptySubtoken);
            }
            if part == "-" {
                return Err(DecodeFault::HoldJoined);
            }

            let (is_release, name) = match part.strip_prefix('!') {
                Some(rest) => (true, rest.trim_start()),
                None => (false, part),
            };
            if name.is_empty() {
                return Err(DecodeFault::DanglingRelease);
            }
            let button = Button::from_symbol(name).ok_or(DecodeFault::UnknownButton)?;

            match release {
                None => release = Some(is_release),
                Some(mode) if mode != is_release => return Err(DecodeFault::MixedEdges),
                Some(_) => {}
            }
            if buttons.contains(&button) {
                return Err(DecodeFault::DuplicateButton);
            }
            buttons.push(button);
        }

        if release == Some(true) {
            Ok(Self::Release(buttons))
        } else {
            Ok(Self::Press(buttons))
        }
    }

    /// Canonical string form; parsing it back yields an equal token.
    pub fn encode(&self) -> String {
        match self {
            Self::Hold => "-".to_string(),
            Self::Press(buttons) => buttons
                .iter()
                .map(|b| b.symbol().to_string())
                .collect::<Vec<_>>()
                .join("+"),
            Self::Release(buttons) => buttons
                .iter()
                .map(|b| format!("!{}", b.symbol()))
                .collect::<Vec<_>>()
                .join("+"),
        }
    }
}

/// Immutable compiled form of a named macro. N >= 1 tokens; compiling the
/// same token list twice yields an identical value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledMacro {
    name: String,
    tokens: Vec<MacroToken>,
}

impl CompiledMacro {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token(&self, position: usize) -> Option<&MacroToken> {
        self.tokens.get(position)
    }

    pub fn tokens(&self) -> &[MacroToken] {
        &self.tokens
    }

    pub fn encode(&self) -> Vec<String> {
        self.tokens.iter().map(MacroToken::encode).collect()
    }
}

/// Compiles a raw token list, failing on the first malformed token.
pub fn compile<S: AsRef<str>>(name: &str, raw_tokens: &[S]) -> Result<CompiledMacro, MacroError> {
    if raw_tokens.is_empty() {
        return Err(MacroError::EmptyMacro {
            name: name.to_string(),
        });
    }

    let mut tokens = Vec::with_capacity(raw_tokens.len());
    for raw in raw_tokens {
        let raw = raw.as_ref();
        let token = MacroToken::parse(raw).map_err(|fault| MacroError::Decode {
            token: raw.to_string(),
            fault,
        })?;
        tokens.push(token);
    }

    Ok(CompiledMacro {
        name: name.to_string(),
        tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_press_and_release() {
        assert_eq!(
            MacroToken::parse("v+<").unwrap(),
            MacroToken::Press(vec![Button::Down, Button::Left])
        );
        assert_eq!(
            MacroToken::parse("!v+!<").unwrap(),
            MacroToken::Release(vec![Button::Down, Button::Left])
        );
        assert_eq!(MacroToken::parse("-").unwrap(), MacroToken::Hold);
    }

    #[test]
    fn parse_tolerates_interior_whitespace() {
        let token = MacroToken::parse(">+^ +B").unwrap();
        assert_eq!(
            token,
            MacroToken::Press(vec![Button::Right, Button::Up, Button::B])
        );
        assert_eq!(token.encode(), ">+^+B");
    }

    #[test]
    fn roundtrip_canonical_tokens() {
        for raw in [
            "v", "^", "<", ">", "A", "B", "X", "Y", "L", "R", "start", "select", "v+<", "!v+!<",
            ">+^+B", "!>+!^+!B", "v+R", "start+select", "-",
        ] {
            let token = MacroToken::parse(raw).unwrap();
            assert_eq!(token.encode(), raw, "roundtrip failed for {raw}");
        }
    }

    #[test]
    fn encode_preserves_subtoken_order() {
        assert_eq!(MacroToken::parse("<+v").unwrap().encode(), "<+v");
        assert_eq!(MacroToken::parse("v+<").unwrap().encode(), "v+<");
    }

    #[test]
    fn rejects_unknown_button() {
        assert_eq!(
            MacroToken::parse("v+<+?").unwrap_err(),
            DecodeFault::UnknownButton
        );
        assert_eq!(MacroToken::parse("w").unwrap_err(), DecodeFault::UnknownButton);
    }

    #[test]
    fn rejects_malformed_joins() {
        assert_eq!(MacroToken::parse("v+").unwrap_err(), DecodeFault::EmptySubtoken);
        assert_eq!(MacroToken::parse("+v").unwrap_err(), DecodeFault::EmptySubtoken);
        assert_eq!(MacroToken::parse("v++<").unwrap_err(), DecodeFault::EmptySubtoken);
    }

    #[test]
    fn rejects_dangling_release() {
        assert_eq!(MacroToken::parse("!").unwrap_err(), DecodeFault::DanglingRelease);
        assert_eq!(MacroToken::parse("v+!").unwrap_err(), DecodeFault::DanglingRelease);
        assert_eq!(MacroToken::parse("!!v").unwrap_err(), DecodeFault::UnknownButton);
    }

    #[test]
    fn rejects_mixed_edges_and_duplicates() {
        assert_eq!(MacroToken::parse("v+!<").unwrap_err(), DecodeFault::MixedEdges);
        assert_eq!(MacroToken::parse("!v+<").unwrap_err(), DecodeFault::MixedEdges);
        assert_eq!(
            MacroToken::parse("v+v").unwrap_err(),
            DecodeFault::DuplicateButton
        );
    }

    #[test]
    fn rejects_joined_hold_and_empty_token() {
        assert_eq!(MacroToken::parse("-+v").unwrap_err(), DecodeFault::HoldJoined);
        assert_eq!(MacroToken::parse("v+-").unwrap_err(), DecodeFault::HoldJoined);
        assert_eq!(MacroToken::parse("  ").unwrap_err(), DecodeFault::EmptyToken);
    }

    #[test]
    fn compile_is_deterministic() {
        let raw = ["v+<", "-", "!v+!<"];
        let first = compile("test", &raw).unwrap();
        let second = compile("test", &raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn compile_reports_first_malformed_token() {
        let err = compile("bad", &["v", "v+<+?", "?"]).unwrap_err();
        assert_eq!(
            err,
            MacroError::Decode {
                token: "v+<+?".to_string(),
                fault: DecodeFault::UnknownButton,
            }
        );
    }

    #[test]
    fn compile_rejects_empty_macro() {
        let err = compile("empty", &[] as &[&str]).unwrap_err();
        assert!(matches!(err, MacroError::EmptyMacro { .. }));
    }

    #[test]
    fn compiled_macro_reencodes_to_canonical_form() {
        let compiled = compile("leap", &[">+^ +B", ">+^ +B", "!>+!^ +!B"]).unwrap();
        assert_eq!(compiled.encode(), vec![">+^+B", ">+^+B", "!>+!^+!B"]);
    }
}

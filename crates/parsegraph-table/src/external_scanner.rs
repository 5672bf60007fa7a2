//! The external-scanner ABI surface a compiled table exposes.
//!
//! The scanner *trait* that invokes these hooks per-parse (`create`,
//! `destroy`, `scan`, `serialize`/`deserialize`) belongs to
//! `parsegraph-driver` — it needs a `Lexer` handle the table
//! crate doesn't otherwise depend on. What the table contributes is the
//! *static* part: how many external tokens a grammar declares and which
//! grammar symbol each one maps to, so the driver can build a
//! `valid_tokens` mask and translate a scanned index back into a `Symbol`.

use parsegraph_core::Symbol;

/// Static, per-grammar description of the external scanner's token set.
/// `None` for a grammar with no external scanner.
#[derive(Clone, Debug, Default)]
pub struct ExternalTokenMap {
    /// `external_tokens[i]` is the grammar symbol scanned token index `i`
    /// produces.
    external_tokens: Vec<Symbol>,
}

impl ExternalTokenMap {
    pub fn new(external_tokens: Vec<Symbol>) -> Self {
        ExternalTokenMap { external_tokens }
    }

    pub fn token_count(&self) -> usize {
        self.external_tokens.len()
    }

    pub fn symbol_for_token(&self, token_index: usize) -> Option<Symbol> {
        self.external_tokens.get(token_index).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.external_tokens.is_empty()
    }
}

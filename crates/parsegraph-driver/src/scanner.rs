//! The external-scanner adapter.
//!
//! A thin façade over grammar-supplied hooks. `create`/`destroy` map onto
//! ordinary Rust construction and `Drop`; `scan`/`serialize`/`deserialize`
//! are the per-call surface the driver invokes from `lex`.

use crate::lexer::Lexer;

/// A grammar-supplied external tokenizer, invoked when the table's lex
/// mode for the current state has a nonzero `external_lex_state`.
///
/// The scanner owns its own persistent state across calls within one
/// parser instance; `serialize`/`deserialize` snapshot that state into a leaf so a
/// later incremental reparse can restore it.
pub trait ExternalScanner {
    /// Attempt to recognize one of the tokens whose bit is set in
    /// `valid_tokens` (indexed the same way as the grammar's external
    /// token table). Returns the recognized token's index, or `None`.
    fn scan(&mut self, lexer: &mut dyn Lexer, valid_tokens: &[bool]) -> Option<usize>;

    /// Serialize this scanner's persistent state.
    fn serialize(&self) -> Vec<u8>;

    /// Restore persistent state from a prior `serialize` call. Called
    /// with an empty slice to mean "no prior state".
    fn deserialize(&mut self, state: &[u8]);

    /// Whether the most recent `scan` call that returned `None` was a
    /// fatal failure rather than an ordinary "nothing matched
    /// here". Checked by the driver immediately after a `None` result;
    /// defaults to `false` since most scanners only ever report "no
    /// match", never abort the parse.
    fn had_fatal_error(&self) -> bool {
        false
    }
}

/// The no-op scanner for grammars without an external tokenizer.
#[derive(Default)]
pub struct NullScanner;

impl ExternalScanner for NullScanner {
    fn scan(&mut self, _lexer: &mut dyn Lexer, _valid_tokens: &[bool]) -> Option<usize> {
        None
    }

    fn serialize(&self) -> Vec<u8> {
        Vec::new()
    }

    fn deserialize(&mut self, _state: &[u8]) {}
}

/// Seam for routing scanner calls through a wasm store instead of a native
/// `dyn ExternalScanner`. Not implemented: this workspace carries no wasm
/// runtime dependency to build a store façade on (recorded as an
/// open-question decision in DESIGN.md). Embedders needing wasm scanners
/// implement [`ExternalScanner`] directly against their own store instead.
pub trait ExternalScannerHost {
    fn scan(&mut self, lexer: &mut dyn Lexer, valid_tokens: &[bool]) -> Option<usize>;
    fn serialize(&self) -> Vec<u8>;
    fn deserialize(&mut self, state: &[u8]);
}

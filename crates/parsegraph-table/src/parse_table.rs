//! The read-only parse-table contract.
//!
//! Everything the driver crate needs to know about a compiled grammar goes
//! through this trait. Generating the table is explicitly out of scope
//!; this crate only states the contract and ships
//! one concrete, hand-assembled implementation ([`StaticParseTable`]) for
//! tests and small embedders.

use parsegraph_core::Symbol;

use crate::action::Action;
use crate::external_scanner::ExternalTokenMap;
use crate::lex_mode::LexMode;

/// A parser state id, as assigned by the compiled table. State `1` is
/// always the start state.
pub type StateId = u16;

pub const START_STATE: StateId = 1;

/// The read-only interface the driver consults at every advance step.
/// Implementations are expected to be cheap to query — the driver calls
/// these methods in the hot loop.
pub trait ParseTable {
    /// Which lex mode (internal DFA state + external-scanner
    /// configuration) applies while lexing in `state`.
    fn lex_mode(&self, state: StateId) -> LexMode;

    /// Every action the table has recorded for `(state, symbol)`, in the
    /// order the driver must process them.
    fn actions(&self, state: StateId, symbol: Symbol) -> &[Action];

    /// Whether `(state, symbol)` has at least one action.
    fn has_actions(&self, state: StateId, symbol: Symbol) -> bool {
        !self.actions(state, symbol).is_empty()
    }

    /// The state reached after reducing to `symbol` from `state`:
    /// `next_state = goto(state, symbol)`.
    fn goto(&self, state: StateId, symbol: Symbol) -> StateId;

    /// Whether `symbol` is a reserved word in `state` — i.e. the grammar
    /// would not accept the generic "word" token here.
    fn is_reserved_word(&self, state: StateId, symbol: Symbol) -> bool;

    /// Whether the table entry for `(state, symbol)` is marked reusable
    /// for empty, zero-span, externally-lexed tokens.
    fn is_reusable_leaf(&self, state: StateId, symbol: Symbol) -> bool;

    /// The symbol the lexer produces first and the driver may rewrite to
    /// [`default_word_token`](Self::default_word_token) under keyword
    /// fallback. `None` if this grammar has no
    /// keyword-capture token.
    fn keyword_capture_token(&self) -> Option<Symbol>;

    /// The generic "identifier/word" token keyword fallback rewrites onto
    ///. `None` if this grammar has no such token.
    fn default_word_token(&self) -> Option<Symbol>;

    /// The symbol used for end-of-input lookahead.
    fn eof_symbol(&self) -> Symbol {
        parsegraph_core::END_SYMBOL
    }

    /// The grammar's external-scanner token declarations, so the driver can
    /// size a `valid_tokens` mask and translate a scanned index back into a
    /// grammar symbol.
    fn external_tokens(&self) -> &ExternalTokenMap;

    /// Symbols the table compiler has precomputed as safe to insert as a
    /// zero-size missing leaf while recovering in `state`. Precomputed per state at table-build
    /// time, the same way the table already precomputes actions/goto,
    /// rather than probed by trying every grammar symbol at recovery time.
    /// Empty by default — a table that never records candidates simply
    /// never attempts missing-token insertion.
    fn missing_token_candidates(&self, state: StateId) -> &[Symbol] {
        let _ = state;
        &[]
    }

    /// Every distinct `Reduce` action recorded anywhere in `state`,
    /// regardless of which lookahead symbol triggers it. Used by
    /// `do_all_potential_reductions` to walk reduce chains without
    /// probing the table one lookahead symbol at a time. A table that
    /// never populates this simply never finds an indirect reduction
    /// path, falling back to the direct-goto check.
    fn reduce_actions_in_state(&self, state: StateId) -> Vec<Action> {
        let _ = state;
        Vec::new()
    }
}

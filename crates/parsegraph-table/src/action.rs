//! The four action kinds a compiled parse table can return for a
//! `(state, symbol)` pair.

use parsegraph_core::Symbol;

use crate::StateId;

/// One entry in the table's action list for a `(state, symbol)` pair.
/// Multiple `Reduce` actions (and at most one `Shift`/`Accept`/`Recover`)
/// can coexist for the same pair under ambiguity; the driver processes
/// them in table order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and move to `state`.
    Shift {
        state: StateId,
        /// This token is `extra` (whitespace/comment-like) in this state.
        extra: bool,
        /// This token closes a repetition loop; used by the driver only
        /// for diagnostics/logging, not for dispatch.
        repetition: bool,
    },
    /// Pop `child_count` subtrees and reduce them to `symbol` under
    /// `production_id`, forking a new GSS version.
    Reduce {
        symbol: Symbol,
        child_count: u16,
        dynamic_precedence: i32,
        production_id: u16,
        /// This production's parent can never be safely reused
        /// incrementally; the parent node it builds is always marked
        /// fragile regardless of how many pop paths/versions existed.
        is_fragile: bool,
        /// This reduce is the fixed reduction consulted at the
        /// end-of-non-terminal-extra lookahead (`lex_mode.has_lookahead()
        /// == false`); when its `goto` loops back to the same state, the
        /// parent it builds is marked `extra`.
        end_of_non_terminal_extra: bool,
    },
    /// The lookahead is EOF and the stack holds a complete parse.
    Accept,
    /// No shift/reduce applies; hand off to error recovery.
    Recover,
}

impl Action {
    pub fn is_shift(&self) -> bool {
        matches!(self, Action::Shift { .. })
    }

    pub fn is_reduce(&self) -> bool {
        matches!(self, Action::Reduce { .. })
    }
}

//! A concrete, hand-assembled [`ParseTable`] for tests and small embedders
//! that don't run a real table compiler.

use std::collections::HashMap;

use parsegraph_core::Symbol;

use crate::action::Action;
use crate::external_scanner::ExternalTokenMap;
use crate::lex_mode::LexMode;
use crate::parse_table::{ParseTable, StateId};

/// Builds a [`StaticParseTable`] entry by entry.
#[derive(Default)]
pub struct StaticParseTableBuilder {
    lex_modes: HashMap<StateId, LexMode>,
    actions: HashMap<(StateId, Symbol), Vec<Action>>,
    goto: HashMap<(StateId, Symbol), StateId>,
    reserved_words: std::collections::HashSet<(StateId, Symbol)>,
    reusable_leaves: std::collections::HashSet<(StateId, Symbol)>,
    keyword_capture_token: Option<Symbol>,
    default_word_token: Option<Symbol>,
    external_tokens: ExternalTokenMap,
    missing_token_candidates: HashMap<StateId, Vec<Symbol>>,
}

impl StaticParseTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lex_mode(mut self, state: StateId, mode: LexMode) -> Self {
        self.lex_modes.insert(state, mode);
        self
    }

    /// Append one action to `(state, symbol)`'s action list. Multiple calls
    /// with the same key accumulate, preserving call order — this is what
    /// lets a fixture encode a shift/reduce conflict the driver resolves by
    /// forking.
    pub fn action(mut self, state: StateId, symbol: Symbol, action: Action) -> Self {
        self.actions.entry((state, symbol)).or_default().push(action);
        self
    }

    pub fn goto(mut self, state: StateId, symbol: Symbol, next: StateId) -> Self {
        self.goto.insert((state, symbol), next);
        self
    }

    pub fn reserved_word(mut self, state: StateId, symbol: Symbol) -> Self {
        self.reserved_words.insert((state, symbol));
        self
    }

    pub fn reusable_leaf(mut self, state: StateId, symbol: Symbol) -> Self {
        self.reusable_leaves.insert((state, symbol));
        self
    }

    pub fn keyword_capture_token(mut self, symbol: Symbol) -> Self {
        self.keyword_capture_token = Some(symbol);
        self
    }

    pub fn default_word_token(mut self, symbol: Symbol) -> Self {
        self.default_word_token = Some(symbol);
        self
    }

    pub fn external_tokens(mut self, tokens: ExternalTokenMap) -> Self {
        self.external_tokens = tokens;
        self
    }

    pub fn missing_token_candidate(mut self, state: StateId, symbol: Symbol) -> Self {
        self.missing_token_candidates.entry(state).or_default().push(symbol);
        self
    }

    pub fn build(self) -> StaticParseTable {
        StaticParseTable {
            lex_modes: self.lex_modes,
            actions: self.actions,
            goto: self.goto,
            reserved_words: self.reserved_words,
            reusable_leaves: self.reusable_leaves,
            keyword_capture_token: self.keyword_capture_token,
            default_word_token: self.default_word_token,
            external_tokens: self.external_tokens,
            missing_token_candidates: self.missing_token_candidates,
        }
    }
}

/// A parse table held entirely in memory as hash maps keyed by
/// `(state, symbol)`. States with no recorded lex mode default to
/// [`LexMode::NONE`] (no lookahead); states/symbols with no recorded
/// action return an empty slice, which the driver reads as "no action
/// applies" and routes to error recovery.
#[derive(Debug, Default)]
pub struct StaticParseTable {
    lex_modes: HashMap<StateId, LexMode>,
    actions: HashMap<(StateId, Symbol), Vec<Action>>,
    goto: HashMap<(StateId, Symbol), StateId>,
    reserved_words: std::collections::HashSet<(StateId, Symbol)>,
    reusable_leaves: std::collections::HashSet<(StateId, Symbol)>,
    keyword_capture_token: Option<Symbol>,
    default_word_token: Option<Symbol>,
    external_tokens: ExternalTokenMap,
    missing_token_candidates: HashMap<StateId, Vec<Symbol>>,
}

impl StaticParseTable {
    pub fn builder() -> StaticParseTableBuilder {
        StaticParseTableBuilder::new()
    }

    pub fn external_tokens(&self) -> &ExternalTokenMap {
        &self.external_tokens
    }
}

const EMPTY_ACTIONS: &[Action] = &[];

impl ParseTable for StaticParseTable {
    fn lex_mode(&self, state: StateId) -> LexMode {
        self.lex_modes.get(&state).copied().unwrap_or(LexMode::NONE)
    }

    fn actions(&self, state: StateId, symbol: Symbol) -> &[Action] {
        self.actions.get(&(state, symbol)).map(Vec::as_slice).unwrap_or(EMPTY_ACTIONS)
    }

    fn goto(&self, state: StateId, symbol: Symbol) -> StateId {
        *self.goto.get(&(state, symbol)).unwrap_or_else(|| {
            panic!("no goto recorded for state {state}, symbol {symbol}")
        })
    }

    fn is_reserved_word(&self, state: StateId, symbol: Symbol) -> bool {
        self.reserved_words.contains(&(state, symbol))
    }

    fn is_reusable_leaf(&self, state: StateId, symbol: Symbol) -> bool {
        self.reusable_leaves.contains(&(state, symbol))
    }

    fn keyword_capture_token(&self) -> Option<Symbol> {
        self.keyword_capture_token
    }

    fn default_word_token(&self) -> Option<Symbol> {
        self.default_word_token
    }

    fn external_tokens(&self) -> &ExternalTokenMap {
        &self.external_tokens
    }

    fn missing_token_candidates(&self, state: StateId) -> &[Symbol] {
        self.missing_token_candidates.get(&state).map(Vec::as_slice).unwrap_or(&[])
    }

    fn reduce_actions_in_state(&self, state: StateId) -> Vec<Action> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for (&(s, _), actions) in self.actions.iter() {
            if s != state {
                continue;
            }
            for action in actions {
                if let Action::Reduce { symbol, production_id, .. } = action {
                    if seen.insert((*symbol, *production_id)) {
                        out.push(*action);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "static_table_tests.rs"]
mod static_table_tests;

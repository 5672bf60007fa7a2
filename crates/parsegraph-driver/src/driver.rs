//! The parser driver: the advance loop, reduce/shift/
//! accept/recover dispatch, condensation, incremental reuse gating, error
//! strategy, and subtree rebalancing.
//!
//! Control flow is explicit loops over a tagged outcome enum, mirroring a
//! VM's bytecode loop (`match result { Ok(()) | Err(Backtracked) =>
//! continue, Err(Accept) => return Ok(..), Err(e) => return Err(e) }`)
//! rather than mutual recursion between "advance"/"reduce"/"recover":
//! cancellation must stay fast and the rebalance pass must be resumable,
//! both of which favor flat loops over deep call stacks.

use parsegraph_core::{
    ERROR_REPEAT_SYMBOL, ERROR_SYMBOL, Length, ParseState, Subtree, SubtreePool, Symbol, Tree,
};
use parsegraph_table::limits::{
    ERROR_COST_PER_PAUSED_VERSION, ERROR_COST_PER_SKIPPED_CHAR, ERROR_COST_PER_SKIPPED_LINE,
    ERROR_COST_PER_SKIPPED_TREE, MAX_VERSION_COUNT, MAX_VERSION_COUNT_OVERFLOW,
};
use parsegraph_table::{Action, ParseTable, StateId};

use crate::error::ScannerError;
use crate::error_status::{self, ErrorComparison};
use crate::gss::{Gss, Version};
use crate::lexer::Lexer;
use crate::logger::{LogEvent, Logger};
use crate::reusable_node::ReusableNode;
use crate::scanner::ExternalScanner;
use crate::token_cache::TokenCache;

/// What one driver sweep produced for a single version (internal control
/// signal; not part of public output).
enum StepOutcome {
    /// The version shifted, reduced into other live versions, or is
    /// otherwise still progressing.
    Continue,
    /// The version accepted; its tree is folded into `Driver::finished`.
    Accepted,
}

/// What one full sweep across every live version produced.
pub enum SweepOutcome {
    /// At least one version is still live, or a finished tree exists but
    /// other versions might still beat it.
    Continue,
    /// Every version is halted and a finished tree is available.
    Done,
    /// The external scanner reported a fatal failure; the parse
    /// is aborted and any partial state should be released, not resumed.
    ScannerFailed(ScannerError),
}

/// Owns everything the advance/reduce/recover/condense/rebalance methods
/// need across an entire parse: the subtree pool, the GSS, the
/// reusable-node cursor into the previous tree, the token-lex memo, and
/// the best finished tree seen so far.
pub struct Driver {
    pool: SubtreePool,
    gss: Gss,
    reusable: ReusableNode,
    token_cache: TokenCache,
    finished: Option<Subtree>,
    rebalance_worklist: Vec<Subtree>,
    scanner_error: Option<ScannerError>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            pool: SubtreePool::new(),
            gss: Gss::new(),
            reusable: ReusableNode::empty(),
            token_cache: TokenCache::new(),
            finished: None,
            rebalance_worklist: Vec::new(),
            scanner_error: None,
        }
    }

    pub fn pool_stats(&self) -> parsegraph_core::PoolStats {
        self.pool.stats()
    }

    /// Seed a fresh parse: a single version at the table's start state,
    /// plus the reusable cursor over `previous_tree` if one was supplied.
    pub fn begin(&mut self, previous_tree: Option<&Tree>) {
        self.gss.reset(parsegraph_table::START_STATE);
        self.reusable.reset(previous_tree);
        self.token_cache.clear();
        self.finished = None;
        self.rebalance_worklist.clear();
        self.scanner_error = None;
    }

    /// Run one full sweep across all live versions, then condense: after
    /// each round, the condenser prunes and merges versions.
    /// Returns [`SweepOutcome::Done`] once a finished tree is available and
    /// no live version remains, or [`SweepOutcome::ScannerFailed`] the
    /// instant the external scanner reports a fatal error.
    pub fn sweep(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
        logger: &mut dyn Logger,
    ) -> SweepOutcome {
        let version_count = self.gss.versions.len();
        for version in 0..version_count.min(self.gss.versions.len()) {
            if version >= self.gss.versions.len() || self.gss.versions[version].halted {
                continue;
            }
            if let StepOutcome::Accepted = self.advance_one(table, lexer, scanner, logger, version) {
                logger.log(LogEvent::Accept);
            }
            if let Some(err) = self.scanner_error.take() {
                return SweepOutcome::ScannerFailed(err);
            }
        }
        self.condense(logger);
        if self.finished.is_some() && self.gss.live_versions().next().is_none() {
            SweepOutcome::Done
        } else {
            SweepOutcome::Continue
        }
    }

    /// Take the finished tree, running the rebalance pass over it first.
    /// Returns `None` if parsing has not finished yet.
    pub fn take_finished(&mut self, included_ranges: Vec<parsegraph_core::Range>) -> Option<Tree> {
        let root = self.finished.take()?;
        let root = self.rebalance_tree(root);
        Some(Tree::new(root, included_ranges))
    }

    /// Whether a rebalance pass was interrupted mid-way. tree-sitter's own
    /// rebalance keeps a resumable worklist so cancellation mid-pass can
    /// pick up later; that per-node worklist resumability does not survive
    /// translation to owned, refcount-checked `Rc` children (see
    /// DESIGN.md), so this workspace's rebalance instead runs to
    /// completion in one call from `take_finished` and this is always
    /// empty between `parse` calls. Kept as a seam for an embedder that
    /// wants to bound rebalance work explicitly.
    pub fn has_pending_rebalance(&self) -> bool {
        !self.rebalance_worklist.is_empty()
    }

    /// Recursively flattens right-skewed repetition chains,
    /// taking exclusive ownership of children at each step so mutations via
    /// `Rc::make_mut` land in place rather than on a soon-discarded clone
    /// (see [`Subtree::take_children`]).
    fn rebalance_tree(&mut self, mut node: Subtree) -> Subtree {
        if node.strong_count() != 1 || node.child_count() == 0 {
            return node;
        }
        let symbol = node.symbol();
        let mut children = node.take_children();
        for slot in children.iter_mut() {
            let placeholder = Subtree::leaf(0, Length::ZERO, Length::ZERO, 0, ParseState::NONE);
            let child = std::mem::replace(slot, placeholder);
            *slot = self.rebalance_tree(child);
        }

        let skewed = children.len() >= 3
            && children.last().map(|c| c.symbol() == symbol).unwrap_or(false)
            && children.last().unwrap().child_count() + 1 >= children.len();
        if skewed {
            let mut halved = children;
            let mut n = halved.len();
            while n > 2 {
                let mut i = n / 2;
                n -= i;
                i /= 2;
                if i == 0 {
                    break;
                }
                let tail: Vec<Subtree> = halved.split_off(halved.len() - i);
                let wrapped = self.pool.node(symbol, tail, 0, 0, ParseState::NONE);
                halved.push(wrapped);
            }
            children = halved;
        }

        node.set_children(children);
        node
    }

    // ---- advance ---------------------------------------------------

    fn advance_one(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
        logger: &mut dyn Logger,
        version: usize,
    ) -> StepOutcome {
        let single_version = self.gss.live_versions().count() == 1;
        let state = self.gss.node_state(self.gss.versions[version].top);
        let lex_mode = table.lex_mode(state);

        let token = if !lex_mode.has_lookahead() {
            // End-of-non-terminal-extra: consult the table at EOF to
            // drive the fixed reduction.
            self.pool.leaf(table.eof_symbol(), Length::ZERO, Length::ZERO, 0, ParseState::NONE)
        } else if let Some(token) = self.try_reuse(single_version, version, state, table) {
            token
        } else if let Some(token) = self.try_token_cache(version, state, table) {
            token
        } else {
            let token = self.lex(table, lexer, scanner, version, state);
            let byte_index = self.gss.versions[version].position.bytes;
            self.token_cache.store(byte_index, token.clone());
            if let Some(external_state) = token.external_scanner_state() {
                self.token_cache.record_external_token(external_state.clone());
            }
            token
        };

        let symbol = self.apply_keyword_fallback(table, state, token.symbol());
        self.dispatch(table, logger, version, state, symbol, token)
    }

    fn try_reuse(
        &mut self,
        single_version: bool,
        version: usize,
        state: StateId,
        table: &dyn ParseTable,
    ) -> Option<Subtree> {
        if !single_version {
            return None;
        }
        let position = self.gss.versions[version].position;
        self.reusable.seek(position);
        // `seek` only descends into nodes that straddle `position`; a node
        // that starts exactly at `position` (the common case, including the
        // tree root at position zero) is handed back whole. Keep descending
        // until we reach an actual leaf, since reuse here is token-grained
        // not whole-subtree.
        loop {
            let (candidate, start) = self.reusable.candidate()?;
            if candidate.child_count() > 0 {
                self.reusable.descend();
                continue;
            }
            if start != position {
                return None;
            }
            let flags = candidate.flags();
            if flags.has_changes || candidate.is_error() || candidate.is_missing() || candidate.is_fragile() {
                return None;
            }
            if candidate.external_scanner_state() != self.gss.versions[version].last_external_token.as_ref() {
                return None;
            }
            if !is_leaf_reusable(candidate, state, table) {
                return None;
            }
            let reused = candidate.clone();
            self.reusable.advance();
            return Some(reused);
        }
    }

    fn try_token_cache(&mut self, version: usize, state: StateId, table: &dyn ParseTable) -> Option<Subtree> {
        let byte_index = self.gss.versions[version].position.bytes;
        let candidate = self.token_cache.get(byte_index)?;
        if self.token_cache.last_external_token() != self.gss.versions[version].last_external_token.as_ref() {
            return None;
        }
        if !is_leaf_reusable(candidate, state, table) {
            return None;
        }
        Some(candidate.clone())
    }

    /// Lex: consult the external scanner first if the state calls
    /// for one, then the internal lexer, folding unrecognized bytes into
    /// an error leaf rather than failing the parse.
    fn lex(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
        version: usize,
        state: StateId,
    ) -> Subtree {
        let position = self.gss.versions[version].position;
        let lex_mode = table.lex_mode(state);

        if lex_mode.has_external_lexing() {
            if let Some(token) = self.try_external_lex(table, lexer, scanner, version, state, position) {
                return token;
            }
        }

        lexer.reset(position);
        if let Some(token) = self.try_internal_lex(table, lexer, state, position) {
            return token;
        }

        // Retry once under the error lex mode. This
        // model has no distinct error-state lex automaton to switch to,
        // so the retry re-runs the same lex_state from the same position.
        lexer.reset(position);
        if let Some(token) = self.try_internal_lex(table, lexer, state, position) {
            return token;
        }

        self.skip_unrecognized_bytes(table, lexer, position)
    }

    fn try_external_lex(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
        version: usize,
        state: StateId,
        position: Length,
    ) -> Option<Subtree> {
        lexer.reset(position);
        match self.gss.versions[version].last_external_token.clone() {
            Some(last) => scanner.deserialize(last.as_bytes()),
            None => scanner.deserialize(&[]),
        }
        lexer.start();
        let valid_tokens = vec![true; table.external_tokens().token_count()];
        let token_index = match scanner.scan(lexer, &valid_tokens) {
            Some(index) => index,
            None => {
                if scanner.had_fatal_error() {
                    self.scanner_error =
                        Some(ScannerError::ExternalScannerFailed { byte_offset: position.bytes });
                }
                return None;
            }
        };
        let symbol = table.external_tokens().symbol_for_token(token_index)?;
        let span = lexer.finish();
        let state_bytes = scanner.serialize();
        let previous_bytes = self.gss.versions[version].last_external_token.as_ref().map(|s| s.as_bytes());
        let state_changed = previous_bytes != Some(state_bytes.as_slice());

        // Reject an empty externally-produced token whose state did not
        // change while we are in error, stalled, or the symbol is extra
        // in this state, falling through to internal
        // lexing at the saved position.
        let empty = span.token_end == span.token_start;
        if empty && !state_changed {
            let stalled = self.gss.versions[version].status.node_count_since_error == 0;
            let is_extra_here = table
                .actions(state, symbol)
                .iter()
                .any(|a| matches!(a, parsegraph_table::Action::Shift { extra: true, .. }));
            if self.gss.versions[version].is_in_error() || stalled || is_extra_here {
                return None;
            }
        }

        let padding = span.token_start - position;
        let size = span.token_end - span.token_start;
        let state_id = parsegraph_core::ExternalScannerStateId::new(state_bytes);
        self.gss.versions[version].last_external_token = Some(state_id.clone());
        Some(self.pool.external_leaf(symbol, padding, size, ParseState::NONE, state_id, state_changed))
    }

    fn try_internal_lex(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        state: StateId,
        position: Length,
    ) -> Option<Subtree> {
        let lex_mode = table.lex_mode(state);
        let symbol = lexer.lex(lex_mode.lex_state)?;
        let span = lexer.finish();

        // Keyword refinement is handled entirely by
        // `apply_keyword_fallback` after this returns: this reference
        // lexer has no separate keyword automaton to re-scan with, so
        // there is nothing further to refine here.

        let padding = span.token_start - position;
        let size = span.token_end - span.token_start;
        let lookahead_bytes = span.lookahead_end.bytes - span.token_end.bytes;
        Some(self.pool.leaf(symbol, padding, size, lookahead_bytes, ParseState(state)))
    }

    /// Advance one byte at a time past `position` until a recognizable
    /// token begins or EOF, emitting an error leaf spanning the skipped
    /// bytes.
    fn skip_unrecognized_bytes(&mut self, table: &dyn ParseTable, lexer: &mut dyn Lexer, position: Length) -> Subtree {
        let mut cursor = position;
        loop {
            lexer.reset(cursor);
            if lexer.current_byte().is_none() {
                break;
            }
            if lexer.lex(0).is_some() {
                break;
            }
            lexer.reset(cursor);
            lexer.advance();
            cursor = lexer.position();
        }
        lexer.reset(cursor);
        let skipped = cursor - position;
        if skipped == Length::ZERO {
            return self.pool.leaf(table.eof_symbol(), Length::ZERO, Length::ZERO, 0, ParseState::NONE);
        }
        self.pool.error_leaf(Length::ZERO, skipped)
    }

    /// Keyword fallback: an unreserved keyword token with no action
    /// is rewritten to the default word token, bytes unchanged.
    fn apply_keyword_fallback(&self, table: &dyn ParseTable, state: StateId, symbol: Symbol) -> Symbol {
        let Some(keyword_token) = table.keyword_capture_token() else { return symbol };
        if symbol != keyword_token {
            return symbol;
        }
        if table.is_reserved_word(state, symbol) || table.has_actions(state, symbol) {
            return symbol;
        }
        table.default_word_token().unwrap_or(symbol)
    }

    fn dispatch(
        &mut self,
        table: &dyn ParseTable,
        logger: &mut dyn Logger,
        version: usize,
        state: StateId,
        symbol: Symbol,
        token: Subtree,
    ) -> StepOutcome {
        let actions = table.actions(state, symbol).to_vec();
        if actions.is_empty() {
            return self.recover(table, logger, version, token);
        }

        let mut only_reduces = true;
        for action in &actions {
            match *action {
                Action::Reduce {
                    symbol,
                    child_count,
                    dynamic_precedence,
                    production_id,
                    is_fragile,
                    end_of_non_terminal_extra,
                } => {
                    self.reduce(
                        table,
                        logger,
                        version,
                        symbol,
                        child_count as usize,
                        dynamic_precedence,
                        production_id,
                        is_fragile,
                        end_of_non_terminal_extra,
                    );
                }
                Action::Shift { state: next_state, extra, .. } => {
                    only_reduces = false;
                    let mut shifted = token.clone();
                    if symbol != token.symbol() {
                        // Keyword fallback rewrote the dispatch symbol; the
                        // tree must record the same rewrite, not just the
                        // routing decision, or a later reuse pass would see
                        // the original keyword symbol again.
                        shifted.rewrite_keyword_symbol(symbol);
                    }
                    if extra {
                        shifted.set_extra();
                    }
                    self.gss.shift(version, next_state, shifted);
                    self.gss.versions[version].status.node_count_since_error += 1;
                    logger.log(LogEvent::Shift { state: next_state });
                    return StepOutcome::Continue;
                }
                Action::Accept => {
                    only_reduces = false;
                    self.accept(version);
                    return StepOutcome::Accepted;
                }
                Action::Recover => {
                    only_reduces = false;
                    return self.recover(table, logger, version, token);
                }
            }
        }

        if only_reduces {
            // All actions were REDUCE: this version's work has been
            // folded forward into the reduction products.
            self.gss.versions[version].halted = true;
        }
        StepOutcome::Continue
    }

    // ---- reduce ----------------------------------------------------

    fn reduce(
        &mut self,
        table: &dyn ParseTable,
        logger: &mut dyn Logger,
        version: usize,
        symbol: Symbol,
        count: usize,
        dynamic_precedence: i32,
        production_id: u16,
        is_fragile: bool,
        end_of_non_terminal_extra: bool,
    ) {
        let multiple_versions_existed = self.gss.live_versions().count() > 1;
        let halted_count = self.gss.versions.iter().filter(|v| v.halted).count();
        let slices = self.gss.pop_paths(version, count);
        let multiple_pop_paths = slices.len() > 1;
        let base_status = self.gss.versions[version].status;
        let base_summary = self.gss.versions[version].summary.clone();

        for mut slice in slices {
            if self.gss.versions.len() >= MAX_VERSION_COUNT + MAX_VERSION_COUNT_OVERFLOW + halted_count {
                continue;
            }
            // pop_paths already returns children in source (left-to-right) order.
            let mut trailing_extras = Vec::new();
            while let Some(last) = slice.children.last() {
                if last.is_extra() {
                    trailing_extras.push(slice.children.pop().unwrap());
                } else {
                    break;
                }
            }
            trailing_extras.reverse();

            let base_state = self.gss.node_state(slice.base);
            let mut parent = self.pool.node(symbol, slice.children, production_id, dynamic_precedence, ParseState(base_state));
            let next_state = table.goto(base_state, symbol);

            // §4.4: "If `end_of_non_terminal_extra` AND `next_state ==
            // state`, mark the parent as `extra`" — this must be checked
            // against the state the reduce actually landed on, before the
            // fragile check below can clear `parse_state` to `NONE`.
            if end_of_non_terminal_extra && next_state == base_state {
                parent.set_extra();
            }

            if is_fragile || multiple_pop_paths || multiple_versions_existed {
                parent.mark_fragile();
            }

            // `parent`'s own `dynamic_precedence()` is already the full
            // recursive sum over everything synthesized onto this version's
            // stack top so far (the children-sum rule applied
            // transitively through every earlier reduce in this lineage),
            // so it doubles as the version's own tiebreak field directly —
            // no separate running total to maintain.
            let parent_precedence = parent.dynamic_precedence();
            let new_id = self.gss.push_node(next_state, Some(parent), &[slice.base]);
            let mut new_version = Version::fresh(new_id);
            new_version.position = self.gss.versions[version].position;
            new_version.status = base_status;
            new_version.status.dynamic_precedence = parent_precedence;
            new_version.summary = base_summary.clone();
            new_version.record_progress(base_state, new_version.position);
            let new_index = self.gss.versions.len();
            self.gss.versions.push(new_version);

            for extra in trailing_extras {
                self.gss.shift(new_index, next_state, extra);
            }

            let mut merged = false;
            for other in 0..new_index {
                if self.gss.versions[other].halted {
                    continue;
                }
                if self.gss.try_merge(new_index, other) {
                    merged = true;
                    break;
                }
            }
            if merged {
                logger.log(LogEvent::Condense { version_count: self.gss.versions.len() });
            } else {
                logger.log(LogEvent::Reduce { symbol, child_count: count as u16 });
            }
        }
    }

    // ---- error handling and recovery --------------------------------

    fn recover(&mut self, table: &dyn ParseTable, logger: &mut dyn Logger, version: usize, lookahead: Subtree) -> StepOutcome {
        logger.log(LogEvent::DetectError);

        if lookahead.symbol() == table.eof_symbol() && self.gss.versions[version].is_in_error() {
            // End-of-input while in error: wrap the remaining stack and
            // accept.
            let remaining = self.gss.pop_paths(version, 4096);
            if let Some(slice) = remaining.into_iter().next() {
                let wrapped = self.pool.node(ERROR_SYMBOL, slice.children, 0, 0, ParseState::NONE);
                self.finished = Some(match self.finished.take() {
                    Some(existing) => select_preferred(existing, wrapped),
                    None => wrapped,
                });
            }
            self.gss.versions[version].halted = true;
            return StepOutcome::Accepted;
        }

        if self.try_missing_token(table, logger, version, &lookahead) {
            return StepOutcome::Continue;
        }

        let snapped_back = self.try_snap_back(table, logger, version, &lookahead);
        if !snapped_back {
            self.skip_lookahead(logger, version, lookahead);
        }
        StepOutcome::Continue
    }

    /// Missing-token insertion: if some symbol `m`'s goto leads to a state
    /// from which `do_all_potential_reductions` can make the lookahead
    /// shiftable, fork a version that pushes a zero-size missing leaf for
    /// `m` instead of recovering destructively. The first candidate that
    /// succeeds wins.
    fn try_missing_token(&mut self, table: &dyn ParseTable, logger: &mut dyn Logger, version: usize, lookahead: &Subtree) -> bool {
        let state = self.gss.node_state(self.gss.versions[version].top);
        for &missing_symbol in table.missing_token_candidates(state) {
            let next_state = table.goto(state, missing_symbol);
            if next_state == state {
                continue;
            }
            if !do_all_potential_reductions(table, next_state, Some(lookahead.symbol())) {
                continue;
            }
            let missing = self.pool.missing_leaf(missing_symbol, Length::ZERO);
            self.gss.shift(version, next_state, missing);
            logger.log(LogEvent::MissingToken { symbol: missing_symbol });
            return true;
        }
        false
    }

    /// Strategy A: pop back to a recent summary state that has an action
    /// for the current lookahead, wrapping what was popped in an ERROR
    /// node.
    fn try_snap_back(&mut self, table: &dyn ParseTable, logger: &mut dyn Logger, version: usize, lookahead: &Subtree) -> bool {
        let summary = self.gss.versions[version].summary.clone();
        let position = self.gss.versions[version].position;
        for entry in summary.iter().rev() {
            if !table.has_actions(entry.state, lookahead.symbol()) {
                continue;
            }
            let slices = self.gss.pop_paths(version, entry.depth as usize);
            let Some(slice) = slices.into_iter().next() else { continue };
            let error_node = self.pool.node(ERROR_SYMBOL, slice.children, 0, 0, ParseState::NONE);

            let delta = position - entry.position;
            let projected_cost = self.gss.versions[version].status.cost
                + entry.depth as i64 * ERROR_COST_PER_SKIPPED_TREE
                + delta.bytes as i64 * ERROR_COST_PER_SKIPPED_CHAR
                + delta.row as i64 * ERROR_COST_PER_SKIPPED_LINE;
            if self.is_dominated(version, projected_cost) {
                continue;
            }
            if self.would_duplicate(entry.state, position) {
                continue;
            }

            let new_id = self.gss.push_node(entry.state, Some(error_node), &[slice.base]);
            let mut new_version = Version::fresh(new_id);
            new_version.position = position;
            new_version.status = self.gss.versions[version].status;
            new_version.status.cost = projected_cost;
            new_version.status.is_in_error = true;
            self.gss.versions.push(new_version);
            logger.log(LogEvent::RecoverToPrevious { state: entry.state, depth: entry.depth });
            return true;
        }
        false
    }

    fn would_duplicate(&self, state: StateId, position: Length) -> bool {
        self.gss
            .live_versions()
            .any(|i| self.gss.node_state(self.gss.versions[i].top) == state && self.gss.versions[i].position == position)
    }

    /// Strategy B: fold the current lookahead into an ERROR_REPEAT node
    /// and keep going. Folds into an existing top-of-stack
    /// ERROR_REPEAT rather than nesting a fresh one each call.
    fn skip_lookahead(&mut self, logger: &mut dyn Logger, version: usize, lookahead: Subtree) {
        if self.gss.versions.len() >= MAX_VERSION_COUNT + MAX_VERSION_COUNT_OVERFLOW {
            self.gss.versions[version].halted = true;
            return;
        }
        let state = self.gss.node_state(self.gss.versions[version].top);
        let error_repeat = self.pool.node(ERROR_REPEAT_SYMBOL, vec![lookahead], 0, 0, ParseState::NONE);
        self.gss.push_error(version, state, error_repeat);
        self.gss.versions[version].status.cost += ERROR_COST_PER_SKIPPED_CHAR;
        self.gss.versions[version].status.node_count_since_error = 0;
        logger.log(LogEvent::SkipToken);
    }

    /// §4.7: before committing a costly recovery choice, check whether
    /// some other live version at or beyond our byte position already
    /// beats it outright, or is `PreferRight` and mergeable with us, or
    /// whether a finished tree already costs no more than the prospective
    /// choice — in any of those cases the choice isn't worth making.
    fn is_dominated(&self, version: usize, projected_cost: i64) -> bool {
        if let Some(finished) = &self.finished {
            let finished_cost =
                parsegraph_core::error_leaf_count(finished) as i64 * ERROR_COST_PER_SKIPPED_TREE;
            if finished_cost <= projected_cost {
                return true;
            }
        }

        let our_position = self.gss.versions[version].position;
        let our_state = self.gss.node_state(self.gss.versions[version].top);
        self.gss.live_versions().any(|other| {
            if other == version {
                return false;
            }
            if self.gss.versions[other].position < our_position {
                return false;
            }
            let mut candidate_status = self.gss.versions[version].status;
            candidate_status.cost = projected_cost;
            match error_status::compare(&candidate_status, &self.gss.versions[other].status) {
                ErrorComparison::TakeRight => true,
                ErrorComparison::PreferRight => {
                    self.gss.node_state(self.gss.versions[other].top) == our_state
                        && self.gss.versions[other].position == our_position
                }
                _ => false,
            }
        })
    }

    // ---- accept -----------------------------------------------------

    fn accept(&mut self, version: usize) {
        let slices = self.gss.pop_paths(version, 4096);
        if let Some(mut slice) = slices.into_iter().next() {
            let mut trailing_extras = Vec::new();
            while let Some(last) = slice.children.last() {
                if last.is_extra() {
                    trailing_extras.push(slice.children.pop().unwrap());
                } else {
                    break;
                }
            }
            trailing_extras.reverse();
            slice.children.extend(trailing_extras);
            let root = self.pool.node(0, slice.children, 0, 0, ParseState::NONE);
            self.finished = Some(match self.finished.take() {
                Some(existing) => select_preferred(existing, root),
                None => root,
            });
        }
        self.gss.versions[version].halted = true;
    }

    // ---- condense -----------------------------------------------------

    fn condense(&mut self, logger: &mut dyn Logger) {
        self.gss.remove_halted();

        let count = self.gss.versions.len();
        let mut removed = vec![false; count];
        for i in 0..count {
            for j in 0..i {
                if removed[j] || removed[i] {
                    continue;
                }
                match error_status::compare(&self.gss.versions[j].status, &self.gss.versions[i].status) {
                    ErrorComparison::TakeLeft => removed[i] = true,
                    ErrorComparison::TakeRight => removed[j] = true,
                    ErrorComparison::PreferLeft | ErrorComparison::None => {
                        if self.gss.try_merge(i, j) {
                            removed[i] = true;
                        }
                    }
                    ErrorComparison::PreferRight => {
                        if !self.gss.try_merge(i, j) {
                            self.gss.versions.swap(i, j);
                        } else {
                            removed[i] = true;
                        }
                    }
                }
            }
        }
        let mut keep_index = 0;
        for i in 0..count {
            if removed[i] {
                continue;
            }
            self.gss.versions.swap(keep_index, i);
            keep_index += 1;
        }
        self.gss.versions.truncate(keep_index);

        if self.gss.versions.len() > MAX_VERSION_COUNT {
            self.gss.versions.sort_by_key(|v| v.status.cost);
            self.gss.versions.truncate(MAX_VERSION_COUNT);
        }

        // Resume the best-performing paused version, if any, and drop the
        // rest.
        let best_paused = self
            .gss
            .versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_paused())
            .min_by_key(|(_, v)| v.status.cost)
            .map(|(i, _)| i);
        if let Some(best_paused) = best_paused {
            self.gss.versions[best_paused].paused_lookahead = None;
            self.gss.versions[best_paused].status.is_in_error = true;
            self.gss.versions[best_paused].status.cost += ERROR_COST_PER_PAUSED_VERSION;
        }
        for (i, v) in self.gss.versions.iter_mut().enumerate() {
            if v.is_paused() && Some(i) != best_paused {
                v.halted = true;
            }
        }
        self.gss.remove_halted();

        logger.log(LogEvent::Condense { version_count: self.gss.versions.len() });
    }

}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

/// §4.9: from `start_state`, repeatedly follow every reduce action
/// recorded in a reached state — without touching the GSS or building any
/// subtree, since only reachability of a shiftable state matters — to see
/// whether `target` becomes shiftable somewhere downstream. Bounded to
/// `MAX_VERSION_COUNT` rounds, matching the spec's iteration cap.
fn do_all_potential_reductions(table: &dyn ParseTable, start_state: StateId, target: Option<Symbol>) -> bool {
    use std::collections::HashSet;

    if let Some(target) = target {
        if table.has_actions(start_state, target) {
            return true;
        }
    }

    let mut frontier = vec![start_state];
    let mut seen: HashSet<StateId> = HashSet::new();
    seen.insert(start_state);

    for _ in 0..MAX_VERSION_COUNT {
        if frontier.is_empty() {
            break;
        }
        let mut next_frontier = Vec::new();
        for state in frontier.drain(..) {
            for action in table.reduce_actions_in_state(state) {
                let Action::Reduce { symbol, .. } = action else { continue };
                let next_state = table.goto(state, symbol);
                if let Some(target) = target {
                    if table.has_actions(next_state, target) {
                        return true;
                    }
                }
                if seen.insert(next_state) {
                    next_frontier.push(next_state);
                }
            }
        }
        frontier = next_frontier;
    }

    target.is_none()
}

/// Leaf reusability test.
fn is_leaf_reusable(candidate: &Subtree, state: StateId, table: &dyn ParseTable) -> bool {
    let lex_mode = table.lex_mode(state);
    if !lex_mode.has_lookahead() {
        return false;
    }
    let symbol = candidate.symbol();

    // Empty tokens are not reusable across states with a different
    // lookahead than the one that produced them, except EOF: a zero-size
    // match's identity depends entirely on which lex mode recognized it,
    // so this has to hold regardless of what `has_actions` says below.
    if candidate.size() == Length::ZERO && symbol != table.eof_symbol() {
        let produced_in = candidate.parse_state();
        if produced_in.is_none() || table.lex_mode(produced_in.0) != lex_mode {
            return false;
        }
    }

    // A keyword-fallback leaf's symbol was rewritten under one state's
    // reserved-word set; reusing it in a different state would silently
    // carry that state's fallback decision somewhere it was never made.
    if candidate.flags().is_keyword && candidate.parse_state() != ParseState(state) {
        return false;
    }

    if table.has_actions(state, symbol) {
        return true;
    }
    if candidate.size() != Length::ZERO && !lex_mode.has_external_lexing() && table.is_reusable_leaf(state, symbol) {
        return true;
    }
    candidate.size() == Length::ZERO && symbol == table.eof_symbol()
}

/// Subtree selection, used where the driver needs a whole-tree preference
/// between two finished parses (accept, end-of-input wrap). Delegates to
/// the same §4.5 rule (`parsegraph_core::prefer_candidate`) the GSS merge
/// path uses for same-symbol reduce slices, so a finished-tree choice and
/// an in-flight merge choice are never resolved by two different rules.
fn select_preferred(existing: Subtree, candidate: Subtree) -> Subtree {
    if parsegraph_core::prefer_candidate(&existing, &candidate) { candidate } else { existing }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;

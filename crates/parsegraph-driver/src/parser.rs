//! The orchestrator.
//!
//! `Parser` is the embedder-facing handle: it owns a `Driver` plus the
//! language it was last pointed at, and turns `parse`/`parse_with_options`
//! into repeated `Driver::sweep` calls, checking for cancellation between
//! sweeps the way a bytecode VM checks its fuel counter between
//! instructions.

use std::sync::atomic::Ordering;
use std::time::Instant;

use parsegraph_core::Tree;
use parsegraph_table::ParseTable;

use crate::driver::{Driver, SweepOutcome};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::logger::LogEvent;
use crate::options::{ParseOptions, ProgressSignal};
use crate::scanner::{ExternalScanner, NullScanner};

/// What `parse`/`parse_with_options` produced.
pub enum ParseOutcome {
    /// A tree, possibly containing error nodes.
    Finished(Tree),
    /// Canceled via flag, deadline, or progress callback. The
    /// parser's internal state is preserved; call `parse` again with the
    /// same language and input to resume.
    Canceled,
}

/// Owns a [`Driver`] and drives it to completion against a caller-supplied
/// table, lexer, and (optional) external scanner.
///
/// A thin shell around the real engine (`Driver`) that owns just enough
/// extra state — here, "was this parse freshly begun or is it resuming" —
/// to present a clean call/resume surface.
pub struct Parser {
    driver: Driver,
    in_progress: bool,
}

impl Parser {
    pub fn new() -> Parser {
        Parser { driver: Driver::new(), in_progress: false }
    }

    pub fn pool_stats(&self) -> parsegraph_core::PoolStats {
        self.driver.pool_stats()
    }

    /// Parse `source` against `table`, with no previous tree and default
    /// options.
    pub fn parse(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
    ) -> Result<ParseOutcome, ParseError> {
        self.parse_with_options(table, lexer, scanner, &mut ParseOptions::default())
    }

    /// Parse with full control over incremental reuse, cancellation, and
    /// logging.
    ///
    /// A call that resumes a canceled parse (`in_progress` already true)
    /// ignores `options.previous_tree`: the driver's GSS and reusable
    /// cursor already hold the live state from before cancellation, and
    /// re-seeding from a previous tree would discard the very work this
    /// call is meant to continue.
    pub fn parse_with_options(
        &mut self,
        table: &dyn ParseTable,
        lexer: &mut dyn Lexer,
        scanner: &mut dyn ExternalScanner,
        options: &mut ParseOptions,
    ) -> Result<ParseOutcome, ParseError> {
        if !self.in_progress {
            self.driver.begin(options.previous_tree.as_ref());
            self.in_progress = true;
        }

        let mut ops_since_check: u32 = 0;
        loop {
            match self.driver.sweep(table, lexer, scanner, options.logger.as_mut()) {
                SweepOutcome::Done => {
                    options.logger.log(LogEvent::Done);
                    self.in_progress = false;
                    let included = options.included_ranges.clone();
                    let tree = self.driver.take_finished(included).expect("sweep reported Done");
                    return Ok(ParseOutcome::Finished(tree));
                }
                SweepOutcome::ScannerFailed(err) => {
                    self.in_progress = false;
                    return Err(ParseError::Scanner(err));
                }
                SweepOutcome::Continue => {}
            }

            ops_since_check += 1;
            if ops_since_check < options.budget.ops_per_check {
                continue;
            }
            ops_since_check = 0;

            if let Some(flag) = &options.cancellation_flag {
                if flag.load(Ordering::Relaxed) {
                    return Ok(ParseOutcome::Canceled);
                }
            }
            if let Some(deadline) = options.deadline {
                if Instant::now() >= deadline {
                    return Ok(ParseOutcome::Canceled);
                }
            }
            if let Some(callback) = &mut options.progress_callback {
                if callback(ops_since_check) == ProgressSignal::Cancel {
                    return Ok(ParseOutcome::Canceled);
                }
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;
    use crate::lexer::TextLexer;
    use parsegraph_table::{Action, LexMode, StaticParseTable};

    /// `S -> a`: shift byte `a` from the start state, reduce to `S` at
    /// end-of-input, accept.
    fn trivial_table() -> StaticParseTable {
        let lookahead = LexMode { lex_state: 0, external_lex_state: 0 };
        StaticParseTable::builder()
            .lex_mode(1, lookahead)
            .lex_mode(2, lookahead)
            .lex_mode(3, lookahead)
            .action(1, b'a' as u16, Action::Shift { state: 2, extra: false, repetition: false })
            .action(
                2,
                parsegraph_core::END_SYMBOL,
                Action::Reduce { symbol: 100, child_count: 1, dynamic_precedence: 0, production_id: 0, is_fragile: false, end_of_non_terminal_extra: false },
            )
            .goto(1, 100, 3)
            .action(3, parsegraph_core::END_SYMBOL, Action::Accept)
            .build()
    }

    #[test]
    fn parses_a_trivial_accept() {
        let table = trivial_table();
        let mut lexer = TextLexer::new("a");
        let mut scanner = NullScanner;
        let mut parser = Parser::new();
        let outcome = parser.parse(&table, &mut lexer, &mut scanner).unwrap();
        match outcome {
            ParseOutcome::Finished(tree) => assert_eq!(tree.root.symbol(), 0),
            ParseOutcome::Canceled => panic!("expected a finished tree"),
        }
    }

    #[test]
    fn cancellation_flag_stops_the_parse_and_preserves_state() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicBool;

        let table = trivial_table();
        let mut lexer = TextLexer::new("a");
        let mut scanner = NullScanner;
        let mut parser = Parser::new();
        let flag = Arc::new(AtomicBool::new(true));
        let mut options = ParseOptions::builder()
            .cancellation_flag(flag)
            .budget(crate::options::ParseBudget { ops_per_check: 0 })
            .build();
        let outcome = parser.parse_with_options(&table, &mut lexer, &mut scanner, &mut options).unwrap();
        assert!(matches!(outcome, ParseOutcome::Canceled));
        assert!(parser.in_progress);
    }
}

//! Per-parse configuration, built as a plain struct plus a chainable
//! builder.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use parsegraph_core::{Range, Tree};

use crate::logger::{Logger, NoopLogger};

/// How often (in driver work-units) the cooperative-cancellation checks
/// run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseBudget {
    pub ops_per_check: u32,
}

impl Default for ParseBudget {
    fn default() -> Self {
        ParseBudget { ops_per_check: parsegraph_table::limits::OP_COUNT_PER_PARSER_TIMEOUT_CHECK }
    }
}

/// What a progress callback returns: `Continue` lets the parse keep
/// going, `Cancel` requests the same cooperative early-return a
/// cancellation flag or deadline produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressSignal {
    Continue,
    Cancel,
}

/// Per-parse configuration. Both the cancellation-flag path and the
/// progress-callback path are kept side by side; the flag-based path is
/// the older of the two, but removing either would break resume for
/// embedders relying on just one (see DESIGN.md).
pub struct ParseOptions {
    pub previous_tree: Option<Tree>,
    pub included_ranges: Vec<Range>,
    pub cancellation_flag: Option<Arc<AtomicBool>>,
    pub deadline: Option<Instant>,
    pub progress_callback: Option<Box<dyn FnMut(u32) -> ProgressSignal>>,
    pub budget: ParseBudget,
    pub logger: Box<dyn Logger>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            previous_tree: None,
            included_ranges: Vec::new(),
            cancellation_flag: None,
            deadline: None,
            progress_callback: None,
            budget: ParseBudget::default(),
            logger: Box::new(NoopLogger),
        }
    }
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }
}

/// Chainable builder for [`ParseOptions`].
#[derive(Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn previous_tree(mut self, tree: Tree) -> Self {
        self.options.previous_tree = Some(tree);
        self
    }

    pub fn included_ranges(mut self, ranges: Vec<Range>) -> Self {
        self.options.included_ranges = ranges;
        self
    }

    pub fn cancellation_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.options.cancellation_flag = Some(flag);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn progress_callback(mut self, callback: impl FnMut(u32) -> ProgressSignal + 'static) -> Self {
        self.options.progress_callback = Some(Box::new(callback));
        self
    }

    pub fn budget(mut self, budget: ParseBudget) -> Self {
        self.options.budget = budget;
        self
    }

    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.options.logger = Box::new(logger);
        self
    }

    pub fn build(self) -> ParseOptions {
        self.options
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn default_options_have_no_previous_tree_and_default_budget() {
        let options = ParseOptions::default();
        assert!(options.previous_tree.is_none());
        assert_eq!(options.budget.ops_per_check, 100);
    }

    #[test]
    fn builder_sets_a_deadline() {
        let options = ParseOptions::builder().timeout(Duration::from_millis(10)).build();
        assert!(options.deadline.is_some());
    }

    #[test]
    fn builder_sets_a_progress_callback() {
        let mut options =
            ParseOptions::builder().progress_callback(|_count| ProgressSignal::Cancel).build();
        let callback = options.progress_callback.as_mut().unwrap();
        assert_eq!(callback(0), ProgressSignal::Cancel);
    }
}

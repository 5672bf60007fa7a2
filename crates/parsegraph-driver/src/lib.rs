#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The incremental, error-recovering GLR parser driver.
//!
//! This crate owns the hard part: the graph-structured parse stack, the
//! lexer/external-scanner coordination loop, subtree reuse from a prior
//! tree, ambiguity via multiple live GSS versions, error recovery, and the
//! post-parse rebalance pass. The compiled table it drives against
//! ([`parsegraph_table::ParseTable`]) and the subtree data model it builds
//! ([`parsegraph_core::Subtree`]) are both external collaborators from
//! this crate's point of view.

mod driver;
mod error;
mod error_status;
mod gss;
mod lexer;
mod logger;
mod options;
mod parser;
mod reusable_node;
mod scanner;
mod token_cache;

pub use error::{ParseError, ScannerError};
pub use lexer::{LexedSpan, Lexer, TextLexer};
pub use logger::{LogEvent, Logger, NoopLogger, TextLogger};
pub use options::{ParseBudget, ParseOptions, ParseOptionsBuilder, ProgressSignal};
pub use parser::{ParseOutcome, Parser};
pub use scanner::{ExternalScanner, ExternalScannerHost, NullScanner};

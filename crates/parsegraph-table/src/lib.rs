#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The read-only compiled parse-table contract for the parsegraph engine.
//!
//! This crate states *what* a compiled grammar must expose to the driver
//! ([`ParseTable`], [`Action`], [`LexMode`]) and the shared error-cost/size
//! constants both the driver and any table compiler agree on
//! ([`limits`]). It ships exactly one concrete table, [`StaticParseTable`],
//! for tests and embedders who hand-assemble a small grammar instead of
//! running a real table compiler — generating tables from a grammar
//! definition is out of scope.

mod action;
mod external_scanner;
mod lex_mode;
pub mod limits;
mod parse_table;
mod static_table;

pub use action::Action;
pub use external_scanner::ExternalTokenMap;
pub use lex_mode::{LexMode, NO_LOOKAHEAD};
pub use parse_table::{ParseTable, START_STATE, StateId};
pub use static_table::{StaticParseTable, StaticParseTableBuilder};

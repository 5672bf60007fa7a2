#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for the parsegraph incremental parser engine.
//!
//! This crate owns the *value* types that the rest of the workspace moves
//! around: [`Subtree`] (a refcounted, immutable syntax node), [`Length`]/
//! [`Point`] (byte + line/column extents), and [`Tree`] (a finished parse
//! result plus the book-keeping needed to reuse it on the next parse).
//!
//! None of these types know about parse tables, lexers, or the GSS — those
//! live in `parsegraph-table` and `parsegraph-driver`. This crate is the
//! "leaf" of the workspace: it has no dependency on either.

mod invariants;
mod length;
mod pool;
mod subtree;
mod tree;

pub use length::{Length, Point};
pub use pool::{PoolStats, SubtreePool};
pub use subtree::{
    ERROR_REPEAT_SYMBOL, ERROR_SYMBOL, END_SYMBOL, ExternalScannerStateId, LeafData, NodeData,
    ParseState, Subtree, SubtreeFlags, Symbol, error_leaf_count, prefer_candidate,
};
pub use tree::{InputEdit, Range, Tree};

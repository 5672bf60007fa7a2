//! Compile-time error-cost and sizing constants.
//!
//! These are the numbers a real parse-table compiler would bake into the
//! generated table alongside the grammar-specific data; we pin them here as
//! workspace-wide constants the way tree-sitter itself does, since nothing
//! grammar-specific overrides them yet (see DESIGN.md for the open-question
//! note).

/// Flat penalty charged per subtree an error-recovery strategy skips over
/// or wraps (snap-back and skip recovery, and the paused-version penalty).
pub const ERROR_COST_PER_SKIPPED_TREE: i64 = 100;

/// Flat penalty per skipped byte of input (the snap-back cost
/// projection: "Δbytes × per-char").
pub const ERROR_COST_PER_SKIPPED_CHAR: i64 = 3;

/// Flat penalty per skipped source line ("Δrows × per-line").
pub const ERROR_COST_PER_SKIPPED_LINE: i64 = 30;

/// A strictly-lower-cost version only *takes* (rather than merely
/// *prefers*) when the weighted cost gap exceeds this.
pub const MAX_COST_DIFFERENCE: i64 = 18 * ERROR_COST_PER_SKIPPED_TREE;

/// A paused version contributes this flat penalty to its error cost for as
/// long as it stays paused.
pub const ERROR_COST_PER_PAUSED_VERSION: i64 = ERROR_COST_PER_SKIPPED_TREE;

/// Soft cap on live GSS versions after a condense pass.
pub const MAX_VERSION_COUNT: usize = 6;

/// How far a reduce is allowed to transiently overshoot
/// [`MAX_VERSION_COUNT`] before the condense pass prunes back down.
pub const MAX_VERSION_COUNT_OVERFLOW: usize = 4;

/// Capped depth of the per-version recovery summary.
pub const MAX_SUMMARY_DEPTH: usize = 16;

/// How many units of driver work elapse between cooperative
/// cancellation/timeout/progress checks.
pub const OP_COUNT_PER_PARSER_TIMEOUT_CHECK: u32 = 100;

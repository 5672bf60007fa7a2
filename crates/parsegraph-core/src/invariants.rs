//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::Subtree;

/// Panics if `subtree`'s declared size does not match the summed length of
/// its children. Only ever reached from `debug_assert!` call sites in
/// `subtree.rs`.
pub(crate) fn ensure_footprint_consistent(subtree: &Subtree) {
    if let Subtree::Node(data) = subtree {
        let children_total = data.children.iter().map(Subtree::total_length).sum();
        assert_eq!(
            data.size, children_total,
            "subtree {:?}: declared size does not match sum of children lengths",
            data.symbol
        );
    }
}

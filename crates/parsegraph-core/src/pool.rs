//! The external "subtree pool" collaborator.
//!
//! In a manually-refcounted host, the pool is the sole allocator and
//! deallocator of subtrees. In Rust that job falls to `Rc`'s own refcount,
//! so `SubtreePool` doesn't allocate anything itself — it exists to give
//! the driver one place to call `leaf`/`error_leaf`/`node`/`missing_leaf`
//! through, and to keep a running count of how many of each kind have been
//! produced during a parse, which the orchestrator surfaces for diagnostics
//! the same way a VM's fuel tracker surfaces instruction counts.

use crate::length::Length;
use crate::subtree::{ExternalScannerStateId, ParseState, Subtree, Symbol};

/// Running counts of subtrees vended by a [`SubtreePool`], reset at the
/// start of every `parse` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub leaves_created: u64,
    pub error_leaves_created: u64,
    pub missing_leaves_created: u64,
    pub nodes_created: u64,
}

/// Vends subtrees and tracks how many were created. Holds no subtree
/// storage of its own; every `Subtree` it returns owns its own `Rc`.
#[derive(Debug, Default)]
pub struct SubtreePool {
    stats: PoolStats,
}

impl SubtreePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Reset the running counts. Called by the orchestrator at the start of
    /// each `parse`/`parse_with_options` invocation.
    pub fn reset_stats(&mut self) {
        self.stats = PoolStats::default();
    }

    pub fn leaf(
        &mut self,
        symbol: Symbol,
        padding: Length,
        size: Length,
        lookahead_bytes: u32,
        parse_state: ParseState,
    ) -> Subtree {
        self.stats.leaves_created += 1;
        Subtree::leaf(symbol, padding, size, lookahead_bytes, parse_state)
    }

    pub fn external_leaf(
        &mut self,
        symbol: Symbol,
        padding: Length,
        size: Length,
        parse_state: ParseState,
        scanner_state: ExternalScannerStateId,
        state_changed: bool,
    ) -> Subtree {
        self.stats.leaves_created += 1;
        Subtree::external_leaf(symbol, padding, size, parse_state, scanner_state, state_changed)
    }

    pub fn error_leaf(&mut self, padding: Length, size: Length) -> Subtree {
        self.stats.error_leaves_created += 1;
        Subtree::error_leaf(padding, size)
    }

    pub fn missing_leaf(&mut self, symbol: Symbol, padding: Length) -> Subtree {
        self.stats.missing_leaves_created += 1;
        Subtree::missing_leaf(symbol, padding)
    }

    pub fn node(
        &mut self,
        symbol: Symbol,
        children: Vec<Subtree>,
        production_id: u16,
        own_dynamic_precedence: i32,
        parse_state: ParseState,
    ) -> Subtree {
        self.stats.nodes_created += 1;
        Subtree::node(symbol, children, production_id, own_dynamic_precedence, parse_state)
    }
}

#[cfg(test)]
mod pool_tests {
    use super::*;

    #[test]
    fn counts_each_kind_separately() {
        let mut pool = SubtreePool::new();
        pool.leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
        pool.error_leaf(Length::ZERO, Length::new(1, 0, 1));
        pool.missing_leaf(2, Length::ZERO);
        let stats = pool.stats();
        assert_eq!(stats.leaves_created, 1);
        assert_eq!(stats.error_leaves_created, 1);
        assert_eq!(stats.missing_leaves_created, 1);
        assert_eq!(stats.nodes_created, 0);
    }

    #[test]
    fn reset_stats_clears_counts() {
        let mut pool = SubtreePool::new();
        pool.leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
        pool.reset_stats();
        assert_eq!(pool.stats(), PoolStats::default());
    }
}

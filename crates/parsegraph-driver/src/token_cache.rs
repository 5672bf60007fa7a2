//! Per-position lex memoization.
//!
//! Two GSS versions that reach the same byte offset in the same lex mode
//! need not re-lex; they share whatever this cache holds for that offset.

use parsegraph_core::{ExternalScannerStateId, Subtree};

/// Caches the most recently lexed token, keyed by its starting byte
/// offset. Invalidated on any cursor jump that isn't "continue from where
/// we left off"; reuse is only promised at the same byte index.
#[derive(Debug, Default)]
pub struct TokenCache {
    byte_index: Option<u32>,
    token: Option<Subtree>,
    last_external_token: Option<ExternalScannerStateId>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached token if it was lexed starting at `byte_index`.
    pub fn get(&self, byte_index: u32) -> Option<&Subtree> {
        if self.byte_index == Some(byte_index) { self.token.as_ref() } else { None }
    }

    pub fn store(&mut self, byte_index: u32, token: Subtree) {
        self.byte_index = Some(byte_index);
        self.token = Some(token);
    }

    /// Remembers the external scanner state that produced the last
    /// external token, so a later version resuming external lexing at the
    /// same point can `deserialize` from it.
    pub fn record_external_token(&mut self, state: ExternalScannerStateId) {
        self.last_external_token = Some(state);
    }

    pub fn last_external_token(&self) -> Option<&ExternalScannerStateId> {
        self.last_external_token.as_ref()
    }

    pub fn clear(&mut self) {
        self.byte_index = None;
        self.token = None;
        self.last_external_token = None;
    }
}

#[cfg(test)]
mod token_cache_tests {
    use super::*;
    use parsegraph_core::Length;

    fn leaf_at(start: u32) -> Subtree {
        Subtree::leaf(1, Length::new(start, 0, start), Length::new(1, 0, 1), 0, Default::default())
    }

    #[test]
    fn miss_on_unseen_index() {
        let cache = TokenCache::new();
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn hit_on_matching_index_only() {
        let mut cache = TokenCache::new();
        cache.store(4, leaf_at(4));
        assert!(cache.get(4).is_some());
        assert!(cache.get(5).is_none());
    }

    #[test]
    fn clear_forces_miss() {
        let mut cache = TokenCache::new();
        cache.store(0, leaf_at(0));
        cache.clear();
        assert!(cache.get(0).is_none());
    }

    #[test]
    fn records_external_token_state() {
        let mut cache = TokenCache::new();
        assert!(cache.last_external_token().is_none());
        cache.record_external_token(ExternalScannerStateId::new(vec![1, 2, 3]));
        assert_eq!(cache.last_external_token().unwrap().as_bytes(), &[1, 2, 3]);
    }
}

//! The graph-structured parse stack.
//!
//! An append-only arena with parent indices, the same "cactus stack" idiom
//! used for ordinary call-frame stacks, generalized from one linear call
//! stack to a DAG with several live top pointers (versions) and an
//! explicit merge operation: GLR additionally needs stack merging that a
//! single call-frame arena never does.

use parsegraph_core::{ExternalScannerStateId, Length, Subtree, prefer_candidate};
use parsegraph_table::StateId;

use crate::error_status::ErrorStatus;

/// Index of a node in the arena. Never a raw pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GssNodeId(u32);

/// One frame of the cactus stack: a parser state plus the subtree that
/// was pushed to reach it, and the (possibly several) parents it was
/// pushed onto — more than one parent only after a merge.
#[derive(Debug)]
struct GssNode {
    state: StateId,
    /// `None` only for the synthetic root below state 1.
    subtree: Option<Subtree>,
    parents: Vec<GssNodeId>,
}

/// A capped history entry used by Strategy A snap-back recovery.
#[derive(Clone, Copy, Debug)]
pub struct SummaryEntry {
    pub state: StateId,
    pub depth: u32,
    pub position: Length,
}

/// One parse branch.
#[derive(Debug)]
pub struct Version {
    pub top: GssNodeId,
    pub position: Length,
    pub status: ErrorStatus,
    pub summary: Vec<SummaryEntry>,
    /// Set while recovering, so Strategy B can fold a run of skipped
    /// tokens into one ERROR_REPEAT node.
    pub error_repeat_top: Option<GssNodeId>,
    /// A paused version keeps its rejected lookahead around so condense
    /// can decide whether to resume it.
    pub paused_lookahead: Option<Subtree>,
    pub last_external_token: Option<ExternalScannerStateId>,
    pub halted: bool,
}

impl Version {
    pub(crate) fn fresh(top: GssNodeId) -> Version {
        Version {
            top,
            position: Length::ZERO,
            status: ErrorStatus::default(),
            summary: Vec::new(),
            error_repeat_top: None,
            paused_lookahead: None,
            last_external_token: None,
            halted: false,
        }
    }

    pub fn is_in_error(&self) -> bool {
        self.status.is_in_error
    }

    pub fn is_paused(&self) -> bool {
        self.paused_lookahead.is_some()
    }

    /// Record that the stack just advanced past `(state, position)`: every
    /// existing summary entry is now one subtree deeper than it was, and a
    /// fresh depth-1 entry is added for the frame just left behind. Keeps
    /// at most `MAX_SUMMARY_DEPTH` entries, oldest first.
    pub fn record_progress(&mut self, state: StateId, position: Length) {
        for entry in &mut self.summary {
            entry.depth += 1;
        }
        self.summary.push(SummaryEntry { state, depth: 1, position });
        if self.summary.len() > parsegraph_table::limits::MAX_SUMMARY_DEPTH {
            self.summary.remove(0);
        }
    }
}

/// One slice produced by popping `count` subtrees from a version: the
/// subtrees in source order (bottom to top discarded — here top to
/// bottom, reversed by the caller) and the GSS node the slice bottoms
/// out at.
pub struct PopSlice {
    pub children: Vec<Subtree>,
    pub base: GssNodeId,
}

/// Arena of GSS nodes plus the live versions pointing into it.
#[derive(Debug, Default)]
pub struct Gss {
    nodes: Vec<GssNode>,
    pub versions: Vec<Version>,
}

impl Gss {
    pub fn new() -> Gss {
        Gss::default()
    }

    /// Start a single fresh version rooted below the table's start state.
    pub fn reset(&mut self, start_state: StateId) {
        self.nodes.clear();
        self.versions.clear();
        let root = self.push_node(start_state, None, &[]);
        self.versions.push(Version::fresh(root));
    }

    pub fn node_state(&self, id: GssNodeId) -> StateId {
        self.nodes[id.0 as usize].state
    }

    pub fn node_subtree(&self, id: GssNodeId) -> Option<&Subtree> {
        self.nodes[id.0 as usize].subtree.as_ref()
    }

    /// Push a new node at `state` holding `subtree`, linked above every
    /// node in `parents` (more than one parent only ever results from a
    /// prior merge of a shared suffix).
    pub fn push_node(&mut self, state: StateId, subtree: Option<Subtree>, parents: &[GssNodeId]) -> GssNodeId {
        let id = GssNodeId(self.nodes.len() as u32);
        self.nodes.push(GssNode { state, subtree, parents: parents.to_vec() });
        id
    }

    /// Shift one token onto `version`'s top at `next_state`.
    pub fn shift(&mut self, version: usize, next_state: StateId, token: Subtree) {
        let token_len = token.total_length();
        let prior_top = self.versions[version].top;
        let prior_state = self.node_state(prior_top);
        let prior_position = self.versions[version].position;
        let new_top = self.push_node(next_state, Some(token), &[prior_top]);
        self.versions[version].top = new_top;
        self.versions[version].position = self.versions[version].position + token_len;
        self.versions[version].record_progress(prior_state, prior_position);
    }

    /// Pop `count` subtrees from `version`'s top, one slice per distinct
    /// path through the DAG. Each slice's children are returned
    /// in source (left-to-right) order.
    pub fn pop_paths(&self, version: usize, count: usize) -> Vec<PopSlice> {
        let top = self.versions[version].top;
        self.pop_from(top, count)
    }

    fn pop_from(&self, node: GssNodeId, count: usize) -> Vec<PopSlice> {
        let data = &self.nodes[node.0 as usize];
        // The synthetic root (pushed by `reset` with no subtree) ends every
        // path, whether or not `count` subtrees have been popped yet — a
        // caller asking to pop more than the stack actually holds, like
        // `accept`'s and end-of-input recovery's "pop everything" sentinel
        // count, simply stops there instead of panicking or losing the slice.
        if count == 0 || data.subtree.is_none() {
            return vec![PopSlice { children: Vec::new(), base: node }];
        }
        let subtree = data.subtree.clone().expect("checked above");
        let mut results = Vec::new();
        for &parent in &data.parents {
            for mut slice in self.pop_from(parent, count - 1) {
                slice.children.push(subtree.clone());
                results.push(slice);
            }
        }
        results
    }

    /// Merge `version`'s top node into `onto`'s top node if their states
    /// match, by adding `version`'s parent set to `onto`'s node and
    /// retargeting `version` to share `onto`'s top.
    ///
    /// When both tops carry a subtree — the common case, since a merge at
    /// matching `(state, position)` usually follows two different reduce
    /// paths landing on the same frame — the §4.5 subtree-selection rule
    /// decides which of the two survives as the shared node's subtree
    /// rather than always keeping `onto`'s by insertion order.
    ///
    /// Returns whether a merge happened.
    pub fn try_merge(&mut self, version: usize, onto: usize) -> bool {
        let a = self.versions[version].top;
        let b = self.versions[onto].top;
        if self.nodes[a.0 as usize].state != self.nodes[b.0 as usize].state {
            return false;
        }
        if self.versions[version].position != self.versions[onto].position {
            return false;
        }

        if let (Some(existing), Some(candidate)) =
            (self.nodes[b.0 as usize].subtree.clone(), self.nodes[a.0 as usize].subtree.clone())
        {
            if prefer_candidate(&existing, &candidate) {
                self.nodes[b.0 as usize].subtree = Some(candidate);
            }
        }

        let extra_parents = self.nodes[a.0 as usize].parents.clone();
        let target = &mut self.nodes[b.0 as usize];
        for p in extra_parents {
            if !target.parents.contains(&p) {
                target.parents.push(p);
            }
        }
        self.versions[version].top = b;
        self.versions[version].halted = true;
        true
    }

    /// Push a GSS node wrapping `error` at `state` on top of `version`,
    /// tracking an in-error status.
    pub fn push_error(&mut self, version: usize, state: StateId, error: Subtree) {
        self.shift(version, state, error);
        self.versions[version].status.is_in_error = true;
    }

    pub fn live_versions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.versions.len()).filter(|&i| !self.versions[i].halted)
    }

    pub fn remove_halted(&mut self) {
        self.versions.retain(|v| !v.halted);
    }
}

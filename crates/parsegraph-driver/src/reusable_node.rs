//! The cursor that walks the previous parse's tree in source order,
//! offering up unchanged subtrees for reuse.
//!
//! Positions are tracked in the *new* (post-edit) coordinate space: the
//! tree itself was already shifted by [`parsegraph_core::Tree::edit`], so
//! walking it left to right and comparing against the driver's current
//! byte offset is enough to find candidates. A subtree's tracked position
//! is where its own padding begins, matching `Tree::edit`'s `node_start`
//! convention — the position after padding (its content start) is
//! `start + node.padding()`.

use parsegraph_core::{ExternalScannerStateId, Length, Subtree, Tree};

/// An ancestor the cursor has descended through: which child comes next,
/// and the position (node-start convention) that child begins at.
struct Frame {
    node: Subtree,
    next_child_index: usize,
    next_child_start: Length,
}

/// Walks a previous tree's subtrees in left-to-right order, handing the
/// driver a candidate for reuse at each step.
pub struct ReusableNode {
    stack: Vec<Frame>,
    current: Option<(Subtree, Length)>,
}

impl ReusableNode {
    /// Start a cursor over `tree`, or an empty one if there is no previous
    /// tree (the common "fresh parse" case).
    pub fn new(tree: Option<&Tree>) -> Self {
        match tree {
            Some(tree) => ReusableNode { stack: Vec::new(), current: Some((tree.root.clone(), Length::ZERO)) },
            None => ReusableNode::empty(),
        }
    }

    /// An empty cursor, for parses with no previous tree.
    pub fn empty() -> Self {
        ReusableNode { stack: Vec::new(), current: None }
    }

    pub fn reset(&mut self, tree: Option<&Tree>) {
        *self = ReusableNode::new(tree);
    }

    /// The subtree currently offered for reuse and its start position, if
    /// the cursor has not run past the end of the tree.
    pub fn candidate(&self) -> Option<(&Subtree, Length)> {
        self.current.as_ref().map(|(node, start)| (node, *start))
    }

    /// Replace the current candidate with its first child, narrowing the
    /// search toward a leaf. No-op on a leaf.
    pub fn descend(&mut self) {
        let Some((node, start)) = self.current.clone() else { return };
        if node.child_count() == 0 {
            return;
        }
        let content_start = start + node.padding();
        self.stack.push(Frame { node, next_child_index: 0, next_child_start: content_start });
        self.advance_within_top_frame();
    }

    /// Move past the current candidate to its next sibling, or pop back up
    /// to the parent's next sibling if there is none.
    pub fn advance(&mut self) {
        self.advance_within_top_frame();
    }

    fn advance_within_top_frame(&mut self) {
        loop {
            let Some(frame) = self.stack.last() else {
                self.current = None;
                return;
            };
            if frame.next_child_index >= frame.node.child_count() {
                self.stack.pop();
                continue;
            }
            let frame = self.stack.last_mut().expect("checked above");
            let child = frame.node.children()[frame.next_child_index].clone();
            let child_start = frame.next_child_start;
            frame.next_child_index += 1;
            frame.next_child_start = child_start + child.total_length();
            self.current = Some((child, child_start));
            return;
        }
    }

    /// Skip forward until the candidate starts at or after `target`,
    /// descending into nodes that straddle it rather than skipping them
    /// wholesale.
    pub fn seek(&mut self, target: Length) {
        loop {
            let Some((node, start)) = self.current.clone() else { return };
            let end = start + node.total_length();
            if end.bytes <= target.bytes {
                self.advance();
                continue;
            }
            if start.bytes < target.bytes && node.child_count() > 0 {
                self.descend();
                continue;
            }
            return;
        }
    }

    /// The external scanner state carried by the candidate's first leaf,
    /// if any.
    pub fn external_state(&self) -> Option<&ExternalScannerStateId> {
        self.current.as_ref().and_then(|(node, _)| node.first_leaf().external_scanner_state())
    }
}

#[cfg(test)]
mod reusable_node_tests {
    use super::*;
    use parsegraph_core::Range;

    fn leaf(symbol: u16, padding: Length, size: Length) -> Subtree {
        Subtree::leaf(symbol, padding, size, 0, Default::default())
    }

    fn node(symbol: u16, children: Vec<Subtree>) -> Subtree {
        Subtree::node(symbol, children, 0, 0, Default::default())
    }

    fn sample_tree() -> Tree {
        // root(a b) where a and b are single-byte leaves.
        let a = leaf(1, Length::ZERO, Length::new(1, 0, 1));
        let b = leaf(2, Length::ZERO, Length::new(1, 0, 1));
        let root = node(100, vec![a, b]);
        Tree::new(root, vec![Range::whole_document(Length::new(2, 0, 2))])
    }

    #[test]
    fn empty_cursor_has_no_candidate() {
        let cursor = ReusableNode::empty();
        assert!(cursor.candidate().is_none());
    }

    #[test]
    fn fresh_cursor_offers_the_root() {
        let tree = sample_tree();
        let cursor = ReusableNode::new(Some(&tree));
        let (node, start) = cursor.candidate().unwrap();
        assert_eq!(node.symbol(), 100);
        assert_eq!(start, Length::ZERO);
    }

    #[test]
    fn descend_then_advance_walks_children_in_order() {
        let tree = sample_tree();
        let mut cursor = ReusableNode::new(Some(&tree));
        cursor.descend();
        assert_eq!(cursor.candidate().unwrap().0.symbol(), 1);
        cursor.advance();
        assert_eq!(cursor.candidate().unwrap().0.symbol(), 2);
        cursor.advance();
        assert!(cursor.candidate().is_none());
    }

    #[test]
    fn seek_descends_into_straddling_node() {
        let tree = sample_tree();
        let mut cursor = ReusableNode::new(Some(&tree));
        cursor.seek(Length::new(1, 0, 1));
        let (node, start) = cursor.candidate().unwrap();
        assert_eq!(node.symbol(), 2);
        assert_eq!(start, Length::new(1, 0, 1));
    }

    #[test]
    fn reset_clears_to_a_fresh_cursor() {
        let tree = sample_tree();
        let mut cursor = ReusableNode::new(Some(&tree));
        cursor.descend();
        cursor.reset(Some(&tree));
        assert_eq!(cursor.candidate().unwrap().0.symbol(), 100);
    }
}

//! The finished parse result, and applying an edit to it before reparse.
//!
//! Incremental reparsing needs some mechanism for turning "a previous tree
//! plus an edit description" into "a previous tree with the edited region
//! flagged for reparse", so that reverting an edit recovers the original
//! tree shape and only the touched region gets relexed. That mechanism is
//! `Tree::edit`, modeled on tree-sitter's own `ts_tree_edit`: shift
//! everything after the edit by the length delta, and mark `has_changes` on
//! every subtree (and its ancestors, implicitly, since we rebuild parents
//! bottom-up) whose span intersects the edited range.

use crate::length::Length;
use crate::subtree::Subtree;

/// A byte range of the input that should actually be parsed; bytes outside
/// every included range are skipped over by the lexer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub start: Length,
    pub end: Length,
}

impl Range {
    pub fn whole_document(source_length: Length) -> Range {
        Range { start: Length::ZERO, end: source_length }
    }

    fn intersects(&self, other_start: Length, other_end: Length) -> bool {
        self.start.bytes < other_end.bytes && other_start.bytes < self.end.bytes
    }
}

/// A description of an in-place text edit, as the embedder applies it to
/// their own buffer before calling `parse` again with the previous tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputEdit {
    pub start: Length,
    pub old_end: Length,
    pub new_end: Length,
}

impl InputEdit {
    /// The signed length delta this edit introduces: positive (`Grow`) when
    /// the replacement text is longer than what it replaced, negative
    /// (`Shrink`) otherwise.
    fn delta(&self) -> Delta {
        if self.new_end.bytes >= self.old_end.bytes {
            Delta::Grow(self.new_end - self.old_end)
        } else {
            Delta::Shrink(self.old_end - self.new_end)
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Delta {
    Grow(Length),
    Shrink(Length),
}

/// A finished parse result: the root subtree plus the included ranges it
/// was produced from. Handed back to the next `parse` call as "the
/// previous tree" to enable incremental reuse.
#[derive(Clone, Debug)]
pub struct Tree {
    pub root: Subtree,
    pub included_ranges: Vec<Range>,
}

impl Tree {
    pub fn new(root: Subtree, included_ranges: Vec<Range>) -> Tree {
        Tree { root, included_ranges }
    }

    /// Total byte/row/column footprint of the parsed input.
    pub fn total_length(&self) -> Length {
        self.root.total_length()
    }

    /// Apply `edit` to this tree in place: shift every subtree positioned
    /// entirely after the edit by its length delta, and mark `has_changes`
    /// (copy-on-write) on every subtree whose span overlaps the edited
    /// range. Does not reparse or resize overlapping subtrees — the driver's
    /// reusable-node cursor treats any `has_changes` subtree as unreusable
    /// and relexes/rebuilds it on the next `parse` call, so an approximate
    /// post-edit shape is sufficient here.
    pub fn edit(&mut self, edit: &InputEdit) {
        let delta = edit.delta();
        Self::edit_subtree(&mut self.root, Length::ZERO, edit, delta);
        for range in &mut self.included_ranges {
            Self::edit_range(range, edit, delta);
        }
    }

    fn edit_range(range: &mut Range, edit: &InputEdit, delta: Delta) {
        if edit.old_end.bytes <= range.start.bytes {
            range.start = Self::apply_delta(range.start, delta);
            range.end = Self::apply_delta(range.end, delta);
        } else if edit.start.bytes >= range.end.bytes {
            // entirely before the range; unaffected
        } else if range.intersects(edit.start, edit.old_end) {
            range.end = Self::apply_delta(range.end, delta);
        }
    }

    fn apply_delta(length: Length, delta: Delta) -> Length {
        match delta {
            Delta::Grow(d) => length + d,
            Delta::Shrink(d) => length - d,
        }
    }

    /// `node_start` is the absolute position of `subtree`'s own padding
    /// (i.e. where the gap before its content begins); it is the running
    /// cursor the parent accumulates while walking its children in order.
    fn edit_subtree(subtree: &mut Subtree, node_start: Length, edit: &InputEdit, delta: Delta) {
        let content_start = node_start + subtree.padding();
        let full_end = content_start + subtree.size();

        if edit.old_end.bytes <= node_start.bytes {
            // The whole subtree, including its leading gap, starts after
            // the edited region: shift it (and implicitly everything under
            // it, since children are positioned relative to this node) by
            // the delta without touching `has_changes`.
            match delta {
                Delta::Grow(d) => subtree.shift(d),
                Delta::Shrink(d) => subtree.shift_back(d),
            }
            return;
        }

        if edit.start.bytes >= full_end.bytes {
            // Entirely before the edit; untouched.
            return;
        }

        // The edit overlaps this subtree's content span (or its leading
        // gap abuts the edit boundary closely enough that the exact
        // boundary can't be resolved without reparsing). Mark it dirty and
        // recurse so that unaffected descendants still get a chance to
        // short-circuit via the two cases above.
        subtree.set_has_changes();
        if subtree.child_count() == 0 {
            return;
        }
        let mut children = subtree.children().to_vec();
        let mut cursor = content_start;
        for child in children.iter_mut() {
            Self::edit_subtree(child, cursor, edit, delta);
            cursor = cursor + child.total_length();
        }
        subtree.set_children(children);
    }
}

#[cfg(test)]
mod tree_tests {
    use super::*;
    use crate::subtree::ParseState;

    fn leaf(symbol: u16, padding: Length, size: Length) -> Subtree {
        Subtree::leaf(symbol, padding, size, 0, ParseState(1))
    }

    #[test]
    fn edit_after_tree_shifts_without_marking_changed() {
        let a = leaf(1, Length::ZERO, Length::new(1, 0, 1));
        let b = leaf(2, Length::ZERO, Length::new(1, 0, 1));
        let root = Subtree::node(10, vec![a, b], 0, 0, ParseState(3));
        let mut tree = Tree::new(root, vec![Range::whole_document(Length::new(2, 0, 2))]);

        let edit = InputEdit {
            start: Length::new(2, 0, 2),
            old_end: Length::new(2, 0, 2),
            new_end: Length::new(3, 0, 3),
        };
        tree.edit(&edit);

        assert!(!tree.root.has_changes());
        assert_eq!(tree.root.size(), Length::new(2, 0, 2));
    }

    #[test]
    fn edit_inside_leaf_marks_has_changes_up_to_root() {
        let a = leaf(1, Length::ZERO, Length::new(3, 0, 3));
        let b = leaf(2, Length::ZERO, Length::new(1, 0, 1));
        let root = Subtree::node(10, vec![a, b], 0, 0, ParseState(3));
        let mut tree = Tree::new(root, vec![Range::whole_document(Length::new(4, 0, 4))]);

        let edit = InputEdit {
            start: Length::new(1, 0, 1),
            old_end: Length::new(2, 0, 2),
            new_end: Length::new(2, 0, 2),
        };
        tree.edit(&edit);

        assert!(tree.root.has_changes());
        assert!(tree.root.children()[0].has_changes());
        assert!(!tree.root.children()[1].has_changes());
    }

    #[test]
    fn edit_inside_first_child_shifts_but_does_not_mark_second() {
        let a = leaf(1, Length::ZERO, Length::new(3, 0, 3));
        let b = leaf(2, Length::ZERO, Length::new(1, 0, 1));
        let root = Subtree::node(10, vec![a, b], 0, 0, ParseState(3));
        let mut tree = Tree::new(root, vec![Range::whole_document(Length::new(4, 0, 4))]);

        // Grow a byte entirely inside the first leaf's content; the second
        // leaf starts after the edit's old end, so it is pure-shifted, not
        // marked dirty.
        let edit = InputEdit {
            start: Length::new(1, 0, 1),
            old_end: Length::new(2, 0, 2),
            new_end: Length::new(3, 0, 3),
        };
        tree.edit(&edit);

        assert!(tree.root.children()[0].has_changes());
        assert!(!tree.root.children()[1].has_changes());
        assert_eq!(tree.root.size(), Length::new(5, 0, 5));
    }
}

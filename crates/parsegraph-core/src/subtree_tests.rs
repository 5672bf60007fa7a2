use super::*;

#[test]
fn leaf_has_no_children() {
    let leaf = Subtree::leaf(1, Length::ZERO, Length::new(3, 0, 3), 0, ParseState(5));
    assert_eq!(leaf.child_count(), 0);
    assert!(leaf.children().is_empty());
}

#[test]
fn node_footprint_matches_children() {
    let a = Subtree::leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
    let b = Subtree::leaf(2, Length::new(1, 0, 1), Length::new(1, 0, 1), 0, ParseState(2));
    let node = Subtree::node(10, vec![a, b], 0, 0, ParseState(3));
    assert_eq!(node.padding(), Length::ZERO);
    assert_eq!(node.size(), Length::new(3, 0, 3));
    assert_eq!(node.child_count(), 2);
}

#[test]
fn dynamic_precedence_sums_children() {
    let mut a = Subtree::leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
    a = Subtree::node(20, vec![a], 1, 5, ParseState(1));
    let b = Subtree::leaf(2, Length::new(1, 0, 1), Length::new(1, 0, 1), 0, ParseState(2));
    let node = Subtree::node(10, vec![a, b], 0, 3, ParseState(3));
    assert_eq!(node.dynamic_precedence(), 8);
}

#[test]
fn missing_leaf_is_zero_size_and_fragile() {
    let m = Subtree::missing_leaf(7, Length::new(2, 0, 2));
    assert_eq!(m.size(), Length::ZERO);
    assert!(m.is_missing());
    assert!(m.is_fragile());
    assert!(m.parse_state().is_none());
}

#[test]
fn error_leaf_flags() {
    let e = Subtree::error_leaf(Length::ZERO, Length::new(2, 0, 2));
    assert!(e.is_error());
    assert!(e.is_fragile());
}

#[test]
fn clone_is_pointer_clone() {
    let a = Subtree::leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
    let b = a.clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.strong_count(), 2);
}

#[test]
fn make_mut_clones_when_shared_else_edits_in_place() {
    let mut a = Subtree::leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
    let b = a.clone();
    assert_eq!(a.strong_count(), 2);

    a.set_extra();
    // `a` had to clone its data since `b` held a second reference; `b`
    // must be unaffected.
    assert!(a.flags().extra);
    assert!(!b.flags().extra);
    assert!(!a.ptr_eq(&b));
}

#[test]
fn first_leaf_descends_to_leftmost() {
    let a = Subtree::leaf(1, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(1));
    let b = Subtree::leaf(2, Length::new(1, 0, 1), Length::new(1, 0, 1), 0, ParseState(2));
    let inner = Subtree::node(20, vec![a.clone()], 0, 0, ParseState(3));
    let outer = Subtree::node(10, vec![inner, b], 0, 0, ParseState(4));
    assert!(outer.first_leaf().ptr_eq(&a));
}

#[test]
fn set_children_recomputes_padding_and_size() {
    let a = Subtree::leaf(1, Length::new(1, 0, 1), Length::new(1, 0, 1), 0, ParseState(1));
    let b = Subtree::leaf(2, Length::ZERO, Length::new(1, 0, 1), 0, ParseState(2));
    let mut node = Subtree::node(10, vec![a.clone()], 0, 0, ParseState(3));
    node.set_children(vec![a, b]);
    assert_eq!(node.padding(), Length::new(1, 0, 1));
    assert_eq!(node.size(), Length::new(1, 0, 1));
}

//! The immutable, refcounted syntax node.
//!
//! A [`Subtree`] is either a `Leaf` (a lexed token, an error span, or a
//! missing-token placeholder) or a `Node` (the result of a reduction, with
//! zero or more children). Both are refcounted (`Rc`) so that sharing a
//! subtree across GSS versions, across the token cache, and across an old
//! tree being reused is a pointer clone, never a deep copy.
//!
//! Mutation happens only through `Rc::make_mut`, i.e. copy-on-write: a
//! subtree can be edited in place exactly when nothing else holds a
//! reference to it. There is no separate pool/arena type backing this — in a
//! garbage-collected or manually-refcounted host language the pool is the
//! allocator; in Rust, `Rc`'s refcount *is* the pool's bookkeeping, so
//! [`SubtreePool`](crate::SubtreePool) exists only to mirror the external
//! interface (`leaf`/`error_leaf`/`node`/`missing_leaf` constructors) and to
//! track allocation counts for diagnostics.

use std::rc::Rc;

use crate::invariants::ensure_footprint_consistent;
use crate::length::Length;

/// A grammar symbol id, as assigned by the compiled parse table.
pub type Symbol = u16;

/// Reserved symbol for end-of-input.
pub const END_SYMBOL: Symbol = 0;

/// Reserved symbol for error nodes and error leaves.
pub const ERROR_SYMBOL: Symbol = Symbol::MAX;

/// Reserved symbol folding repeated skipped tokens during recovery
/// strategy B.
pub const ERROR_REPEAT_SYMBOL: Symbol = Symbol::MAX - 1;

/// The parser state a node/leaf was produced in, or [`ParseState::NONE`] if
/// the node is fragile or was produced while multiple GSS versions existed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseState(pub u16);

impl ParseState {
    pub const NONE: ParseState = ParseState(u16::MAX);

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// Per-subtree flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubtreeFlags {
    /// Allowed between grammar symbols without changing parser state
    /// (whitespace, comments, ...).
    pub extra: bool,
    /// Wraps lexically- or syntactically-invalid input.
    pub is_error: bool,
    /// Zero-size placeholder inserted for a token the grammar required but
    /// the input omitted.
    pub missing: bool,
    /// The leftmost descendant chain was built under ambiguity/error and
    /// cannot be safely reused on the left edge.
    pub fragile_left: bool,
    /// Same as `fragile_left`, but for the rightmost descendant chain.
    pub fragile_right: bool,
    /// Set by `Tree::edit` on any subtree whose span intersects the edited
    /// byte range, and on all of its ancestors.
    pub has_changes: bool,
    /// At least one descendant leaf was produced by the external scanner.
    pub has_external_tokens: bool,
    /// Producing this node observed the external scanner's serialized
    /// state change.
    pub has_external_scanner_state_change: bool,
    /// Produced via the keyword-fallback path.
    pub is_keyword: bool,
    /// Transparent in the exposed tree shape (not surfaced to consumers as
    /// its own node).
    pub is_inline: bool,
    /// This subtree's parse_state cannot be trusted for incremental reuse,
    /// independent of which edge (`fragile_left`/`fragile_right`) is
    /// affected; set whenever a reduction folds multiple pop paths or ran
    /// while more than one GSS version was alive.
    pub is_fragile: bool,
}

/// A serialized external-scanner state, as produced by
/// [`ExternalScanner::serialize`](crate::ExternalScannerStateId) and stashed
/// on the leaf it produced. Wrapping the raw bytes in a newtype (rather than
/// passing `Rc<[u8]>` around bare) keeps "this is scanner-opaque payload,
/// not tree structure" visible at every call site that threads it through
/// the driver (token cache hits, GSS versions, reusable-node candidates all
/// compare these by value, never by looking inside).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalScannerStateId(pub Rc<[u8]>);

impl ExternalScannerStateId {
    pub fn new(bytes: Vec<u8>) -> Self {
        ExternalScannerStateId(Rc::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A lexed or synthesized leaf: no children.
#[derive(Clone, Debug)]
pub struct LeafData {
    pub symbol: Symbol,
    pub padding: Length,
    pub size: Length,
    /// Bytes the lexer read past the token's end while disambiguating it.
    /// Tracked so an edit inside that lookahead window invalidates reuse
    /// even though it falls outside the token's own span.
    pub lookahead_bytes: u32,
    pub parse_state: ParseState,
    pub flags: SubtreeFlags,
    /// Serialized external-scanner state as of producing this leaf, if it
    /// came from the external scanner.
    pub external_scanner_state: Option<ExternalScannerStateId>,
}

/// The result of a reduction: a symbol over zero or more children.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub symbol: Symbol,
    pub children: Vec<Subtree>,
    pub padding: Length,
    pub size: Length,
    pub parse_state: ParseState,
    pub flags: SubtreeFlags,
    pub production_id: u16,
    pub dynamic_precedence: i32,
}

/// A refcounted, immutable syntax node. Cheap to clone (one `Rc` bump).
#[derive(Clone, Debug)]
pub enum Subtree {
    Leaf(Rc<LeafData>),
    Node(Rc<NodeData>),
}

impl Subtree {
    /// Construct a fresh leaf from a successful lex.
    pub fn leaf(
        symbol: Symbol,
        padding: Length,
        size: Length,
        lookahead_bytes: u32,
        parse_state: ParseState,
    ) -> Subtree {
        Subtree::Leaf(Rc::new(LeafData {
            symbol,
            padding,
            size,
            lookahead_bytes,
            parse_state,
            flags: SubtreeFlags::default(),
            external_scanner_state: None,
        }))
    }

    /// Construct a leaf produced by the external scanner, carrying its
    /// serialized state.
    pub fn external_leaf(
        symbol: Symbol,
        padding: Length,
        size: Length,
        parse_state: ParseState,
        scanner_state: ExternalScannerStateId,
        state_changed: bool,
    ) -> Subtree {
        Subtree::Leaf(Rc::new(LeafData {
            symbol,
            padding,
            size,
            lookahead_bytes: 0,
            parse_state,
            flags: SubtreeFlags {
                has_external_tokens: true,
                has_external_scanner_state_change: state_changed,
                ..SubtreeFlags::default()
            },
            external_scanner_state: Some(scanner_state),
        }))
    }

    /// A leaf spanning bytes the lexer could not tokenize.
    pub fn error_leaf(padding: Length, size: Length) -> Subtree {
        Subtree::Leaf(Rc::new(LeafData {
            symbol: ERROR_SYMBOL,
            padding,
            size,
            lookahead_bytes: 0,
            parse_state: ParseState::NONE,
            flags: SubtreeFlags {
                is_error: true,
                is_fragile: true,
                fragile_left: true,
                fragile_right: true,
                ..SubtreeFlags::default()
            },
            external_scanner_state: None,
        }))
    }

    /// A zero-size leaf standing in for a token the grammar required but
    /// the input omitted.
    pub fn missing_leaf(symbol: Symbol, padding: Length) -> Subtree {
        Subtree::Leaf(Rc::new(LeafData {
            symbol,
            padding,
            size: Length::ZERO,
            lookahead_bytes: 0,
            parse_state: ParseState::NONE,
            flags: SubtreeFlags {
                missing: true,
                is_fragile: true,
                fragile_left: true,
                fragile_right: true,
                ..SubtreeFlags::default()
            },
            external_scanner_state: None,
        }))
    }

    /// Construct a parent node over `children`.
    ///
    /// `padding` is the leading extent of the first child (or zero, for an
    /// empty reduction); `size` is the sum of every child's own
    /// `padding + size` minus that leading padding. `own_dynamic_precedence`
    /// is the production's own contribution; the children's contributions
    /// are summed in automatically.
    pub fn node(
        symbol: Symbol,
        children: Vec<Subtree>,
        production_id: u16,
        own_dynamic_precedence: i32,
        parse_state: ParseState,
    ) -> Subtree {
        let padding = children.first().map(Subtree::padding).unwrap_or(Length::ZERO);
        let total: Length = children.iter().map(Subtree::total_length).sum();
        let size = total - padding;
        let dynamic_precedence =
            own_dynamic_precedence + children.iter().map(Subtree::dynamic_precedence).sum::<i32>();

        let subtree = Subtree::Node(Rc::new(NodeData {
            symbol,
            children,
            padding,
            size,
            parse_state,
            flags: SubtreeFlags::default(),
            production_id,
            dynamic_precedence,
        }));
        debug_assert!({
            ensure_footprint_consistent(&subtree);
            true
        });
        subtree
    }

    #[inline]
    pub fn symbol(&self) -> Symbol {
        match self {
            Subtree::Leaf(l) => l.symbol,
            Subtree::Node(n) => n.symbol,
        }
    }

    #[inline]
    pub fn padding(&self) -> Length {
        match self {
            Subtree::Leaf(l) => l.padding,
            Subtree::Node(n) => n.padding,
        }
    }

    #[inline]
    pub fn size(&self) -> Length {
        match self {
            Subtree::Leaf(l) => l.size,
            Subtree::Node(n) => n.size,
        }
    }

    /// `padding + size`: the subtree's total footprint in the source.
    #[inline]
    pub fn total_length(&self) -> Length {
        self.padding() + self.size()
    }

    #[inline]
    pub fn parse_state(&self) -> ParseState {
        match self {
            Subtree::Leaf(l) => l.parse_state,
            Subtree::Node(n) => n.parse_state,
        }
    }

    #[inline]
    pub fn flags(&self) -> SubtreeFlags {
        match self {
            Subtree::Leaf(l) => l.flags,
            Subtree::Node(n) => n.flags,
        }
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        match self {
            Subtree::Leaf(_) => 0,
            Subtree::Node(n) => n.children.len(),
        }
    }

    #[inline]
    pub fn children(&self) -> &[Subtree] {
        match self {
            Subtree::Leaf(_) => &[],
            Subtree::Node(n) => &n.children,
        }
    }

    #[inline]
    pub fn dynamic_precedence(&self) -> i32 {
        match self {
            Subtree::Leaf(_) => 0,
            Subtree::Node(n) => n.dynamic_precedence,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.flags().is_error
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.flags().missing
    }

    #[inline]
    pub fn is_extra(&self) -> bool {
        self.flags().extra
    }

    /// True if either edge of this subtree is unsafe to reuse
    /// incrementally.
    #[inline]
    pub fn is_fragile(&self) -> bool {
        let f = self.flags();
        f.is_fragile || f.fragile_left || f.fragile_right
    }

    #[inline]
    pub fn has_changes(&self) -> bool {
        self.flags().has_changes
    }

    pub fn external_scanner_state(&self) -> Option<&ExternalScannerStateId> {
        match self {
            Subtree::Leaf(l) => l.external_scanner_state.as_ref(),
            Subtree::Node(_) => None,
        }
    }

    /// Descend to the leftmost leaf: the first leaf under a reuse
    /// candidate is what must pass the reusability test, not the
    /// candidate node itself.
    pub fn first_leaf(&self) -> &Subtree {
        let mut current = self;
        loop {
            match current {
                Subtree::Leaf(_) => return current,
                Subtree::Node(n) => match n.children.first() {
                    Some(child) => current = child,
                    None => return current,
                },
            }
        }
    }

    /// Mark this subtree `extra` in place (copy-on-write).
    pub fn set_extra(&mut self) {
        self.with_flags_mut(|f| f.extra = true);
    }

    /// Rewrite a leaf's symbol in place (copy-on-write), preserving its
    /// padding/size/lookahead_bytes/parse_state — the bytes underneath
    /// don't move, only the grammar symbol the tree records for them
    /// changes. Used by keyword fallback (§4.1); marks the leaf
    /// `is_keyword` at the same time. No-op on a node.
    pub fn rewrite_keyword_symbol(&mut self, symbol: Symbol) {
        if let Subtree::Leaf(l) = self {
            let data = Rc::make_mut(l);
            data.symbol = symbol;
            data.flags.is_keyword = true;
        }
    }

    /// Mark both fragile edges and clear `parse_state`.
    pub fn mark_fragile(&mut self) {
        match self {
            Subtree::Leaf(l) => {
                let data = Rc::make_mut(l);
                data.flags.fragile_left = true;
                data.flags.fragile_right = true;
                data.flags.is_fragile = true;
                data.parse_state = ParseState::NONE;
            }
            Subtree::Node(n) => {
                let data = Rc::make_mut(n);
                data.flags.fragile_left = true;
                data.flags.fragile_right = true;
                data.flags.is_fragile = true;
                data.parse_state = ParseState::NONE;
            }
        }
    }

    pub fn set_has_changes(&mut self) {
        self.with_flags_mut(|f| f.has_changes = true);
    }

    pub fn add_dynamic_precedence(&mut self, delta: i32) {
        if let Subtree::Node(n) = self {
            Rc::make_mut(n).dynamic_precedence += delta;
        }
    }

    /// Mutable access to children, copy-on-write. No-op (empty slice) for
    /// leaves.
    pub fn children_mut(&mut self) -> &mut [Subtree] {
        match self {
            Subtree::Leaf(_) => &mut [],
            Subtree::Node(n) => &mut Rc::make_mut(n).children,
        }
    }

    /// Take this node's children, leaving it with none. Empty for leaves.
    ///
    /// Used by the rebalance pass, which must recurse with
    /// *exclusive* ownership of each child to honor the refcount==1
    /// mutation rule: cloning children into a side worklist (as
    /// `children()`/`to_vec()` would) leaves two live `Rc`s pointing at the
    /// same child, so a later `make_mut` on the worklist copy silently
    /// clones instead of mutating in place and the edit is lost when that
    /// copy is dropped. Removing children from their parent first, then
    /// restoring the (possibly restructured) vector via `set_children`,
    /// keeps exactly one owner alive at every point during the walk.
    pub fn take_children(&mut self) -> Vec<Subtree> {
        match self {
            Subtree::Leaf(_) => Vec::new(),
            Subtree::Node(n) => std::mem::take(&mut Rc::make_mut(n).children),
        }
    }

    /// Replace this subtree's children wholesale, recomputing padding/size.
    /// Used by the rebalance pass to restructure a repetition
    /// chain without changing the symbol or precedence.
    pub fn set_children(&mut self, children: Vec<Subtree>) {
        if let Subtree::Node(n) = self {
            let data = Rc::make_mut(n);
            let padding = children.first().map(Subtree::padding).unwrap_or(Length::ZERO);
            let total: Length = children.iter().map(Subtree::total_length).sum();
            data.size = total - padding;
            data.padding = padding;
            data.children = children;
        }
    }

    /// Shift this subtree's padding/position by `delta` (applied on edits
    /// that occur entirely before this subtree; see `Tree::edit`).
    pub(crate) fn shift(&mut self, delta: Length) {
        self.with_data_mut(
            |l| l.padding = l.padding + delta,
            |n| n.padding = n.padding + delta,
        );
    }

    /// Inverse of [`shift`](Self::shift), for edits that shrink the source
    /// (the new text is shorter than what it replaced).
    pub(crate) fn shift_back(&mut self, delta: Length) {
        self.with_data_mut(
            |l| l.padding = l.padding - delta,
            |n| n.padding = n.padding - delta,
        );
    }

    fn with_flags_mut(&mut self, f: impl FnOnce(&mut SubtreeFlags)) {
        match self {
            Subtree::Leaf(l) => f(&mut Rc::make_mut(l).flags),
            Subtree::Node(n) => f(&mut Rc::make_mut(n).flags),
        }
    }

    fn with_data_mut(
        &mut self,
        on_leaf: impl FnOnce(&mut LeafData),
        on_node: impl FnOnce(&mut NodeData),
    ) {
        match self {
            Subtree::Leaf(l) => on_leaf(Rc::make_mut(l)),
            Subtree::Node(n) => on_node(Rc::make_mut(n)),
        }
    }

    /// Reference count of the underlying allocation. `1` means this handle
    /// is the sole owner and may be mutated in place without cloning.
    pub fn strong_count(&self) -> usize {
        match self {
            Subtree::Leaf(l) => Rc::strong_count(l),
            Subtree::Node(n) => Rc::strong_count(n),
        }
    }

    /// Pointer identity, for asserting reuse in tests.
    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        match (self, other) {
            (Subtree::Leaf(a), Subtree::Leaf(b)) => Rc::ptr_eq(a, b),
            (Subtree::Node(a), Subtree::Node(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A rough error weight used only to rank two same-symbol subtrees
/// against each other for §4.5's "prefer smaller error cost": the count
/// of error/missing leaves anywhere beneath this node. This crate has no
/// access to the driver's grammar-scaled error-cost constants (those live
/// in `parsegraph-table`/`parsegraph-driver`, both layered above this
/// one), so a leaf count is the coarsest faithful stand-in: it is zero
/// iff the subtree is wholly error-free, and strictly increases with
/// every additional error/missing leaf folded in.
pub fn error_leaf_count(subtree: &Subtree) -> u32 {
    match subtree {
        Subtree::Leaf(l) => (l.flags.is_error || l.flags.missing) as u32,
        Subtree::Node(n) => n.children.iter().map(error_leaf_count).sum(),
    }
}

/// §4.5's structural compare: symbol order first, then each child pair
/// recursively, then child count as a final tiebreak. Total and
/// deterministic, so ambiguity resolution stays fuzz-stable.
fn structural_cmp(a: &Subtree, b: &Subtree) -> std::cmp::Ordering {
    match a.symbol().cmp(&b.symbol()) {
        std::cmp::Ordering::Equal => {}
        other => return other,
    }
    for (ca, cb) in a.children().iter().zip(b.children().iter()) {
        match structural_cmp(ca, cb) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    a.children().len().cmp(&b.children().len())
}

/// §4.5 subtree selection: choose between two candidates carrying the
/// same symbol. Returns `true` iff `candidate` should replace `existing`:
/// smaller error cost wins outright; then higher dynamic precedence; if
/// both are error-free, `existing` (the left/already-present one) always
/// wins; otherwise a structural compare breaks the tie, with a `Equal`
/// result keeping `existing`.
pub fn prefer_candidate(existing: &Subtree, candidate: &Subtree) -> bool {
    let existing_errors = error_leaf_count(existing);
    let candidate_errors = error_leaf_count(candidate);
    if candidate_errors != existing_errors {
        return candidate_errors < existing_errors;
    }
    if candidate.dynamic_precedence() != existing.dynamic_precedence() {
        return candidate.dynamic_precedence() > existing.dynamic_precedence();
    }
    if existing_errors == 0 {
        return false;
    }
    structural_cmp(candidate, existing) == std::cmp::Ordering::Less
}

#[cfg(test)]
#[path = "subtree_tests.rs"]
mod subtree_tests;

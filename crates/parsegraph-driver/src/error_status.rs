//! Per-version error bookkeeping and the comparison used to prune the
//! GSS when too many versions are alive at once.

use parsegraph_table::limits::MAX_COST_DIFFERENCE;

/// A version's running error tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorStatus {
    /// Accumulated cost from skipped trees/characters/lines and paused
    /// versions.
    pub cost: i64,
    /// Nodes reduced since the last error was detected; used as a
    /// stand-in for "distance recovered" when breaking cost ties, since
    /// the version with more nodes since its last error wins.
    pub node_count_since_error: u32,
    /// Sum of dynamic precedence contributed by this version's subtrees.
    pub dynamic_precedence: i32,
    /// Whether this version currently has an unresolved error on its
    /// stack.
    pub is_in_error: bool,
}

/// The outcome of comparing two versions' [`ErrorStatus`] during
/// condensing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorComparison {
    /// `a` strictly dominates; `b` should be discarded.
    TakeLeft,
    /// `a` is preferred but `b` is close enough to keep if room allows.
    PreferLeft,
    /// Neither dominates; keep both.
    None,
    /// `b` is preferred but `a` is close enough to keep if room allows.
    PreferRight,
    /// `b` strictly dominates; `a` should be discarded.
    TakeRight,
}

/// Compares two versions' error status:
///
/// - an error-free version always beats an in-error one;
/// - among versions in the same class (both in error or both clean), the
///   one with lower cost wins outright once the gap exceeds
///   [`MAX_COST_DIFFERENCE`] scaled by how much recovery progress the
///   worse version has made since its own last error;
/// - a gap within that margin is a soft preference, not elimination;
/// - an exact tie falls back to dynamic precedence, and a further tie is
///   [`ErrorComparison::None`] (both survive).
pub fn compare(a: &ErrorStatus, b: &ErrorStatus) -> ErrorComparison {
    if a.is_in_error != b.is_in_error {
        return if a.is_in_error { ErrorComparison::TakeRight } else { ErrorComparison::TakeLeft };
    }

    let gap = b.cost - a.cost;
    if gap == 0 {
        return match a.dynamic_precedence.cmp(&b.dynamic_precedence) {
            std::cmp::Ordering::Greater => ErrorComparison::PreferLeft,
            std::cmp::Ordering::Less => ErrorComparison::PreferRight,
            std::cmp::Ordering::Equal => ErrorComparison::None,
        };
    }

    if gap > 0 {
        // a is cheaper.
        if gap > MAX_COST_DIFFERENCE * (1 + b.node_count_since_error as i64) {
            ErrorComparison::TakeLeft
        } else {
            ErrorComparison::PreferLeft
        }
    } else {
        let gap = -gap;
        if gap > MAX_COST_DIFFERENCE * (1 + a.node_count_since_error as i64) {
            ErrorComparison::TakeRight
        } else {
            ErrorComparison::PreferRight
        }
    }
}

#[cfg(test)]
mod error_status_tests {
    use super::*;

    fn status(cost: i64, in_error: bool) -> ErrorStatus {
        ErrorStatus { cost, node_count_since_error: 0, dynamic_precedence: 0, is_in_error: in_error }
    }

    #[test]
    fn error_free_beats_in_error_regardless_of_cost() {
        let clean = status(1000, false);
        let errored = status(0, true);
        assert_eq!(compare(&clean, &errored), ErrorComparison::TakeLeft);
        assert_eq!(compare(&errored, &clean), ErrorComparison::TakeRight);
    }

    #[test]
    fn huge_cost_gap_is_take_not_prefer() {
        let cheap = status(0, true);
        let expensive = status(MAX_COST_DIFFERENCE * 2, true);
        assert_eq!(compare(&cheap, &expensive), ErrorComparison::TakeLeft);
    }

    #[test]
    fn small_cost_gap_is_a_soft_preference() {
        let cheap = status(0, true);
        let expensive = status(MAX_COST_DIFFERENCE / 2, true);
        assert_eq!(compare(&cheap, &expensive), ErrorComparison::PreferLeft);
    }

    #[test]
    fn exact_tie_falls_back_to_dynamic_precedence() {
        let mut a = status(5, false);
        let mut b = status(5, false);
        assert_eq!(compare(&a, &b), ErrorComparison::None);
        a.dynamic_precedence = 1;
        assert_eq!(compare(&a, &b), ErrorComparison::PreferLeft);
        b.dynamic_precedence = 2;
        assert_eq!(compare(&a, &b), ErrorComparison::PreferRight);
    }
}

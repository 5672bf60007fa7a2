//! Byte/row/column extents.
//!
//! `Length` is used both as a span (how big something is) and as a point
//! offset (how far into the input something starts), matching tree-sitter's
//! convention of reusing one additive type for both. `Point` is the
//! row/column half of a `Length` on its own, for APIs that only need a
//! display position.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A row/column position, independent of byte offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub row: u32,
    pub column: u32,
}

impl Point {
    pub const ZERO: Point = Point { row: 0, column: 0 };

    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// A byte span plus its row/column extent, or equivalently a byte offset
/// plus row/column position, depending on context.
///
/// Addition and subtraction are associative and `Length::ZERO` is the
/// identity: `a + (b + c) == (a + b) + c` and `a + ZERO == a`.
/// Row/column addition follows the usual "newline resets column" rule: if
/// the right-hand operand spans any rows, the resulting column is the
/// right-hand operand's column (it started a fresh line); otherwise columns
/// add.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Length {
    pub bytes: u32,
    pub row: u32,
    pub column: u32,
}

impl Length {
    pub const ZERO: Length = Length {
        bytes: 0,
        row: 0,
        column: 0,
    };

    pub const fn new(bytes: u32, row: u32, column: u32) -> Self {
        Self { bytes, row, column }
    }

    pub const fn point(&self) -> Point {
        Point::new(self.row, self.column)
    }

    /// Build a `Length` spanning `text`, scanning for newlines to compute
    /// the row/column delta.
    pub fn of_str(text: &str) -> Self {
        let mut row = 0u32;
        let mut column = 0u32;
        for b in text.bytes() {
            if b == b'\n' {
                row += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        Length::new(text.len() as u32, row, column)
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        let (row, column) = if rhs.row > 0 {
            (self.row + rhs.row, rhs.column)
        } else {
            (self.row, self.column + rhs.column)
        };
        Length {
            bytes: self.bytes + rhs.bytes,
            row,
            column,
        }
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Length) {
        *self = *self + rhs;
    }
}

impl Sub for Length {
    type Output = Length;

    /// Inverse of `Add`: `(a + b) - b == a` for any `b` that is not itself
    /// the result of discarding row/column information across a line
    /// boundary of `a`. This mirrors tree-sitter's own length subtraction,
    /// which is likewise only meaningful for lengths derived by addition
    /// from a common base.
    fn sub(self, rhs: Length) -> Length {
        let (row, column) = if self.row > rhs.row {
            (self.row - rhs.row, self.column)
        } else {
            (0, self.column.saturating_sub(rhs.column))
        };
        Length {
            bytes: self.bytes - rhs.bytes,
            row,
            column,
        }
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Length) {
        *self = *self - rhs;
    }
}

impl Sum for Length {
    fn sum<I: Iterator<Item = Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Length> for Length {
    fn sum<I: Iterator<Item = &'a Length>>(iter: I) -> Length {
        iter.fold(Length::ZERO, |acc, l| acc + *l)
    }
}

#[cfg(test)]
mod length_tests {
    use super::*;

    #[test]
    fn zero_is_identity() {
        let l = Length::new(5, 1, 2);
        assert_eq!(l + Length::ZERO, l);
        assert_eq!(Length::ZERO + l, l);
    }

    #[test]
    fn add_is_associative() {
        let a = Length::new(3, 0, 3);
        let b = Length::new(4, 1, 0);
        let c = Length::new(2, 0, 2);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn add_resets_column_across_newline() {
        let a = Length::new(3, 0, 3);
        let b = Length::of_str("\nxy");
        let sum = a + b;
        assert_eq!(sum.bytes, 6);
        assert_eq!(sum.row, 1);
        assert_eq!(sum.column, 2);
    }

    #[test]
    fn of_str_counts_newlines() {
        let l = Length::of_str("ab\ncde\nf");
        assert_eq!(l.bytes, 8);
        assert_eq!(l.row, 2);
        assert_eq!(l.column, 1);
    }

    #[test]
    fn sub_is_inverse_of_add_within_one_line() {
        let a = Length::new(3, 0, 3);
        let b = Length::new(4, 0, 4);
        assert_eq!((a + b) - b, a);
    }
}

//! Newtype wrappers for cascade coordinates.
//!
//! These types prevent accidental mixing of the three coordinate axes (e.g.
//! using a branch number where a depth is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The index of a cascade tree within the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeIndex(pub usize);

impl fmt::Display for TreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for TreeIndex {
    fn from(n: usize) -> Self {
        TreeIndex(n)
    }
}

/// The depth of a node in its tree.
///
/// Depth 0 is the root (final merge); depth increases toward the raw leaves.
/// The deepest layer present in a tree is the leaf-merge depth, whose nodes
/// consume raw input artifacts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Depth(pub usize);

impl Depth {
    /// The root layer of a tree.
    pub const ROOT: Depth = Depth(0);

    /// The next layer away from the root, toward the leaves.
    pub fn deeper(self) -> Depth {
        Depth(self.0 + 1)
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Depth {
    fn from(n: usize) -> Self {
        Depth(n)
    }
}

/// A node's enumeration index among its depth-siblings within one tree.
///
/// Branch numbers are only unique within a (tree, depth) pair, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Branch(pub usize);

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Branch {
    fn from(n: usize) -> Self {
        Branch(n)
    }
}

/// A half-open interval `[start, end)` of global leaf indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafRange {
    pub start: usize,
    pub end: usize,
}

impl LeafRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "leaf range must not be inverted");
        LeafRange { start, end }
    }

    /// The number of leaves in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the range covers no leaves.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if the global leaf index falls inside the range.
    pub fn contains(&self, leaf: usize) -> bool {
        self.start <= leaf && leaf < self.end
    }
}

impl fmt::Display for LeafRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod leaf_range {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn serde_roundtrip(start in 0usize..1000, len in 0usize..1000) {
                let range = LeafRange::new(start, start + len);
                let json = serde_json::to_string(&range).unwrap();
                let parsed: LeafRange = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(range, parsed);
            }

            #[test]
            fn len_matches_bounds(start in 0usize..1000, len in 0usize..1000) {
                let range = LeafRange::new(start, start + len);
                prop_assert_eq!(range.len(), len);
                prop_assert_eq!(range.is_empty(), len == 0);
            }

            #[test]
            fn contains_matches_bounds(start in 0usize..1000, len in 1usize..1000) {
                let range = LeafRange::new(start, start + len);
                prop_assert!(range.contains(start));
                prop_assert!(range.contains(start + len - 1));
                prop_assert!(!range.contains(start + len));
                if start > 0 {
                    prop_assert!(!range.contains(start - 1));
                }
            }
        }
    }

    mod coordinates {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tree_index_serde_roundtrip(n: usize) {
                let tree = TreeIndex(n);
                let json = serde_json::to_string(&tree).unwrap();
                let parsed: TreeIndex = serde_json::from_str(&json).unwrap();
                prop_assert_eq!(tree, parsed);
            }

            #[test]
            fn display_is_plain_number(n: usize) {
                prop_assert_eq!(format!("{}", TreeIndex(n)), n.to_string());
                prop_assert_eq!(format!("{}", Depth(n)), n.to_string());
                prop_assert_eq!(format!("{}", Branch(n)), n.to_string());
            }
        }

        #[test]
        fn deeper_steps_away_from_root() {
            assert_eq!(Depth::ROOT.deeper(), Depth(1));
            assert_eq!(Depth(3).deeper(), Depth(4));
        }
    }
}

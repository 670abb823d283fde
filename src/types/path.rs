//! Tree-path addressing for cascade nodes.
//!
//! A node is identified by its root-to-node path of child-selection indices.
//! The path doubles as a compact positional numeral: read as digits in base
//! `merge_factor`, a leaf-merge node's path encodes the contiguous leaf range
//! it consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{Branch, Depth, LeafRange, TreeIndex};

/// An ordered sequence of child-selection indices from the root.
///
/// `depth = len - 1`. The empty path represents the degenerate root region
/// of a tree with at most one leaf; it is recorded at depth 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The empty path (degenerate root region).
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }

    /// The child-selection indices, root first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The node's depth: `len - 1`, with the empty path recorded at depth 0.
    pub fn depth(&self) -> Depth {
        Depth(self.0.len().saturating_sub(1))
    }

    /// The path extended by one child-selection index.
    pub fn child(&self, index: usize) -> NodePath {
        let mut indices = self.0.clone();
        indices.push(index);
        NodePath(indices)
    }

    /// The path with its last element dropped, or `None` for the empty path.
    pub fn parent(&self) -> Option<NodePath> {
        if self.0.is_empty() {
            return None;
        }
        Some(NodePath(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Returns true if `self` is the parent truncation of `other`.
    pub fn is_parent_of(&self, other: &NodePath) -> bool {
        other.0.len() == self.0.len() + 1 && other.0[..self.0.len()] == self.0[..]
    }

    /// The leaf range a leaf-merge node with this path consumes.
    ///
    /// The path is read as digits in base `merge_factor`; the resulting value
    /// selects the chunk of `merge_factor` leaves starting at
    /// `tree_offset + merge_factor * value`. Both bounds are clamped to the
    /// tree's own slice of the global leaf-index space, so a path whose value
    /// lies beyond the slice collapses to an empty range at the slice end.
    pub fn leaf_range(
        &self,
        merge_factor: usize,
        tree_offset: usize,
        tree_leaves: usize,
    ) -> LeafRange {
        let value: usize = self.0.iter().fold(0, |acc, &digit| acc * merge_factor + digit);
        let slice_end = tree_offset + tree_leaves;
        let start = (tree_offset + merge_factor * value).min(slice_end);
        let end = (start + merge_factor).min(slice_end);
        LeafRange::new(start, end)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", index)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        NodePath(indices)
    }
}

/// The full address of a scheduled node: which tree, which layer, which
/// sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeCoordinates {
    pub tree: TreeIndex,
    pub depth: Depth,
    pub branch: Branch,
}

impl NodeCoordinates {
    pub fn new(tree: impl Into<TreeIndex>, depth: impl Into<Depth>, branch: impl Into<Branch>) -> Self {
        NodeCoordinates {
            tree: tree.into(),
            depth: depth.into(),
            branch: branch.into(),
        }
    }

    /// The coordinates of a child of this node, one layer closer to the
    /// leaves.
    pub fn child_at(&self, branch: Branch) -> NodeCoordinates {
        NodeCoordinates {
            tree: self.tree,
            depth: self.depth.deeper(),
            branch,
        }
    }
}

impl fmt::Display for NodeCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}.d{}.b{}", self.tree, self.depth, self.branch)
    }
}

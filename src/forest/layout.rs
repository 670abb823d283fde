//! Leaf distribution across parallel cascade trees.
//!
//! The forest splits the global leaf-index space into contiguous, exclusive
//! per-tree slices, as evenly as possible: the first `n mod T` trees take
//! one extra leaf. It is computed once per scheduling session and read-only
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::error::CascadeError;
use crate::types::{Branch, Depth, LeafRange, NodePath, TreeIndex};

use super::tree::CascadeTree;

/// An ordered set of cascade trees covering all leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeForest {
    trees: Vec<CascadeTree>,
    leaves_per_tree: Vec<usize>,
    leaf_offsets: Vec<usize>,
    total_leaves: usize,
    merge_factor: usize,
}

impl CascadeForest {
    /// Builds `tree_count` trees over `total_leaves` leaves.
    ///
    /// # Errors
    ///
    /// `InvalidTreeCount` if `tree_count == 0`; `InvalidMergeFactor` if
    /// `merge_factor < 2`.
    pub fn build(
        total_leaves: usize,
        tree_count: usize,
        merge_factor: usize,
    ) -> Result<Self, CascadeError> {
        if tree_count == 0 {
            return Err(CascadeError::InvalidTreeCount(tree_count));
        }

        // Even split, remainder to the first trees.
        let mut leaves_per_tree = vec![total_leaves / tree_count; tree_count];
        for count in leaves_per_tree.iter_mut().take(total_leaves % tree_count) {
            *count += 1;
        }

        // Per-tree offsets are the prefix sums of the preceding counts.
        let mut leaf_offsets = Vec::with_capacity(tree_count);
        let mut offset = 0;
        for &count in &leaves_per_tree {
            leaf_offsets.push(offset);
            offset += count;
        }

        let trees = leaves_per_tree
            .iter()
            .map(|&count| CascadeTree::build(count, merge_factor))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CascadeForest {
            trees,
            leaves_per_tree,
            leaf_offsets,
            total_leaves,
            merge_factor,
        })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn total_leaves(&self) -> usize {
        self.total_leaves
    }

    pub fn merge_factor(&self) -> usize {
        self.merge_factor
    }

    /// The tree at `index`.
    pub fn tree(&self, index: TreeIndex) -> Result<&CascadeTree, CascadeError> {
        self.trees
            .get(index.0)
            .ok_or(CascadeError::UnknownTree(index))
    }

    /// The number of leaves the tree at `index` serves.
    pub fn leaf_count(&self, index: TreeIndex) -> Result<usize, CascadeError> {
        self.leaves_per_tree
            .get(index.0)
            .copied()
            .ok_or(CascadeError::UnknownTree(index))
    }

    /// The global index of the first leaf served by the tree at `index`.
    pub fn leaf_offset(&self, index: TreeIndex) -> Result<usize, CascadeError> {
        self.leaf_offsets
            .get(index.0)
            .copied()
            .ok_or(CascadeError::UnknownTree(index))
    }

    /// The global leaf range a leaf-merge node of the given tree consumes.
    pub fn leaf_range(&self, index: TreeIndex, path: &NodePath) -> Result<LeafRange, CascadeError> {
        let offset = self.leaf_offset(index)?;
        let tree_leaves = self.leaf_count(index)?;
        Ok(path.leaf_range(self.merge_factor, offset, tree_leaves))
    }

    /// The tree and leaf-merge node owning a global leaf index.
    pub fn leaf_owner(&self, leaf: usize) -> Option<(TreeIndex, Branch, &NodePath)> {
        let tree_index = self
            .leaf_offsets
            .iter()
            .zip(&self.leaves_per_tree)
            .position(|(&offset, &count)| leaf >= offset && leaf < offset + count)?;
        let tree = &self.trees[tree_index];
        let (branch, path) = tree.leaf_owner(leaf - self.leaf_offsets[tree_index])?;
        Some((TreeIndex(tree_index), branch, path))
    }

    /// The node path at the given coordinates, if present.
    pub fn node(
        &self,
        index: TreeIndex,
        depth: Depth,
        branch: Branch,
    ) -> Result<&NodePath, CascadeError> {
        self.tree(index)?
            .node(depth, branch)
            .ok_or(CascadeError::UnknownNode {
                tree: index,
                depth,
                branch,
            })
    }
}

//! Cascade tree construction.
//!
//! A cascade tree is built bottom-up: the ordered leaf identifiers are
//! repeatedly chunked into groups of at most `merge_factor` until a single
//! group remains, then the nested grouping is flattened into a per-depth
//! registry of node paths. Grouping by a fixed factor keeps merge fan-in
//! bounded and tree height logarithmic in the leaf count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CascadeError;
use crate::types::{Branch, Depth, NodePath};

/// One k-ary reduction tree over a contiguous slice of leaves.
///
/// Maps each depth to the ordered nodes at that depth. Depth 0 holds the
/// single final-merge node; the maximum depth present is the leaf-merge
/// layer, whose nodes consume raw leaves directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeTree {
    layers: BTreeMap<Depth, Vec<NodePath>>,
    leaf_count: usize,
    merge_factor: usize,
}

/// Intermediate nested-grouping structure produced by the chunking passes.
/// Leaves are identified by position, left to right.
#[derive(Debug, Clone)]
enum Grouping {
    Leaf,
    Group(Vec<Grouping>),
}

impl CascadeTree {
    /// Builds the reduction tree for `leaf_count` leaves.
    ///
    /// A tree with at most one leaf degenerates to a single depth-0 node
    /// with the empty path, which is both the root and the leaf-merge node.
    ///
    /// # Errors
    ///
    /// `InvalidMergeFactor` if `merge_factor < 2`.
    pub fn build(leaf_count: usize, merge_factor: usize) -> Result<Self, CascadeError> {
        if merge_factor < 2 {
            return Err(CascadeError::InvalidMergeFactor(merge_factor));
        }

        let mut layers: BTreeMap<Depth, Vec<NodePath>> = BTreeMap::new();

        if leaf_count <= 1 {
            layers.insert(Depth::ROOT, vec![NodePath::root()]);
            return Ok(CascadeTree {
                layers,
                leaf_count,
                merge_factor,
            });
        }

        // Chunk the leaf sequence until a single group remains. Each pass is
        // one level of grouping; the final pass produces the depth-0 node.
        let mut groups: Vec<Grouping> = (0..leaf_count).map(|_| Grouping::Leaf).collect();
        while groups.len() > 1 {
            groups = groups
                .chunks(merge_factor)
                .map(|chunk| Grouping::Group(chunk.to_vec()))
                .collect();
        }

        // Flatten by depth-first traversal. The outer position (empty path)
        // is not itself a node; each descent into child `i` appends `i` and
        // records the extended path. Raw leaves are never recorded.
        let mut paths = Vec::new();
        flatten(&Grouping::Group(groups), None, &mut paths);

        for path in paths {
            layers.entry(path.depth()).or_default().push(path);
        }

        Ok(CascadeTree {
            layers,
            leaf_count,
            merge_factor,
        })
    }

    /// The number of leaves this tree serves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    pub fn merge_factor(&self) -> usize {
        self.merge_factor
    }

    /// The leaf-merge depth: the deepest layer present.
    pub fn max_depth(&self) -> Depth {
        // layers is never empty: even the degenerate tree has a depth-0 node
        *self
            .layers
            .keys()
            .next_back()
            .expect("a cascade tree always has at least the root layer")
    }

    /// The ordered nodes at a depth, or `None` for an absent layer.
    pub fn layer(&self, depth: Depth) -> Option<&[NodePath]> {
        self.layers.get(&depth).map(Vec::as_slice)
    }

    /// The node at (depth, branch), if present.
    pub fn node(&self, depth: Depth, branch: Branch) -> Option<&NodePath> {
        self.layers.get(&depth)?.get(branch.0)
    }

    /// The total number of nodes across all layers.
    pub fn node_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// All children of (depth, branch) at `depth + 1`, in discovery order,
    /// keyed by their own branch numbers.
    ///
    /// Children are the nodes one layer deeper whose parent truncation
    /// equals this node's path. Leaf-merge nodes have no children.
    pub fn children_of(&self, depth: Depth, branch: Branch) -> Vec<(Branch, &NodePath)> {
        let Some(parent) = self.node(depth, branch) else {
            return Vec::new();
        };
        let Some(next_layer) = self.layers.get(&depth.deeper()) else {
            return Vec::new();
        };
        next_layer
            .iter()
            .enumerate()
            .filter(|(_, child)| parent.is_parent_of(child))
            .map(|(i, child)| (Branch(i), child))
            .collect()
    }

    /// The leaf-merge node owning a tree-local leaf index.
    ///
    /// Inverse of the leaf-range encoding: leaf-merge nodes appear in layer
    /// order of the chunks of the first grouping pass, so the owning branch
    /// is `leaf / merge_factor`.
    pub fn leaf_owner(&self, leaf_in_tree: usize) -> Option<(Branch, &NodePath)> {
        if leaf_in_tree >= self.leaf_count {
            return None;
        }
        let branch = Branch(leaf_in_tree / self.merge_factor);
        let path = self.node(self.max_depth(), branch)?;
        Some((branch, path))
    }
}

fn flatten(group: &Grouping, path: Option<NodePath>, out: &mut Vec<NodePath>) {
    let Grouping::Group(children) = group else {
        return;
    };
    let base = match path {
        None => NodePath::root(),
        Some(path) => {
            out.push(path.clone());
            path
        }
    };
    for (i, child) in children.iter().enumerate() {
        flatten(child, Some(base.child(i)), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LeafRange;
    use proptest::prelude::*;

    fn leaf_ranges(tree: &CascadeTree) -> Vec<LeafRange> {
        tree.layer(tree.max_depth())
            .unwrap()
            .iter()
            .map(|path| path.leaf_range(tree.merge_factor(), 0, tree.leaf_count()))
            .collect()
    }

    #[test]
    fn rejects_merge_factor_below_two() {
        assert!(matches!(
            CascadeTree::build(4, 1),
            Err(CascadeError::InvalidMergeFactor(1))
        ));
        assert!(matches!(
            CascadeTree::build(4, 0),
            Err(CascadeError::InvalidMergeFactor(0))
        ));
    }

    #[test]
    fn nine_leaves_factor_three() {
        let tree = CascadeTree::build(9, 3).unwrap();

        assert_eq!(tree.max_depth(), Depth(1));
        assert_eq!(tree.layer(Depth(0)).unwrap().len(), 1);
        assert_eq!(tree.layer(Depth(1)).unwrap().len(), 3);
        assert_eq!(
            leaf_ranges(&tree),
            vec![
                LeafRange::new(0, 3),
                LeafRange::new(3, 6),
                LeafRange::new(6, 9),
            ]
        );
    }

    #[test]
    fn ten_leaves_factor_three_has_short_last_chunk() {
        let tree = CascadeTree::build(10, 3).unwrap();

        assert_eq!(tree.max_depth(), Depth(2));
        assert_eq!(tree.layer(Depth(0)).unwrap().len(), 1);
        assert_eq!(
            leaf_ranges(&tree),
            vec![
                LeafRange::new(0, 3),
                LeafRange::new(3, 6),
                LeafRange::new(6, 9),
                LeafRange::new(9, 10),
            ]
        );
    }

    #[test]
    fn single_leaf_degenerates_to_one_root_node() {
        let tree = CascadeTree::build(1, 2).unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.max_depth(), Depth(0));
        assert_eq!(tree.node(Depth(0), Branch(0)), Some(&NodePath::root()));
        assert!(tree.children_of(Depth(0), Branch(0)).is_empty());
        assert_eq!(leaf_ranges(&tree), vec![LeafRange::new(0, 1)]);
    }

    #[test]
    fn zero_leaves_degenerates_to_one_empty_node() {
        let tree = CascadeTree::build(0, 2).unwrap();

        assert_eq!(tree.node_count(), 1);
        assert_eq!(leaf_ranges(&tree), vec![LeafRange::new(0, 0)]);
    }

    #[test]
    fn children_partition_the_next_layer() {
        let tree = CascadeTree::build(10, 3).unwrap();

        // Depth-1 children of the root are all depth-1 nodes.
        let children = tree.children_of(Depth(0), Branch(0));
        assert_eq!(children.len(), tree.layer(Depth(1)).unwrap().len());

        // Depth-2 children of the two depth-1 nodes are disjoint and cover
        // the whole leaf-merge layer.
        let left = tree.children_of(Depth(1), Branch(0));
        let right = tree.children_of(Depth(1), Branch(1));
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 1);
        assert_eq!(
            left.len() + right.len(),
            tree.layer(Depth(2)).unwrap().len()
        );
        assert!(left.iter().all(|(b, _)| !right.iter().any(|(rb, _)| rb == b)));
    }

    #[test]
    fn leaf_owner_inverts_leaf_range() {
        let tree = CascadeTree::build(10, 3).unwrap();

        for leaf in 0..10 {
            let (branch, path) = tree.leaf_owner(leaf).unwrap();
            let range = path.leaf_range(3, 0, 10);
            assert!(range.contains(leaf), "leaf {} not in {}", leaf, range);
            assert_eq!(tree.node(tree.max_depth(), branch), Some(path));
        }
        assert!(tree.leaf_owner(10).is_none());
    }

    proptest! {
        #[test]
        fn root_layer_has_exactly_one_node(n in 0usize..200, k in 2usize..6) {
            let tree = CascadeTree::build(n, k).unwrap();
            prop_assert_eq!(tree.layer(Depth(0)).unwrap().len(), 1);
        }

        #[test]
        fn leaf_ranges_partition_without_gaps(n in 0usize..200, k in 2usize..6) {
            let tree = CascadeTree::build(n, k).unwrap();
            let ranges = leaf_ranges(&tree);

            let mut expected_start = 0;
            for range in &ranges {
                prop_assert_eq!(range.start, expected_start);
                expected_start = range.end;
            }
            prop_assert_eq!(expected_start, n);
        }

        #[test]
        fn every_internal_node_has_children(n in 2usize..200, k in 2usize..6) {
            let tree = CascadeTree::build(n, k).unwrap();
            let max_depth = tree.max_depth();

            for depth in 0..max_depth.0 {
                let depth = Depth(depth);
                for branch in 0..tree.layer(depth).unwrap().len() {
                    let children = tree.children_of(depth, Branch(branch));
                    prop_assert!(!children.is_empty());
                    prop_assert!(children.len() <= k);
                }
            }
        }

        #[test]
        fn children_are_disjoint_and_cover_layers(n in 2usize..200, k in 2usize..6) {
            let tree = CascadeTree::build(n, k).unwrap();
            let max_depth = tree.max_depth();

            for depth in 0..max_depth.0 {
                let depth = Depth(depth);
                let mut seen = std::collections::BTreeSet::new();
                for branch in 0..tree.layer(depth).unwrap().len() {
                    for (child_branch, _) in tree.children_of(depth, Branch(branch)) {
                        prop_assert!(seen.insert(child_branch), "child claimed twice");
                    }
                }
                prop_assert_eq!(seen.len(), tree.layer(depth.deeper()).unwrap().len());
            }
        }

        #[test]
        fn tree_height_is_logarithmic(n in 2usize..200, k in 2usize..6) {
            let tree = CascadeTree::build(n, k).unwrap();
            // ceil(log_k n), computed without floating point
            let mut expected = 0;
            let mut remaining = n;
            while remaining > 1 {
                remaining = remaining.div_ceil(k);
                expected += 1;
            }
            prop_assert_eq!(tree.max_depth().0 + 1, expected);
        }
    }
}

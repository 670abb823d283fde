//! The scheduled unit of a cascade.
//!
//! A [`ForestController`] wraps the caller's [`MergeCascade`] implementation
//! and owns the lazily-built, write-once forest. A [`BranchNode`] is the
//! ephemeral per-(tree, depth, branch) descriptor the execution engine
//! creates to resolve dependencies, derive the output location, or run the
//! merge. Nodes only read the controller's forest; they carry no state
//! beyond their coordinates.
//!
//! Dependency declarations are returned as data ([`NodeRequirement`],
//! [`WorkflowRequirement`]) for the engine to interpret; this module never
//! schedules anything itself.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CascadeError;
use crate::forest::{CascadeForest, CascadeTree};
use crate::target::{Directory, Target};
use crate::types::{Branch, Depth, LeafRange, NodeCoordinates, NodePath, TreeIndex};

use super::contract::MergeCascade;
use super::progress::{CascadeEvent, ProgressSink};

/// A node's declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRequirement<R> {
    /// A leaf-merge node requires the upstream work producing its leaf
    /// range, described by the caller's opaque requirement value.
    Leaves { range: LeafRange, requirement: R },

    /// An internal node requires the outputs of its children one layer
    /// deeper, keyed by their branch numbers.
    Children(BTreeMap<Branch, NodeCoordinates>),
}

/// A layer's declared workflow-level dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowRequirement<R> {
    /// The leaf-merge layer requires the whole upstream leaf-producing work.
    Leaves(R),

    /// Any other layer requires the full layer one depth further from the
    /// root to complete first.
    NextDepth(Depth),
}

/// The gathered, already-materialized inputs for running one node.
#[derive(Debug, Clone)]
pub enum NodeInputs<T> {
    /// Raw outputs of the upstream leaf requirement (leaf-merge nodes).
    Leaves(Vec<T>),

    /// Child node outputs keyed by branch number (internal nodes).
    Children(BTreeMap<Branch, T>),
}

/// Owns the caller's cascade and the memoized forest.
///
/// The forest is built at most once per controller; concurrent readers need
/// no locking once it exists, and the build itself is guarded by the
/// `OnceLock`.
#[derive(Debug)]
pub struct ForestController<C: MergeCascade> {
    cascade: C,
    forest: OnceLock<CascadeForest>,
}

impl<C: MergeCascade> ForestController<C> {
    pub fn new(cascade: C) -> Self {
        ForestController {
            cascade,
            forest: OnceLock::new(),
        }
    }

    pub fn cascade(&self) -> &C {
        &self.cascade
    }

    /// The forest, building it from the declared leaf count if needed.
    ///
    /// # Errors
    ///
    /// `LeafCountUnknown` when the forest was never resolved and the cascade
    /// declares no leaf count hint. Resolve the upstream requirement and
    /// call [`resolve_forest`](Self::resolve_forest) first in that case.
    pub fn forest(&self) -> Result<&CascadeForest, CascadeError> {
        if let Some(forest) = self.forest.get() {
            return Ok(forest);
        }
        let declared = self
            .cascade
            .leaf_count_hint()
            .ok_or(CascadeError::LeafCountUnknown)?;
        self.resolve_forest(declared)
    }

    /// Builds (or re-reads) the forest for a leaf count resolved from the
    /// upstream requirement.
    ///
    /// This is the single make-or-break build point: a disagreement between
    /// the resolved count and either the declared hint or an already-built
    /// forest is a configuration error, never silently truncated.
    pub fn resolve_forest(&self, resolved_leaves: usize) -> Result<&CascadeForest, CascadeError> {
        if let Some(declared) = self.cascade.leaf_count_hint() {
            if declared != resolved_leaves {
                return Err(CascadeError::LeafCountMismatch {
                    declared,
                    resolved: resolved_leaves,
                });
            }
        }

        if self.forest.get().is_none() {
            let tree_count = self.cascade.cascade_output().tree_count();
            let built = CascadeForest::build(resolved_leaves, tree_count, C::MERGE_FACTOR)?;
            // A lost set() race means another thread built first; the
            // winner is validated below like any pre-existing forest.
            let _ = self.forest.set(built);
        }

        let forest = self.forest.get().expect("forest was just initialized");
        if forest.total_leaves() != resolved_leaves {
            return Err(CascadeError::LeafCountMismatch {
                declared: forest.total_leaves(),
                resolved: resolved_leaves,
            });
        }
        Ok(forest)
    }

    /// The descriptor for the node at `coords`.
    pub fn node(&self, coords: NodeCoordinates) -> BranchNode<'_, C> {
        BranchNode {
            controller: self,
            coords,
        }
    }

    /// All node descriptors of one layer, in branch order.
    ///
    /// This is the branch map the execution engine expands a layer into.
    pub fn branches_at(
        &self,
        tree: TreeIndex,
        depth: Depth,
    ) -> Result<Vec<BranchNode<'_, C>>, CascadeError> {
        let forest = self.forest()?;
        let layer = forest
            .tree(tree)?
            .layer(depth)
            .ok_or(CascadeError::UnknownNode {
                tree,
                depth,
                branch: Branch(0),
            })?;
        Ok((0..layer.len())
            .map(|branch| self.node(NodeCoordinates::new(tree, depth, branch)))
            .collect())
    }
}

/// An ephemeral descriptor for one (tree, depth, branch) position.
#[derive(Debug)]
pub struct BranchNode<'a, C: MergeCascade> {
    controller: &'a ForestController<C>,
    coords: NodeCoordinates,
}

impl<'a, C: MergeCascade> BranchNode<'a, C> {
    pub fn coordinates(&self) -> NodeCoordinates {
        self.coords
    }

    fn tree(&self) -> Result<&'a CascadeTree, CascadeError> {
        self.controller.forest()?.tree(self.coords.tree)
    }

    /// The node's tree path. Fails with `UnknownNode` for coordinates that
    /// do not exist in the forest.
    pub fn path(&self) -> Result<&'a NodePath, CascadeError> {
        self.controller
            .forest()?
            .node(self.coords.tree, self.coords.depth, self.coords.branch)
    }

    /// True for the unique depth-0 node of a tree: its output is the final
    /// artifact.
    pub fn is_root(&self) -> bool {
        self.coords.depth == Depth::ROOT
    }

    /// True for nodes of the deepest layer, which consume raw leaves
    /// directly. A degenerate tree's single node is both root and
    /// leaf-merge node.
    pub fn is_leaf_merge(&self) -> Result<bool, CascadeError> {
        Ok(self.coords.depth == self.tree()?.max_depth())
    }

    /// The global leaf range a leaf-merge node consumes.
    pub fn leaf_range(&self) -> Result<LeafRange, CascadeError> {
        let forest = self.controller.forest()?;
        let path = self.path()?;
        forest.leaf_range(self.coords.tree, path)
    }

    /// Declares this node's dependencies: downward to raw leaves for
    /// leaf-merge nodes, across to child nodes at `depth + 1` otherwise.
    pub fn requires(&self) -> Result<NodeRequirement<C::Requirement>, CascadeError> {
        let path = self.path()?;

        if self.is_leaf_merge()? {
            let range = self
                .controller
                .forest()?
                .leaf_range(self.coords.tree, path)?;
            return Ok(NodeRequirement::Leaves {
                range,
                requirement: self.controller.cascade().cascade_requires(range),
            });
        }

        let children = self
            .tree()?
            .children_of(self.coords.depth, self.coords.branch);
        Ok(NodeRequirement::Children(
            children
                .into_iter()
                .map(|(branch, _)| (branch, self.coords.child_at(branch)))
                .collect(),
        ))
    }

    /// Declares the workflow-level dependency of this node's layer.
    pub fn workflow_requires(&self) -> Result<WorkflowRequirement<C::Requirement>, CascadeError> {
        let _ = self.path()?;
        if self.is_leaf_merge()? {
            Ok(WorkflowRequirement::Leaves(
                self.controller.cascade().cascade_workflow_requires(),
            ))
        } else {
            Ok(WorkflowRequirement::NextDepth(self.coords.depth.deeper()))
        }
    }

    /// The node's output location.
    ///
    /// The root resolves to the declared final output of its tree. Every
    /// other node resolves to a deterministically named artifact in the
    /// cascade cache directory, so repeated scheduling runs address the
    /// same location.
    pub fn output(&self) -> Result<C::Target, CascadeError> {
        let _ = self.path()?;

        let cascade = self.controller.cascade();
        let output = cascade.cascade_output();
        let final_target = output
            .target_for(self.coords.tree.0)
            .ok_or(CascadeError::UnknownTree(self.coords.tree))?;

        if self.is_root() {
            return Ok(final_target.clone());
        }

        let cache = cascade
            .cascade_cache_directory()
            .or_else(|| output.shared_directory())
            .ok_or(CascadeError::CacheDirectoryUnavailable)?;
        let basename = cascade.node_basename(&final_target.basename(), self.coords);
        Ok(cache.child(&basename))
    }

    /// Runs this node's merge over already-materialized inputs.
    ///
    /// Ensures the output's parent directory exists, flattens the inputs
    /// (applying the caller's extraction hook for leaf nodes), invokes the
    /// merge operation, then removes the consumed intermediate inputs unless
    /// retention is configured. Original leaf artifacts are never removed:
    /// they are owned by upstream producers. Removal failures after a
    /// successful merge are non-fatal warnings.
    pub fn run(
        &self,
        inputs: NodeInputs<C::Target>,
        sink: &dyn ProgressSink,
    ) -> Result<C::Target, CascadeError> {
        let is_leaf = self.is_leaf_merge()?;
        let cascade = self.controller.cascade();

        let flattened: Vec<C::Target> = match inputs {
            NodeInputs::Leaves(raw) => {
                if !is_leaf {
                    return Err(CascadeError::MismatchedInputs(
                        "raw leaf artifacts supplied to an internal node",
                    ));
                }
                cascade.extract_leaf_inputs(raw)
            }
            NodeInputs::Children(children) => {
                if is_leaf {
                    return Err(CascadeError::MismatchedInputs(
                        "child outputs supplied to a leaf-merge node",
                    ));
                }
                children.into_values().collect()
            }
        };

        let node = self.path()?.clone();
        sink.publish(CascadeEvent::MergeStarted {
            tree: self.coords.tree,
            node: node.clone(),
        });

        let output = self.output()?;
        if let Some(directory) = output.parent() {
            directory.ensure_exists()?;
        }
        cascade
            .merge(&flattened, &output)
            .map_err(|source| CascadeError::Merge { source })?;

        if !is_leaf && !cascade.keep_intermediates() {
            let mut removed = 0;
            for input in &flattened {
                match input.remove() {
                    Ok(()) => removed += 1,
                    Err(error) => {
                        // The merge result is already valid; cleanup is
                        // best-effort.
                        warn!(node = %node, %error, "failed to remove intermediate input");
                    }
                }
            }
            sink.publish(CascadeEvent::IntermediatesRemoved {
                tree: self.coords.tree,
                node,
                removed,
            });
        }

        Ok(output)
    }
}

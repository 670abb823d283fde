//! The caller-supplied cascade contract.
//!
//! A concrete cascade implements [`MergeCascade`] to tell the scheduler what
//! to merge (the leaf-producing requirement), where the final artifact(s)
//! go, and how two-or-more artifacts combine into one. The scheduler core is
//! generic over this capability set and never inspects artifact content.

use crate::error::MergeError;
use crate::target::Target;
use crate::types::{LeafRange, NodeCoordinates};

/// The final output shape of a cascade: one artifact, or one per tree.
///
/// The forest's tree count is derived from this: a single target means one
/// tree, a per-tree collection means as many trees as it has targets.
#[derive(Debug, Clone)]
pub enum CascadeOutput<T> {
    /// One tree, one final artifact.
    Single(T),

    /// One final artifact per tree, indexed by tree number.
    PerTree(Vec<T>),
}

impl<T: Target> CascadeOutput<T> {
    /// The number of parallel cascade trees this output implies.
    pub fn tree_count(&self) -> usize {
        match self {
            CascadeOutput::Single(_) => 1,
            CascadeOutput::PerTree(targets) => targets.len(),
        }
    }

    /// The final target for a tree, if the index is valid.
    pub fn target_for(&self, tree: usize) -> Option<&T> {
        match self {
            CascadeOutput::Single(target) => (tree == 0).then_some(target),
            CascadeOutput::PerTree(targets) => targets.get(tree),
        }
    }

    /// The directory shared by the final target(s), used as the default
    /// cache location for intermediate artifacts.
    pub fn shared_directory(&self) -> Option<T::Directory> {
        match self {
            CascadeOutput::Single(target) => target.parent(),
            CascadeOutput::PerTree(targets) => targets.first()?.parent(),
        }
    }
}

/// The required capability set for a concrete cascade.
///
/// `Requirement` is an opaque requirement description passed through to the
/// execution engine; this crate never interprets it.
pub trait MergeCascade {
    /// The engine-facing description of upstream leaf-producing work.
    type Requirement;

    /// The artifact handle type.
    type Target: Target;

    /// The branching factor of the reduction trees. A build-time constant
    /// per implementation, not a runtime parameter.
    const MERGE_FACTOR: usize = 2;

    /// The upstream requirement producing the leaves in `range`.
    fn cascade_requires(&self, range: LeafRange) -> Self::Requirement;

    /// The upstream requirement producing all leaves, considered as a whole.
    ///
    /// Only used by the engine to resolve the total leaf count when
    /// [`leaf_count_hint`](Self::leaf_count_hint) is not given.
    fn cascade_workflow_requires(&self) -> Self::Requirement;

    /// The declared final output location(s), one per tree.
    fn cascade_output(&self) -> CascadeOutput<Self::Target>;

    /// Combines the gathered input artifacts into the output artifact.
    ///
    /// Failures propagate unmodified as a failed work unit; the scheduler
    /// performs no local recovery, and a failed merge is retried from its
    /// declared inputs on resubmission.
    fn merge(&self, inputs: &[Self::Target], output: &Self::Target) -> Result<(), MergeError>;

    /// Post-processes the leaf requirement's raw outputs into the artifact
    /// list to merge. Identity by default; override when the upstream
    /// requirement's output is not directly the artifacts to merge.
    fn extract_leaf_inputs(&self, raw: Vec<Self::Target>) -> Vec<Self::Target> {
        raw
    }

    /// The directory holding intermediate node artifacts.
    ///
    /// `None` falls back to the final output's parent directory; if that is
    /// unavailable too, output resolution fails with a configuration error.
    fn cascade_cache_directory(&self) -> Option<<Self::Target as Target>::Directory> {
        None
    }

    /// An explicit total leaf count, avoiding a re-query of the upstream
    /// requirement when the count is already known.
    fn leaf_count_hint(&self) -> Option<usize> {
        None
    }

    /// When true, consumed intermediate artifacts are retained instead of
    /// removed after a successful merge.
    fn keep_intermediates(&self) -> bool {
        false
    }

    /// The deterministic basename of an intermediate node artifact, derived
    /// from the tree's final output basename and the node's coordinates.
    fn node_basename(&self, output_basename: &str, coords: NodeCoordinates) -> String {
        let (name, ext) = crate::target::split_basename(output_basename);
        format!(
            "{name}.t{}.d{}.b{}{ext}",
            coords.tree, coords.depth, coords.branch
        )
    }
}

//! Error types for cascade scheduling.
//!
//! Configuration problems (bad merge factor, unknown coordinates, missing
//! cache directory, leaf-count disagreements) surface here at scheduling
//! time and are never retried. Merge failures from the caller's operation
//! propagate through `CascadeError::Merge` unmodified.

use thiserror::Error;

use crate::target::StorageError;
use crate::types::{Branch, Depth, TreeIndex};

/// The boxed error produced by a caller-supplied merge operation.
pub type MergeError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while declaring or running cascade nodes.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// The branching factor must be at least 2 to form a reduction tree.
    #[error("merge factor {0} is invalid: must be at least 2")]
    InvalidMergeFactor(usize),

    /// The forest must contain at least one tree.
    #[error("tree count {0} is invalid: must be at least 1")]
    InvalidTreeCount(usize),

    /// The forest cannot be built before the leaf count is known.
    #[error(
        "leaf count is unknown: provide a leaf count hint or resolve the \
         upstream requirement before building the forest"
    )]
    LeafCountUnknown,

    /// A declared leaf count disagrees with the count resolved upstream.
    #[error("declared leaf count {declared} disagrees with resolved leaf count {resolved}")]
    LeafCountMismatch { declared: usize, resolved: usize },

    /// No tree exists at this index in the forest.
    #[error("no tree {0} in the forest")]
    UnknownTree(TreeIndex),

    /// No node exists at these coordinates.
    #[error("no node at tree {tree}, depth {depth}, branch {branch}")]
    UnknownNode {
        tree: TreeIndex,
        depth: Depth,
        branch: Branch,
    },

    /// No cache directory could be derived for intermediate outputs.
    #[error(
        "no cascade cache directory available: implement cascade_cache_directory \
         or give the cascade output a parent directory"
    )]
    CacheDirectoryUnavailable,

    /// The inputs handed to `run` do not match the node's role.
    #[error("mismatched inputs for this node: {0}")]
    MismatchedInputs(&'static str),

    /// The caller-supplied merge operation failed.
    #[error("merge failed")]
    Merge {
        #[source]
        source: MergeError,
    },

    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

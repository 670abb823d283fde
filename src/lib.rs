//! Hierarchical merge-cascade scheduler.
//!
//! Given N independently produced leaf artifacts, this crate builds one or
//! more balanced k-ary reduction trees, gives every tree node a stable
//! addressable identifier, and declares, as plain data, the recursive
//! dependency contract an external work-execution engine needs to run the
//! merges in the correct order, culminating in one final artifact per tree.
//!
//! The crate is concurrency-agnostic: it only declares the dependency
//! graph. Scheduling, retries, and distribution belong to the engine; merge
//! semantics belong to the caller, supplied through the [`MergeCascade`]
//! trait. Artifact content is opaque throughout.
//!
//! # Sketch
//!
//! ```ignore
//! let controller = ForestController::new(my_cascade);
//! let forest = controller.resolve_forest(n_leaves)?;
//!
//! // The engine expands each layer into nodes and asks each node what it
//! // needs; `requires()` points at leaves or at children one depth deeper.
//! for node in controller.branches_at(TreeIndex(0), depth)? {
//!     match node.requires()? {
//!         NodeRequirement::Leaves { range, requirement } => { /* schedule upstream work */ }
//!         NodeRequirement::Children(children) => { /* schedule child merges first */ }
//!     }
//! }
//!
//! // Once a node's inputs are durably materialized:
//! node.run(inputs, &LogSink)?;
//! ```

pub mod cascade;
pub mod error;
pub mod forest;
pub mod replica;
pub mod target;
pub mod types;

// Re-export the primary API surface
pub use cascade::{
    BranchNode, CascadeEvent, CascadeOutput, ForestController, LogSink, MergeCascade, NodeInputs,
    NodeRequirement, ProgressSink, WorkflowRequirement,
};
pub use error::{CascadeError, MergeError};
pub use forest::{CascadeForest, CascadeTree};
pub use replica::ReplicaSet;
pub use target::{Directory, LocalDirectory, LocalTarget, StorageError, Target};
pub use types::{Branch, Depth, LeafRange, NodeCoordinates, NodePath, TreeIndex};

//! The merge-cascade scheduling core.
//!
//! This module defines the recursive dependency contract for a cascade:
//!
//! - [`MergeCascade`] — the capability set a concrete cascade implements
//!   (leaf requirements, final output, the merge operation itself)
//! - [`ForestController`] — owns the caller's cascade and the memoized
//!   forest, built exactly once per scheduling session
//! - [`BranchNode`] — the ephemeral per-(tree, depth, branch) descriptor
//!   that declares dependencies, derives output locations, and runs merges
//!
//! # Architecture
//!
//! The core follows the dependencies-as-data pattern: `requires()` and
//! `workflow_requires()` return plain values describing what must complete
//! first; the external execution engine interprets them, decides ordering
//! and parallelism, and calls `run()` once a node's inputs are durably
//! materialized.
//!
//! # Key Invariants
//!
//! 1. **Build-once forest**: whichever descriptor first needs the forest
//!    builds it; all others read the same memoized value.
//! 2. **Depth direction**: depth 0 is the root; dependency traversal for an
//!    internal node steps to `depth + 1`, away from the root.
//! 3. **Single consumer**: each intermediate artifact has exactly one parent
//!    in its tree, and only that parent ever removes it.

pub mod contract;
pub mod node;
pub mod progress;


pub use contract::{CascadeOutput, MergeCascade};
pub use node::{BranchNode, ForestController, NodeInputs, NodeRequirement, WorkflowRequirement};
pub use progress::{CascadeEvent, LogSink, ProgressSink};

//! Core domain types for cascade scheduling.
//!
//! This module contains the coordinate and addressing types used throughout
//! the crate, designed to encode invariants via the type system.

pub mod ids;
pub mod path;

// Re-export commonly used types at the module level
pub use ids::{Branch, Depth, LeafRange, TreeIndex};
pub use path::{NodeCoordinates, NodePath};

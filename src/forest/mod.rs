//! Cascade tree construction and leaf distribution.

pub mod layout;
pub mod tree;

pub use layout::CascadeForest;
pub use tree::CascadeTree;

//! Error types for tree operations

use thiserror::Error;

/// Errors surfaced by [`RbTree`](crate::RbTree) operations.
///
/// Inserting a key that is already present and looking up a missing key are
/// not errors; they are reported through the normal return values.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Minimum or maximum requested on a tree with no nodes
    #[error("tree is empty")]
    EmptyTree,

    /// Node handle is stale, out of range or belongs to another tree
    #[error("node handle does not refer to a live node of this tree")]
    InvalidNode,

    /// Configured node bound reached
    #[error("tree is full: capacity of {capacity} nodes reached")]
    CapacityExhausted {
        /// The configured maximum number of nodes
        capacity: usize,
    },

    /// Arena storage for a new node could not be reserved
    #[error("failed to allocate storage for a new node")]
    AllocationFailed,

    /// Export destination cannot hold every key
    #[error("destination holds {capacity} keys but {needed} are required")]
    BufferTooSmall {
        /// Number of keys in the tree
        needed: usize,
        /// Length of the destination slice
        capacity: usize,
    },

    /// Rejected [`TreeConfig`](crate::TreeConfig)
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Result alias used across the crate
pub type Result<T> = core::result::Result<T, Error>;

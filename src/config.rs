use crate::{Error, Result};

/// Largest node bound accepted, keeps arena indices clear of the nil sentinel
const MAX_NODES: usize = usize::MAX / 2;

/// Construction-time settings for an [`RbTree`](crate::RbTree).
///
/// The default configuration is unbounded and allocates lazily, one node at a
/// time. A node bound turns allocation failure into a predictable
/// [`Error::CapacityExhausted`] instead of growing without limit; with
/// preallocation the whole bound is reserved when the tree is created so that
/// later inserts never touch the allocator.
///
/// # Examples
///
/// ```
/// use rbset::{RbTree, TreeConfig};
///
/// let config = TreeConfig::new().with_max_nodes(128).with_preallocation(true);
/// let tree = RbTree::<u32>::with_config(config).unwrap();
/// assert_eq!(tree.capacity(), Some(128));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeConfig {
    /// Maximum number of live nodes, `None` for unbounded
    max_nodes: Option<usize>,
    /// Reserve storage for `max_nodes` nodes at construction
    preallocate: bool,
}

impl TreeConfig {
    /// Creates the default configuration: unbounded, no preallocation
    pub const fn new() -> Self {
        Self {
            max_nodes: None,
            preallocate: false,
        }
    }

    /// Limits the tree to `max_nodes` live nodes
    ///
    /// # Arguments
    ///
    /// * `max_nodes` - The node bound, must be greater than 0
    pub const fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Reserves arena storage for the whole node bound up front
    pub const fn with_preallocation(mut self, preallocate: bool) -> Self {
        self.preallocate = preallocate;
        self
    }

    /// Returns the node bound, if any
    #[inline]
    pub const fn max_nodes(&self) -> Option<usize> {
        self.max_nodes
    }

    /// Returns whether storage is reserved at construction
    #[inline]
    pub const fn preallocate(&self) -> bool {
        self.preallocate
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self.max_nodes {
            Some(0) => Err(Error::InvalidConfig("node bound must be greater than 0")),
            Some(n) if n > MAX_NODES => Err(Error::InvalidConfig(
                "node bound too large - risk of index overflow",
            )),
            None if self.preallocate => Err(Error::InvalidConfig(
                "preallocation requires a node bound",
            )),
            _ => Ok(()),
        }
    }
}

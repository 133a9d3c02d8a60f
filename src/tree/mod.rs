use alloc::vec::Vec;
use core::{
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    sync::atomic::{AtomicU64, Ordering::Relaxed},
};

use log::{debug, warn};

use crate::{
    Error, Result, TreeConfig,
    node::{Color, NIL, Node, NodeId, Side, Slot},
};

mod erase;
mod insert;
mod rotate;
mod traverse;
mod verify;

pub use traverse::Iter;
pub use verify::Violation;

/// Source of tree identities stamped into every [`NodeId`]
static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, Relaxed)
}

/// An ordered set of unique keys backed by a red-black tree.
///
/// Nodes live in an index arena: children are arena indices owned by the
/// tree, parents are plain back-indices used while rebalancing. Vacated
/// cells are kept on a free list and reused by later inserts.
///
/// Every insert and erase restores the red-black invariants before returning,
/// which bounds the height of the tree by `2 * log2(n + 1)`:
/// - the root is black
/// - no red node has a red child
/// - every path from a node to a nil link crosses the same number of black nodes
///
/// # Examples
///
/// ```
/// use rbset::RbTree;
///
/// let mut tree = RbTree::new();
/// for key in [5, 2, 8, 1, 9, 3] {
///     tree.insert(key).unwrap();
/// }
///
/// let five = tree.find(&5).unwrap();
/// assert_eq!(tree.erase(five), Ok(5));
/// assert_eq!(tree.to_vec(), vec![1, 2, 3, 8, 9]);
/// ```
pub struct RbTree<K> {
    /// Node storage, indexed by the links stored in each node
    slots: Vec<Slot<K>>,

    /// Stack of vacant slot indices available for reuse
    free: Vec<usize>,

    /// Index of the root node, `NIL` when the tree is empty
    root: usize,

    /// Number of keys currently stored
    len: usize,

    /// Identity of this tree, carried by every handle it hands out
    id: u64,

    config: TreeConfig,
}

impl<K> RbTree<K> {
    /// Creates an empty, unbounded tree.
    ///
    /// Does not allocate anything on its own.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NIL,
            len: 0,
            id: next_tree_id(),
            config: TreeConfig::new(),
        }
    }

    /// Creates an empty tree with the given configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Node bound and preallocation settings
    ///
    /// # Returns
    ///
    /// * `Result<Self>` - The tree, or [`Error::InvalidConfig`] /
    ///   [`Error::AllocationFailed`] if the configuration cannot be honored
    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;

        let mut tree = Self::new();
        tree.config = config;

        if let (Some(max_nodes), true) = (config.max_nodes(), config.preallocate()) {
            tree.slots
                .try_reserve_exact(max_nodes)
                .map_err(|_| Error::AllocationFailed)?;
            tree.free
                .try_reserve_exact(max_nodes)
                .map_err(|_| Error::AllocationFailed)?;
        }

        Ok(tree)
    }

    /// Creates an empty tree holding at most `capacity` keys, with storage
    /// reserved up front.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(
            TreeConfig::new()
                .with_max_nodes(capacity)
                .with_preallocation(true),
        )
    }

    /// Returns the number of keys in the tree
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree holds no keys
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Returns the configured node bound, `None` when unbounded
    #[inline]
    pub const fn capacity(&self) -> Option<usize> {
        self.config.max_nodes()
    }

    /// Returns how many more keys fit under the node bound
    #[inline]
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.config.max_nodes().map(|max| max - self.len)
    }

    /// Returns the configuration the tree was built with
    #[inline]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Returns a handle to the root node
    pub fn root(&self) -> Option<NodeId> {
        (self.root != NIL).then(|| self.handle(self.root))
    }

    /// Removes every key, releasing all nodes.
    ///
    /// Handles obtained before the call become invalid. Arena storage is kept
    /// for reuse.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
        self.root = NIL;
        self.len = 0;
        debug!("tree {} cleared", self.id);
    }

    /// Returns the key of the node behind `id`, `None` if the handle is stale
    /// or belongs to another tree
    pub fn get(&self, id: NodeId) -> Option<&K> {
        self.resolve(id).map(|idx| &self.node_at(idx).key)
    }

    /// Returns the current color of the node behind `id`
    pub fn color(&self, id: NodeId) -> Option<Color> {
        self.resolve(id).map(|idx| self.node_at(idx).color)
    }

    /// Returns a handle to the node holding the smallest key
    ///
    /// # Returns
    ///
    /// * `Result<NodeId>` - The handle, or [`Error::EmptyTree`]
    pub fn min(&self) -> Result<NodeId> {
        if self.root == NIL {
            return Err(Error::EmptyTree);
        }
        Ok(self.handle(self.subtree_extreme(self.root, Side::Left)))
    }

    /// Returns a handle to the node holding the largest key
    ///
    /// # Returns
    ///
    /// * `Result<NodeId>` - The handle, or [`Error::EmptyTree`]
    pub fn max(&self) -> Result<NodeId> {
        if self.root == NIL {
            return Err(Error::EmptyTree);
        }
        Ok(self.handle(self.subtree_extreme(self.root, Side::Right)))
    }

    /// Returns the smallest key
    pub fn first(&self) -> Option<&K> {
        self.min().ok().and_then(|id| self.get(id))
    }

    /// Returns the largest key
    pub fn last(&self) -> Option<&K> {
        self.max().ok().and_then(|id| self.get(id))
    }

    pub(crate) fn handle(&self, idx: usize) -> NodeId {
        NodeId {
            tree: self.id,
            index: idx,
            generation: self.slots[idx].generation,
        }
    }

    /// Maps a handle back to an arena index if it still names a live node here
    pub(crate) fn resolve(&self, id: NodeId) -> Option<usize> {
        if id.tree != self.id {
            return None;
        }
        let slot = self.slots.get(id.index)?;
        (slot.generation == id.generation && slot.node.is_some()).then_some(id.index)
    }

    /// Places a new node in a vacant slot, growing the arena if needed
    fn allocate_node(&mut self, key: K, parent: usize, color: Color) -> Result<usize> {
        if let Some(max_nodes) = self.config.max_nodes().filter(|&max| self.len >= max) {
            warn!("tree {} rejected insert: {max_nodes} nodes in use", self.id);
            return Err(Error::CapacityExhausted {
                capacity: max_nodes,
            });
        }

        let node = Node::new(key, parent, color);

        if let Some(idx) = self.free.pop() {
            self.slots[idx].node = Some(node);
            return Ok(idx);
        }

        // The free list must be able to take every slot back without allocating.
        let idx = self.slots.len();
        self.slots.try_reserve(1).map_err(|_| {
            warn!("tree {} could not grow node storage", self.id);
            Error::AllocationFailed
        })?;
        self.free.try_reserve(idx + 1).map_err(|_| {
            warn!("tree {} could not grow free list", self.id);
            Error::AllocationFailed
        })?;

        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        Ok(idx)
    }

    /// Vacates a slot and hands back the key it held
    fn release_node(&mut self, idx: usize) -> Option<K> {
        let slot = &mut self.slots[idx];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(idx);
        Some(node.key)
    }

    #[inline]
    pub(crate) fn node_at(&self, idx: usize) -> &Node<K> {
        match &self.slots[idx].node {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    #[inline]
    pub(crate) fn node_at_mut(&mut self, idx: usize) -> &mut Node<K> {
        match &mut self.slots[idx].node {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    #[inline]
    pub(crate) fn color_of(&self, idx: usize) -> Color {
        if idx == NIL {
            Color::Black
        } else {
            self.node_at(idx).color
        }
    }

    #[inline]
    pub(crate) fn set_color(&mut self, idx: usize, color: Color) {
        if idx != NIL {
            self.node_at_mut(idx).color = color;
        }
    }

    #[inline]
    pub(crate) fn is_red(&self, idx: usize) -> bool {
        self.color_of(idx) == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self, idx: usize) -> bool {
        self.color_of(idx) == Color::Black
    }

    #[inline]
    pub(crate) fn parent(&self, idx: usize) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).parent
        }
    }

    #[inline]
    pub(crate) fn child(&self, idx: usize, side: Side) -> usize {
        if idx == NIL {
            NIL
        } else {
            self.node_at(idx).child(side)
        }
    }

    /// Which side of its parent `idx` hangs from. `idx` must not be the root.
    #[inline]
    pub(crate) fn side_of(&self, idx: usize) -> Side {
        if self.child(self.parent(idx), Side::Left) == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Points `parent`'s link that currently holds `old` at `new`; a nil
    /// `parent` means `old` was the root.
    pub(crate) fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
        } else if self.node_at(parent).left == old {
            self.node_at_mut(parent).left = new;
        } else {
            self.node_at_mut(parent).right = new;
        }
    }

    /// Follows `side` links from `idx` to the end: the minimum for `Left`,
    /// the maximum for `Right`.
    pub(crate) fn subtree_extreme(&self, mut idx: usize, side: Side) -> usize {
        while idx != NIL {
            let next = self.node_at(idx).child(side);
            if next == NIL {
                break;
            }
            idx = next;
        }
        idx
    }

    /// In-order neighbour of `idx` toward `side`: the successor for `Right`,
    /// the predecessor for `Left`.
    pub(crate) fn neighbor(&self, idx: usize, side: Side) -> usize {
        let child = self.child(idx, side);
        if child != NIL {
            return self.subtree_extreme(child, side.opposite());
        }

        let mut current = idx;
        let mut parent = self.parent(current);
        while parent != NIL && self.child(parent, side) == current {
            current = parent;
            parent = self.parent(current);
        }
        parent
    }
}

impl<K: Ord> RbTree<K> {
    /// Looks up the node holding `key`
    ///
    /// # Returns
    ///
    /// * `Option<NodeId>` - The handle, or `None` if the key is absent
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find_index(key);
        (idx != NIL).then(|| self.handle(idx))
    }

    /// Returns `true` if `key` is present
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_index(key) != NIL
    }

    pub(crate) fn find_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;

        while current != NIL {
            let node = self.node_at(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return current,
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        NIL
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone> Clone for RbTree<K> {
    /// The clone gets its own identity: handles from `self` are not valid in it.
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free: self.free.clone(),
            root: self.root,
            len: self.len,
            id: next_tree_id(),
            config: self.config,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::init_logging;

    #[test]
    fn test_rbtree_creation() {
        let tree = RbTree::<i32>::new();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.capacity(), None);
        assert_eq!(tree.remaining_capacity(), None);
        assert!(tree.root().is_none());
        assert_eq!(tree.min(), Err(Error::EmptyTree));
        assert_eq!(tree.max(), Err(Error::EmptyTree));
        assert!(tree.first().is_none());
        assert!(tree.last().is_none());
        assert!(tree.find(&1).is_none());
    }

    #[test]
    fn test_rbtree_with_capacity() {
        let tree = RbTree::<i32>::with_capacity(10).unwrap();
        assert_eq!(tree.capacity(), Some(10));
        assert_eq!(tree.remaining_capacity(), Some(10));
        assert!(tree.slots.capacity() >= 10);
        assert!(tree.free.capacity() >= 10);
    }

    #[test]
    fn test_rbtree_zero_capacity() {
        assert!(matches!(
            RbTree::<i32>::with_capacity(0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rbtree_single_element() {
        let mut tree = RbTree::new();

        let id = tree.insert(42).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), Some(id));
        assert_eq!(tree.color(id), Some(Color::Black));
        assert_eq!(tree.min(), Ok(id));
        assert_eq!(tree.max(), Ok(id));
        assert_eq!(tree.first(), Some(&42));
        assert_eq!(tree.last(), Some(&42));

        assert_eq!(tree.erase(id), Ok(42));
        assert!(tree.is_empty());
        assert_eq!(tree.min(), Err(Error::EmptyTree));
    }

    #[test]
    fn test_find_and_contains() {
        let mut tree = RbTree::new();
        for key in [50, 25, 75, 12, 37, 62, 87] {
            tree.insert(key).unwrap();
        }

        for key in [50, 25, 75, 12, 37, 62, 87] {
            let id = tree.find(&key).unwrap();
            assert_eq!(tree.get(id), Some(&key));
            assert!(tree.contains(&key));
        }
        assert!(tree.find(&0).is_none());
        assert!(tree.find(&51).is_none());
        assert!(!tree.contains(&100));
    }

    #[test]
    fn test_find_by_borrowed_key() {
        let mut tree = RbTree::new();
        tree.insert(alloc::string::String::from("beta")).unwrap();
        tree.insert(alloc::string::String::from("alpha")).unwrap();

        assert!(tree.contains("alpha"));
        assert!(tree.find("gamma").is_none());
    }

    #[test]
    fn test_min_max() {
        let mut tree = RbTree::new();
        for key in [5, 3, 7, 1, 9] {
            tree.insert(key).unwrap();
        }

        let min = tree.min().unwrap();
        let max = tree.max().unwrap();
        assert_eq!(tree.get(min), Some(&1));
        assert_eq!(tree.get(max), Some(&9));
    }

    #[test]
    fn test_capacity_limits() {
        init_logging();
        let mut tree = RbTree::with_capacity(3).unwrap();

        tree.insert(1).unwrap();
        tree.insert(2).unwrap();
        tree.insert(3).unwrap();
        assert_eq!(tree.remaining_capacity(), Some(0));

        assert_eq!(
            tree.insert(4),
            Err(Error::CapacityExhausted { capacity: 3 })
        );
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.to_vec(), vec![1, 2, 3]);
        assert!(tree.verify().is_ok());

        // duplicates never need a node
        assert!(tree.insert(2).is_ok());
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_memory_reuse() {
        let mut tree = RbTree::with_capacity(3).unwrap();

        tree.insert(1).unwrap();
        tree.insert(2).unwrap();
        tree.insert(3).unwrap();

        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(tree.remove(&2), Some(2));
        assert_eq!(tree.remove(&3), Some(3));
        assert_eq!(tree.remaining_capacity(), Some(3));

        tree.insert(4).unwrap();
        tree.insert(5).unwrap();
        tree.insert(6).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.remaining_capacity(), Some(0));
        assert_eq!(tree.slots.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut tree = RbTree::new();
        let ids: Vec<_> = (1..=5).map(|k| tree.insert(k).unwrap()).collect();
        assert_eq!(tree.len(), 5);

        tree.clear();
        assert_eq!(tree.len(), 0);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        for id in ids {
            assert!(tree.get(id).is_none());
        }

        tree.insert(42).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.slots.len(), 5);
        assert!(tree.verify().is_ok());
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut tree = RbTree::new();
        let old = tree.insert(1).unwrap();
        tree.erase(old).unwrap();

        let new = tree.insert(2).unwrap();
        assert_eq!(new.index, old.index);
        assert_ne!(new, old);
        assert!(tree.get(old).is_none());
        assert_eq!(tree.get(new), Some(&2));
    }

    #[test]
    fn test_generation_counts_past_u32() {
        let mut tree = RbTree::new();
        let old = tree.insert(1).unwrap();
        tree.slots[old.index].generation = u64::from(u32::MAX);
        let old = tree.handle(old.index);

        tree.erase(old).unwrap();
        let new = tree.insert(2).unwrap();
        assert_eq!(new.index, old.index);
        assert_eq!(new.generation, u64::from(u32::MAX) + 1);
        assert!(tree.get(old).is_none());
        assert!(tree.get(NodeId { generation: 0, ..new }).is_none());
        assert_eq!(tree.get(new), Some(&2));
    }

    #[test]
    fn test_preallocation_failure() {
        init_logging();
        let config = TreeConfig::new()
            .with_max_nodes(usize::MAX / 2)
            .with_preallocation(true);
        assert!(config.validate().is_ok());
        assert_eq!(
            RbTree::<u64>::with_config(config).err(),
            Some(Error::AllocationFailed)
        );
    }

    #[test]
    fn test_handles_are_tree_specific() {
        let mut a = RbTree::new();
        let mut b = RbTree::new();
        let id_a = a.insert(1).unwrap();
        b.insert(1).unwrap();

        assert!(b.get(id_a).is_none());
        assert_eq!(b.erase(id_a), Err(Error::InvalidNode));
        assert_eq!(b.len(), 1);

        let copy = a.clone();
        assert!(copy.get(id_a).is_none());
        assert_eq!(copy.to_vec(), vec![1]);
    }

    #[test]
    fn test_neighbor_walk() {
        let mut tree = RbTree::new();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(key).unwrap();
        }

        let mut idx = tree.subtree_extreme(tree.root, Side::Left);
        let mut forward = Vec::new();
        while idx != NIL {
            forward.push(tree.node_at(idx).key);
            idx = tree.neighbor(idx, Side::Right);
        }
        assert_eq!(forward, vec![1, 2, 3, 4, 5, 6, 7]);

        let mut idx = tree.subtree_extreme(tree.root, Side::Right);
        let mut backward = Vec::new();
        while idx != NIL {
            backward.push(tree.node_at(idx).key);
            idx = tree.neighbor(idx, Side::Left);
        }
        assert_eq!(backward, vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_debug_format() {
        let mut tree = RbTree::new();
        for key in [2, 1, 3] {
            tree.insert(key).unwrap();
        }
        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }
}

use core::fmt;

/// Sentinel index representing an absent link (a nil leaf).
pub(crate) const NIL: usize = usize::MAX;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from a node to its nil links have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Red node, cannot be adjacent to other red nodes
    Red,
    /// Black node, contributes to black height. Nil links count as black.
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("R"),
            Color::Black => f.write_str("B"),
        }
    }
}

/// Which child link of a node. Fixups are written once against a `Side`
/// and run for both mirror images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A node in the arena: key, color and the three index links.
///
/// `left` and `right` are owning links within the arena, `parent` is only
/// used to walk upward during fixups, rotations and iteration.
#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) parent: usize,
    pub(crate) left: usize,
    pub(crate) right: usize,
}

impl<K> Node<K> {
    pub(crate) const fn new(key: K, parent: usize, color: Color) -> Self {
        Self {
            key,
            color,
            parent,
            left: NIL,
            right: NIL,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, side: Side, child: usize) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// One arena cell. The generation is bumped every time the cell is vacated,
/// which invalidates every [`NodeId`] handed out for the previous occupant.
#[derive(Debug, Clone)]
pub(crate) struct Slot<K> {
    pub(crate) generation: u64,
    pub(crate) node: Option<Node<K>>,
}

/// Handle to a node stored in an [`RbTree`](crate::RbTree).
///
/// Handles are cheap to copy and stay valid while the node they refer to is
/// in the tree, including across rotations and the relinking done when a
/// neighbouring key is erased. A handle from another tree, or one whose node
/// has since been erased, is rejected by the tree instead of being followed.
///
/// Tree identities and slot generations are 64-bit counters, so a handle can
/// only be mistaken for a live one after 2^64 trees have been created or one
/// slot has been reused 2^64 times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) index: usize,
    pub(crate) generation: u64,
}

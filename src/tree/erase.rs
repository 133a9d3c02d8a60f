use core::borrow::Borrow;

use log::{debug, trace, warn};

use super::RbTree;
use crate::{
    Error, Result,
    node::{Color, NIL, NodeId, Side},
};

impl<K: Ord> RbTree<K> {
    /// Erases the node behind `id` and returns its key.
    ///
    /// # Arguments
    ///
    /// * `id` - Handle to a node of this tree
    ///
    /// # Returns
    ///
    /// * `Result<K>` - The erased key, or [`Error::InvalidNode`] if the handle
    ///   is stale or was issued by another tree; the tree is then unchanged.
    pub fn erase(&mut self, id: NodeId) -> Result<K> {
        let Some(target) = self.resolve(id) else {
            warn!("tree {}: rejected erase with invalid handle {id:?}", self.id);
            return Err(Error::InvalidNode);
        };
        self.delete_node(target).ok_or(Error::InvalidNode)
    }

    /// Removes `key` from the tree
    ///
    /// # Returns
    ///
    /// * `Option<K>` - The stored key, or `None` if it was not present
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find_index(key);
        if target == NIL {
            return None;
        }
        self.delete_node(target)
    }

    fn delete_node(&mut self, target: usize) -> Option<K> {
        let (original_color, fixup_node, fixup_parent) = self.splice(target);

        // removing a red node leaves every black height intact
        if original_color == Color::Black {
            self.fix_deletion_violations(fixup_node, fixup_parent);
        }
        self.len -= 1;

        let key = self.release_node(target);

        debug_assert!(
            self.verify().is_ok(),
            "RB tree invariants violated after removal"
        );
        debug!("tree {}: erased node {target}, len {}", self.id, self.len);

        key
    }

    /// Detaches `target` from the tree.
    ///
    /// With two children the in-order successor is physically moved into
    /// `target`'s position and takes over its color; keys never move between
    /// nodes, so outstanding handles keep naming the same key.
    ///
    /// # Returns
    ///
    /// * `(Color, usize, usize)` - Color of the node that left its position,
    ///   the node now occupying that position (possibly nil) and its parent
    fn splice(&mut self, target: usize) -> (Color, usize, usize) {
        let node = self.node_at(target);
        let (left, right, color, parent) = (node.left, node.right, node.color, node.parent);

        if left == NIL || right == NIL {
            let child = if left == NIL { right } else { left };
            self.transplant(target, child);
            return (color, child, parent);
        }

        let successor = self.subtree_extreme(right, Side::Left);
        let successor_color = self.color_of(successor);
        let fixup_node = self.node_at(successor).right;

        let fixup_parent = if self.node_at(successor).parent == target {
            successor
        } else {
            let successor_parent = self.node_at(successor).parent;
            self.transplant(successor, fixup_node);
            self.node_at_mut(successor).right = right;
            self.node_at_mut(right).parent = successor;
            successor_parent
        };

        self.transplant(target, successor);
        let moved = self.node_at_mut(successor);
        moved.left = left;
        moved.color = color;
        self.node_at_mut(left).parent = successor;

        (successor_color, fixup_node, fixup_parent)
    }

    /// Puts the subtree rooted at `new` where `old` was. `old`'s own links
    /// are left as they are.
    fn transplant(&mut self, old: usize, new: usize) {
        let parent = self.node_at(old).parent;
        self.replace_child(parent, old, new);
        if new != NIL {
            self.node_at_mut(new).parent = parent;
        }
    }

    /// Absorbs the missing black unit at `node`. `node` may be nil, so its
    /// position is tracked through `parent`. Both mirror images run through
    /// `side`, the side of `parent` that `node` occupies.
    fn fix_deletion_violations(&mut self, mut node: usize, mut parent: usize) {
        while node != self.root && self.is_black(node) {
            if node != NIL {
                parent = self.parent(node);
            }

            let side = if self.child(parent, Side::Left) == node {
                Side::Left
            } else {
                Side::Right
            };
            let far = side.opposite();
            let mut sibling = self.child(parent, far);

            if self.is_red(sibling) {
                trace!("erase fixup at {parent}: red sibling, rotating toward {side:?}");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, far);
            }

            if self.is_black(self.child(sibling, Side::Left))
                && self.is_black(self.child(sibling, Side::Right))
            {
                trace!("erase fixup at {parent}: black nephews, moving deficiency up");
                self.set_color(sibling, Color::Red);
                node = parent;
                parent = self.parent(node);
            } else {
                if self.is_black(self.child(sibling, far)) {
                    trace!("erase fixup at {parent}: red near nephew, rotating sibling");
                    self.set_color(self.child(sibling, side), Color::Black);
                    self.set_color(sibling, Color::Red);
                    self.rotate(sibling, far);
                    sibling = self.child(parent, far);
                }

                trace!("erase fixup at {parent}: red far nephew, absorbing");
                self.set_color(sibling, self.color_of(parent));
                self.set_color(parent, Color::Black);
                self.set_color(self.child(sibling, far), Color::Black);
                self.rotate(parent, side);
                node = self.root;
            }
        }

        self.set_color(node, Color::Black);
    }
}

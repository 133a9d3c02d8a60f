use core::cmp::Ordering;

use log::{debug, trace};

use super::RbTree;
use crate::{
    Result,
    node::{Color, NIL, NodeId, Side},
};

impl<K: Ord> RbTree<K> {
    /// Inserts `key`, rebalancing the tree as needed.
    ///
    /// Inserting a key that is already present is a no-op: no node is
    /// allocated and the tree is left untouched.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert
    ///
    /// # Returns
    ///
    /// * `Result<NodeId>` - Handle to the node holding `key`, either the new
    ///   node or the one already present. Fails with
    ///   [`Error::CapacityExhausted`](crate::Error::CapacityExhausted) or
    ///   [`Error::AllocationFailed`](crate::Error::AllocationFailed), in which
    ///   case the tree is unchanged.
    pub fn insert(&mut self, key: K) -> Result<NodeId> {
        let mut parent = NIL;
        let mut side = Side::Left;
        let mut current = self.root;

        while current != NIL {
            parent = current;
            let node = self.node_at(current);
            side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    trace!("tree {}: key already present at node {current}", self.id);
                    return Ok(self.handle(current));
                }
            };
            current = node.child(side);
        }

        let color = if parent == NIL {
            Color::Black
        } else {
            Color::Red
        };
        let new_idx = self.allocate_node(key, parent, color)?;

        if parent == NIL {
            self.root = new_idx;
        } else {
            self.node_at_mut(parent).set_child(side, new_idx);
        }
        self.len += 1;

        self.fix_insertion_violations(new_idx);

        debug_assert!(
            self.verify().is_ok(),
            "RB tree invariants violated after insertion"
        );
        debug!("tree {}: inserted node {new_idx}, len {}", self.id, self.len);

        Ok(self.handle(new_idx))
    }

    /// Repairs the red-red edge a freshly linked red node may form with its
    /// parent. Both mirror images run through `side`, the side of the
    /// grandparent the parent hangs from.
    fn fix_insertion_violations(&mut self, mut node: usize) {
        while node != self.root && self.is_red(self.parent(node)) {
            // a red parent is never the root, so the grandparent exists
            let parent = self.parent(node);
            let grandparent = self.parent(parent);
            let side = self.side_of(parent);
            let uncle = self.child(grandparent, side.opposite());

            if self.is_red(uncle) {
                trace!("insert fixup at {node}: red uncle, recoloring");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                if grandparent != self.root {
                    self.set_color(grandparent, Color::Red);
                }
                node = grandparent;
            } else {
                if node == self.child(parent, side.opposite()) {
                    trace!("insert fixup at {node}: inner grandchild, straightening");
                    node = parent;
                    self.rotate(node, side);
                }
                trace!("insert fixup at {node}: black uncle, rotating grandparent");
                let parent = self.parent(node);
                let grandparent = self.parent(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                self.rotate(grandparent, side.opposite());
                break;
            }
        }
        self.set_color(self.root, Color::Black);
    }
}

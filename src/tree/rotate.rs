use log::trace;

use super::RbTree;
use crate::node::{NIL, Side};

impl<K> RbTree<K> {
    /// Rotates `node` down toward `side`, promoting its child on the opposite
    /// side into its place.
    ///
    /// `rotate(z, Side::Left)` is the classic left rotation (requires a right
    /// child), `rotate(z, Side::Right)` its mirror. In-order key sequence is
    /// preserved; the grandparent link (or the root) and every parent
    /// back-link touched are updated. O(1), never recurses.
    pub(crate) fn rotate(&mut self, node: usize, side: Side) {
        if node == NIL {
            return;
        }

        let pivot = self.node_at(node).child(side.opposite());
        debug_assert!(pivot != NIL, "rotation at {node} without a child to promote");
        if pivot == NIL {
            return;
        }
        trace!("rotate {side:?} at {node}, promoting {pivot}");

        let inner = self.node_at(pivot).child(side);
        self.node_at_mut(node).set_child(side.opposite(), inner);
        if inner != NIL {
            self.node_at_mut(inner).parent = node;
        }

        let parent = self.node_at(node).parent;
        self.node_at_mut(pivot).parent = parent;
        self.replace_child(parent, node, pivot);

        self.node_at_mut(pivot).set_child(side, node);
        self.node_at_mut(node).parent = pivot;
    }
}

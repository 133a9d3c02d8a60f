use thiserror::Error;

use super::RbTree;
use crate::node::{Color, NIL};

/// A broken structural invariant, as reported by [`RbTree::verify`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The root node is red
    #[error("root is red")]
    RedRoot,

    /// A red node has a red child
    #[error("red node has a red child")]
    RedRedEdge,

    /// Two paths from the same node cross a different number of black nodes
    #[error("black height differs between sibling subtrees")]
    BlackHeightMismatch,

    /// A key is not strictly between its ancestors' bounds
    #[error("keys are out of order")]
    OutOfOrder,

    /// A child's parent link does not point back at its parent
    #[error("parent link does not point back to the parent")]
    BrokenParentLink,

    /// Reachable node count differs from the tracked length
    #[error("{counted} reachable nodes but length is {len}")]
    LengthMismatch {
        /// Nodes reachable from the root
        counted: usize,
        /// Tracked number of keys
        len: usize,
    },
}

impl<K: Ord> RbTree<K> {
    /// Checks every red-black and search-tree invariant.
    ///
    /// # Returns
    ///
    /// * `Result<usize, Violation>` - The black height (black nodes on any
    ///   root-to-nil path, 0 for an empty tree), or the first broken invariant
    pub fn verify(&self) -> Result<usize, Violation> {
        if self.is_red(self.root) {
            return Err(Violation::RedRoot);
        }

        let mut counted = 0;
        let black_height = self.verify_subtree(self.root, NIL, None, None, &mut counted)?;

        if counted != self.len {
            return Err(Violation::LengthMismatch {
                counted,
                len: self.len,
            });
        }
        Ok(black_height)
    }

    fn verify_subtree(
        &self,
        idx: usize,
        parent: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        counted: &mut usize,
    ) -> Result<usize, Violation> {
        if idx == NIL {
            return Ok(0);
        }

        let node = self.node_at(idx);
        *counted += 1;

        if node.parent != parent {
            return Err(Violation::BrokenParentLink);
        }
        if lower.is_some_and(|lower| node.key <= *lower)
            || upper.is_some_and(|upper| node.key >= *upper)
        {
            return Err(Violation::OutOfOrder);
        }
        if node.color == Color::Red && (self.is_red(node.left) || self.is_red(node.right)) {
            return Err(Violation::RedRedEdge);
        }

        let left = self.verify_subtree(node.left, idx, lower, Some(&node.key), counted)?;
        let right = self.verify_subtree(node.right, idx, Some(&node.key), upper, counted)?;

        if left != right {
            return Err(Violation::BlackHeightMismatch);
        }

        Ok(left + usize::from(node.color == Color::Black))
    }
}

impl<K> RbTree<K> {
    /// Returns the number of nodes on the longest root-to-leaf path, 0 for an
    /// empty tree. Never exceeds `2 * log2(len + 1)`.
    pub fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, idx: usize) -> usize {
        if idx == NIL {
            return 0;
        }
        let node = self.node_at(idx);
        1 + self.subtree_height(node.left).max(self.subtree_height(node.right))
    }
}

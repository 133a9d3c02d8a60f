use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator};

use log::warn;

use super::RbTree;
use crate::{Error, Result, node::Side};

/// In-order iterator over the keys of an [`RbTree`], smallest first.
///
/// Walks parent links instead of keeping a stack, so creating one is free.
#[derive(Debug)]
pub struct Iter<'a, K> {
    tree: &'a RbTree<K>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RbTree<K>) -> Self {
        Self {
            tree,
            front: tree.subtree_extreme(tree.root, Side::Left),
            back: tree.subtree_extreme(tree.root, Side::Right),
            remaining: tree.len,
        }
    }

    fn next_index(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front;
        self.front = self.tree.neighbor(idx, Side::Right);
        self.remaining -= 1;
        Some(idx)
    }

    fn next_back_index(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back;
        self.back = self.tree.neighbor(idx, Side::Left);
        self.remaining -= 1;
        Some(idx)
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.next_index().map(|idx| &tree.node_at(idx).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> DoubleEndedIterator for Iter<'_, K> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        self.next_back_index().map(|idx| &tree.node_at(idx).key)
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<'a, K> IntoIterator for &'a RbTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K> RbTree<K> {
    /// Returns an iterator over the keys in ascending order
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Copies every key, in ascending order, into the front of `dst`.
    ///
    /// A destination shorter than [`len`](Self::len) is rejected as a whole:
    /// nothing is written and [`Error::BufferTooSmall`] is returned, so a
    /// successful call always exports the complete set.
    ///
    /// # Arguments
    ///
    /// * `dst` - The destination slice
    ///
    /// # Returns
    ///
    /// * `Result<usize>` - Number of keys written, equal to `len()`
    pub fn export_sorted(&self, dst: &mut [K]) -> Result<usize>
    where
        K: Clone,
    {
        self.check_export(dst.len())?;

        for (slot, key) in dst.iter_mut().zip(self.iter()) {
            slot.clone_from(key);
        }
        Ok(self.len)
    }

    /// Fails unless `capacity` slots can hold every key
    pub(crate) fn check_export(&self, capacity: usize) -> Result<()> {
        if self.len > capacity {
            warn!(
                "tree {}: export rejected, {} keys into {capacity} slots",
                self.id, self.len
            );
            return Err(Error::BufferTooSmall {
                needed: self.len,
                capacity,
            });
        }
        Ok(())
    }

    /// Returns the keys in ascending order
    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().cloned().collect()
    }
}

/// Prints keys in order with their colors, `1(B) 2(R)`.
impl<K: fmt::Display> fmt::Display for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        let mut sep = "";
        while let Some(idx) = iter.next_index() {
            let node = self.node_at(idx);
            write!(f, "{sep}{}({})", node.key, node.color)?;
            sep = " ";
        }
        Ok(())
    }
}

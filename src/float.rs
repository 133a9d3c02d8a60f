use num_traits::float::FloatCore;
use ordered_float::OrderedFloat;

use crate::{NodeId, RbTree, Result};

/// A tree of floating point keys.
///
/// Keys are wrapped in [`OrderedFloat`] for a total order: `-0.0` and `0.0`
/// are the same key and NaN sorts above every other value, including
/// positive infinity.
pub type FloatTree<T> = RbTree<OrderedFloat<T>>;

impl<T: FloatCore> RbTree<OrderedFloat<T>> {
    /// Inserts a raw float value
    pub fn insert_value(&mut self, value: T) -> Result<NodeId> {
        self.insert(OrderedFloat(value))
    }

    /// Removes a raw float value, returning it if it was present
    pub fn remove_value(&mut self, value: T) -> Option<T> {
        self.remove(&OrderedFloat(value)).map(OrderedFloat::into_inner)
    }

    /// Returns `true` if `value` is present
    pub fn contains_value(&self, value: T) -> bool {
        self.contains(&OrderedFloat(value))
    }

    /// Returns the smallest value
    pub fn min_value(&self) -> Option<T> {
        self.first().map(|value| value.into_inner())
    }

    /// Returns the largest value
    pub fn max_value(&self) -> Option<T> {
        self.last().map(|value| value.into_inner())
    }

    /// Copies the values, ascending, into the front of `dst`.
    ///
    /// Same contract as [`export_sorted`](RbTree::export_sorted): a
    /// destination shorter than `len()` is rejected and left untouched.
    pub fn export_values(&self, dst: &mut [T]) -> Result<usize> {
        self.check_export(dst.len())?;

        for (slot, value) in dst.iter_mut().zip(self.iter()) {
            *slot = value.into_inner();
        }
        Ok(self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_float_basic() {
        let mut tree = FloatTree::new();
        for value in [5.0, 3.0, 7.0, 1.0, 9.0] {
            tree.insert_value(value).unwrap();
        }

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.min_value(), Some(1.0));
        assert_eq!(tree.max_value(), Some(9.0));

        assert_eq!(tree.remove_value(3.0), Some(3.0));
        assert_eq!(tree.remove_value(3.0), None);
        assert!(!tree.contains_value(3.0));
        assert!(tree.contains_value(7.0));
    }

    #[test]
    fn test_float_precision() {
        let mut tree = FloatTree::new();
        let val1 = 0.1 + 0.2;
        let val2 = 0.3;

        tree.insert_value(val1).unwrap();
        tree.insert_value(val2).unwrap();
        assert_eq!(tree.len(), 2);

        assert_eq!(tree.remove_value(val1), Some(val1));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_float_infinity_and_nan() {
        let mut tree = FloatTree::new();
        tree.insert_value(1.0).unwrap();
        tree.insert_value(f64::NAN).unwrap();
        tree.insert_value(f64::INFINITY).unwrap();
        tree.insert_value(f64::NEG_INFINITY).unwrap();
        tree.insert_value(2.0).unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.min_value(), Some(f64::NEG_INFINITY));
        assert!(tree.max_value().is_some_and(f64::is_nan));
        assert!(tree.verify().is_ok());

        // every NaN is the same key
        tree.insert_value(f64::NAN).unwrap();
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_float_signed_zero() {
        let mut tree = FloatTree::new();
        tree.insert_value(0.0).unwrap();
        tree.insert_value(-0.0).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_float_extreme_values() {
        let mut tree = FloatTree::<f32>::new();
        tree.insert_value(f32::MIN).unwrap();
        tree.insert_value(f32::MAX).unwrap();
        tree.insert_value(0.0).unwrap();

        assert_eq!(tree.min_value(), Some(f32::MIN));
        assert_eq!(tree.max_value(), Some(f32::MAX));
    }

    #[test]
    fn test_export_values() {
        let mut tree = FloatTree::new();
        for value in [2.5, -1.0, 10.0] {
            tree.insert_value(value).unwrap();
        }

        let mut dst = [0.0; 3];
        assert_eq!(tree.export_values(&mut dst), Ok(3));
        assert_eq!(dst, [-1.0, 2.5, 10.0]);

        let mut short = [0.0; 2];
        assert_eq!(
            tree.export_values(&mut short),
            Err(Error::BufferTooSmall {
                needed: 3,
                capacity: 2
            })
        );
        assert_eq!(short, [0.0; 2]);
    }

    #[test]
    fn test_export_values_rejects_like_export_sorted() {
        crate::testing::init_logging();
        let mut tree = FloatTree::new();
        for value in [1.0, 2.0, 3.0, 4.0] {
            tree.insert_value(value).unwrap();
        }

        let mut values = [0.0; 3];
        let mut keys = [OrderedFloat(0.0); 3];
        let rejected = tree.export_values(&mut values);
        assert_eq!(rejected, tree.export_sorted(&mut keys));
        assert_eq!(
            rejected,
            Err(Error::BufferTooSmall {
                needed: 4,
                capacity: 3
            })
        );
    }
}

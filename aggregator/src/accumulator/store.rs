use std::sync::Arc;

use ndarray::{ArrayD, IxDyn, Zip};
use parking_lot::{RwLock, RwLockReadGuard};

use super::SliceAddr;
use crate::error::{AddressingErr, AggregateErr, Result};

/// The shared numeric array updates are merged into.
///
/// Cloning yields another handle to the same array, the aggregator keeps one and the
/// caller keeps another to read the contents once a round completes.
#[derive(Debug, Clone)]
pub struct Accumulator {
    inner: Arc<RwLock<ArrayD<f32>>>,
}

impl Accumulator {
    /// Creates a new `Accumulator`.
    ///
    /// # Arguments
    /// * `arr` - The initial contents.
    pub fn new(arr: ArrayD<f32>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(arr)),
        }
    }

    /// Creates a new `Accumulator` of the given shape filled with zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::new(ArrayD::zeros(IxDyn(shape)))
    }

    pub fn shape(&self) -> Vec<usize> {
        self.inner.read().shape().to_vec()
    }

    /// Returns the amount of elements in the accumulator.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the amount of slices that can be addressed along `dimensions`.
    ///
    /// # Returns
    /// An `AddressingErr` if `dimensions` aren't distinct axes of the accumulator.
    pub fn size_along(&self, dimensions: &[i32]) -> std::result::Result<usize, AddressingErr> {
        let arr = self.inner.read();
        let axes = SliceAddr::axes(arr.ndim(), dimensions)?;
        Ok(SliceAddr::size_along(arr.shape(), &axes))
    }

    /// Adds `arr` element-wise to the entire accumulator.
    ///
    /// # Returns
    /// A `ShapeMismatch` error if `arr` doesn't have exactly the accumulator's shape.
    pub fn add(&self, arr: &ArrayD<f32>) -> Result<()> {
        let mut acc = self.inner.write();

        if acc.shape() != arr.shape() {
            return Err(AggregateErr::ShapeMismatch {
                expected: acc.shape().to_vec(),
                got: arr.shape().to_vec(),
            });
        }

        Zip::from(&mut *acc)
            .and(arr)
            .par_for_each(|acc, &value| *acc += value);

        Ok(())
    }

    /// Adds `arr` element-wise to the `index`-th slice along `dimensions`.
    ///
    /// # Returns
    /// An `Addressing` error if the slice can't be resolved, or a `ShapeMismatch`
    /// error if `arr` doesn't have the slice's shape. The accumulator is untouched on error.
    pub fn add_along(&self, dimensions: &[i32], index: i64, arr: &ArrayD<f32>) -> Result<()> {
        let mut acc = self.inner.write();
        let shape = acc.shape().to_vec();
        let addr = SliceAddr::resolve(&shape, dimensions, index)?;

        let Some(payload) = addr.fit(arr.view(), &shape) else {
            return Err(AggregateErr::ShapeMismatch {
                expected: addr.slice_shape(&shape),
                got: arr.shape().to_vec(),
            });
        };

        let target = acc.slice_each_axis_mut(|desc| addr.slice_of(desc.axis.index()));
        Zip::from(target)
            .and(&payload)
            .par_for_each(|acc, &value| *acc += value);

        Ok(())
    }

    /// Copies the current contents out of the accumulator.
    pub fn snapshot(&self) -> ArrayD<f32> {
        self.inner.read().as_standard_layout().into_owned()
    }

    /// Locks the accumulator for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, ArrayD<f32>> {
        self.inner.read()
    }

    /// Overwrites every element with `value`, for callers that re-seed between rounds.
    pub fn fill(&self, value: f32) {
        self.inner.write().fill(value);
    }
}

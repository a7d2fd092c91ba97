use ndarray::{ArrayViewD, Axis, Slice};

use crate::{error::AddressingErr, message::WHOLE};

/// A partial update target resolved against an accumulator shape.
///
/// Every addressed axis is pinned to one coordinate, the remaining axes are taken whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceAddr {
    fixed: Vec<Option<usize>>,
}

impl SliceAddr {
    /// Resolves the `index`-th slice along `dimensions` of an array of shape `shape`.
    ///
    /// `index` enumerates the coordinates of the addressed axes in row major order,
    /// following the order in which `dimensions` lists them.
    ///
    /// # Returns
    /// An `AddressingErr` if the dimensions are invalid or `index` is out of bounds.
    pub fn resolve(shape: &[usize], dimensions: &[i32], index: i64) -> Result<Self, AddressingErr> {
        let axes = Self::axes(shape.len(), dimensions)?;
        let len = Self::size_along(shape, &axes);

        let in_range = usize::try_from(index).is_ok_and(|i| i < len);
        if !in_range {
            return Err(AddressingErr::IndexOutOfRange { index, len });
        }

        let mut rem = index as usize;
        let mut fixed = vec![None; shape.len()];

        for &axis in axes.iter().rev() {
            let n = shape[axis];
            fixed[axis] = Some(rem % n);
            rem /= n;
        }

        Ok(Self { fixed })
    }

    /// Validates `dimensions` as a set of distinct axes of an `ndim` dimensional array.
    ///
    /// # Returns
    /// The axes in the given order or an `AddressingErr`.
    pub fn axes(ndim: usize, dimensions: &[i32]) -> Result<Vec<usize>, AddressingErr> {
        if dimensions.is_empty() {
            return Err(AddressingErr::EmptyDimensions);
        }

        let mut axes = Vec::with_capacity(dimensions.len());

        for &dim in dimensions {
            let axis = match dim {
                WHOLE => return Err(AddressingErr::MixedSentinel),
                dim if dim < 0 => return Err(AddressingErr::NegativeDimension(dim)),
                _ => dim as usize,
            };

            if axis >= ndim {
                return Err(AddressingErr::DimensionOutOfRange { dim, ndim });
            }

            if axes.contains(&axis) {
                return Err(AddressingErr::DuplicateDimension(dim));
            }

            axes.push(axis);
        }

        Ok(axes)
    }

    /// The amount of slices along `axes`.
    pub fn size_along(shape: &[usize], axes: &[usize]) -> usize {
        axes.iter().map(|&axis| shape[axis]).product()
    }

    /// The shape of the slice inside an array of shape `shape`, keeping the addressed axes with length 1.
    pub fn slice_shape(&self, shape: &[usize]) -> Vec<usize> {
        self.fixed
            .iter()
            .zip(shape)
            .map(|(fixed, &n)| if fixed.is_some() { 1 } else { n })
            .collect()
    }

    /// The shape of the slice with the addressed axes removed.
    pub fn squeezed_shape(&self, shape: &[usize]) -> Vec<usize> {
        self.fixed
            .iter()
            .zip(shape)
            .filter(|(fixed, _)| fixed.is_none())
            .map(|(_, &n)| n)
            .collect()
    }

    /// The range to take along `axis`.
    pub fn slice_of(&self, axis: usize) -> Slice {
        match self.fixed[axis] {
            Some(i) => Slice::from(i..i + 1),
            None => Slice::from(..),
        }
    }

    /// Matches a payload against this slice inside an array of shape `shape`.
    ///
    /// Payloads may either keep the addressed axes with length 1 or leave them out.
    ///
    /// # Returns
    /// A view of `arr` with the slice's shape or `None` if it doesn't fit.
    pub fn fit<'a>(&self, arr: ArrayViewD<'a, f32>, shape: &[usize]) -> Option<ArrayViewD<'a, f32>> {
        if arr.shape() == self.slice_shape(shape) {
            return Some(arr);
        }

        if arr.shape() != self.squeezed_shape(shape) {
            return None;
        }

        let fixed_axes = self
            .fixed
            .iter()
            .enumerate()
            .filter(|(_, fixed)| fixed.is_some())
            .map(|(axis, _)| Axis(axis));

        Some(fixed_axes.fold(arr, |arr, axis| arr.insert_axis(axis)))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::*;

    #[test]
    fn single_dimension_picks_a_row() {
        let addr = SliceAddr::resolve(&[3, 3], &[0], 1).unwrap();
        assert_eq!(addr.fixed, [Some(1), None]);
        assert_eq!(addr.slice_shape(&[3, 3]), [1, 3]);
        assert_eq!(addr.squeezed_shape(&[3, 3]), [3]);
    }

    #[test]
    fn index_enumerates_in_listed_order() {
        let addr = SliceAddr::resolve(&[2, 3, 4], &[2, 0], 5).unwrap();
        assert_eq!(addr.fixed, [Some(1), None, Some(2)]);

        let addr = SliceAddr::resolve(&[2, 3, 4], &[0, 2], 5).unwrap();
        assert_eq!(addr.fixed, [Some(1), None, Some(1)]);

        let addr = SliceAddr::resolve(&[2, 3, 4], &[0, 2], 7).unwrap();
        assert_eq!(addr.fixed, [Some(1), None, Some(3)]);
    }

    #[test]
    fn invalid_dimensions() {
        let shape = [3, 3];

        let cases = [
            (vec![], AddressingErr::EmptyDimensions),
            (vec![WHOLE, 0], AddressingErr::MixedSentinel),
            (vec![-2], AddressingErr::NegativeDimension(-2)),
            (vec![2], AddressingErr::DimensionOutOfRange { dim: 2, ndim: 2 }),
            (vec![1, 1], AddressingErr::DuplicateDimension(1)),
        ];

        for (dims, expected) in cases {
            assert_eq!(SliceAddr::resolve(&shape, &dims, 0), Err(expected));
        }
    }

    #[test]
    fn index_bounds() {
        assert_eq!(
            SliceAddr::resolve(&[3, 3], &[0], 3),
            Err(AddressingErr::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            SliceAddr::resolve(&[3, 3], &[0], -1),
            Err(AddressingErr::IndexOutOfRange { index: -1, len: 3 })
        );
        assert_eq!(
            SliceAddr::resolve(&[3, 0], &[1], 0),
            Err(AddressingErr::IndexOutOfRange { index: 0, len: 0 })
        );
        assert!(SliceAddr::resolve(&[3, 4], &[0, 1], 11).is_ok());
    }

    #[test]
    fn squeezed_payload_gets_unit_axes() {
        let addr = SliceAddr::resolve(&[2, 3, 4], &[1], 2).unwrap();
        let payload = ArrayD::<f32>::zeros(IxDyn(&[2, 4]));

        let view = addr.fit(payload.view(), &[2, 3, 4]).unwrap();
        assert_eq!(view.shape(), [2, 1, 4]);
    }

    #[test]
    fn wrong_payload_does_not_fit() {
        let addr = SliceAddr::resolve(&[3, 3], &[0], 0).unwrap();
        let payload = ArrayD::<f32>::zeros(IxDyn(&[3, 1]));
        assert!(addr.fit(payload.view(), &[3, 3]).is_none());
    }
}

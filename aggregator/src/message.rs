use comms::msg::UpdateHeader;
use ndarray::{ArrayD, IxDyn, ShapeError};

/// The dimensions sentinel for an update covering the whole accumulator.
pub const WHOLE: i32 = -1;

/// Where an update should be merged, as requested by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Whole,
    /// Not validated, the aggregator resolves it against the accumulator shape.
    Partial { dimensions: &'a [i32], index: i64 },
}

/// One worker's contribution to a round.
///
/// Immutable once built, it carries the addressing intent of the sender as is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMessage {
    arr: ArrayD<f32>,
    dimensions: Vec<i32>,
    index: i64,
}

impl UpdateMessage {
    /// Creates a new `UpdateMessage`.
    ///
    /// # Arguments
    /// * `arr` - The payload to add.
    /// * `dimensions` - The addressed dimensions, `[WHOLE]` for a whole update.
    /// * `index` - The slice index along `dimensions`, ignored for whole updates.
    pub fn new(arr: ArrayD<f32>, dimensions: Vec<i32>, index: i64) -> Self {
        Self {
            arr,
            dimensions,
            index,
        }
    }

    /// Creates an update covering the whole accumulator.
    pub fn whole(arr: ArrayD<f32>) -> Self {
        Self::new(arr, vec![WHOLE], 0)
    }

    /// Creates an update for the `index`-th slice along `dimensions`.
    pub fn partial(arr: ArrayD<f32>, dimensions: Vec<i32>, index: i64) -> Self {
        Self::new(arr, dimensions, index)
    }

    /// Rebuilds an update from its wire representation.
    ///
    /// # Arguments
    /// * `header` - The shape and addressing of the update.
    /// * `values` - The payload values in row major order.
    ///
    /// # Returns
    /// A `ShapeError` if `values` doesn't fill `header.shape`.
    pub fn from_wire(header: UpdateHeader, values: &[f32]) -> Result<Self, ShapeError> {
        let UpdateHeader {
            shape,
            dimensions,
            index,
        } = header;

        let arr = ArrayD::from_shape_vec(IxDyn(&shape), values.to_vec())?;
        Ok(Self::new(arr, dimensions, index))
    }

    pub fn arr(&self) -> &ArrayD<f32> {
        &self.arr
    }

    pub fn dimensions(&self) -> &[i32] {
        &self.dimensions
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    /// Whether this update covers the entire accumulator.
    pub fn is_whole(&self) -> bool {
        self.dimensions == [WHOLE]
    }

    pub fn target(&self) -> Target<'_> {
        if self.is_whole() {
            Target::Whole
        } else {
            Target::Partial {
                dimensions: &self.dimensions,
                index: self.index,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_alone_is_whole() {
        let msg = UpdateMessage::whole(ArrayD::zeros(IxDyn(&[2])));
        assert!(msg.is_whole());
        assert_eq!(msg.target(), Target::Whole);
    }

    #[test]
    fn mixed_sentinel_is_not_whole() {
        let msg = UpdateMessage::partial(ArrayD::zeros(IxDyn(&[2])), vec![WHOLE, 0], 0);
        assert!(!msg.is_whole());
        assert_eq!(
            msg.target(),
            Target::Partial {
                dimensions: &[WHOLE, 0],
                index: 0
            }
        );
    }

    #[test]
    fn from_wire_checks_value_count() {
        let header = UpdateHeader {
            shape: vec![1, 3],
            dimensions: vec![0],
            index: 1,
        };

        assert!(UpdateMessage::from_wire(header.clone(), &[1., 2.]).is_err());

        let msg = UpdateMessage::from_wire(header, &[1., 2., 3.]).unwrap();
        assert_eq!(msg.arr().shape(), [1, 3]);
        assert_eq!(msg.dimensions(), [0]);
        assert_eq!(msg.index(), 1);
    }
}

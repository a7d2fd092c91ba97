use std::borrow::Cow;

use ndarray::ArrayD;

/// The accumulator contents published at the end of a round.
#[derive(Debug, Clone, PartialEq)]
pub struct Replica {
    /// The amount of rounds completed when this replica was taken.
    pub round: u64,
    pub params: ArrayD<f32>,
}

impl Replica {
    /// Creates a new `Replica`.
    ///
    /// # Arguments
    /// * `round` - The amount of completed rounds.
    /// * `params` - The replicated contents.
    pub fn new(round: u64, params: ArrayD<f32>) -> Self {
        Self { round, params }
    }

    pub fn shape(&self) -> &[usize] {
        self.params.shape()
    }

    /// Returns the contents in row major order.
    pub fn values(&self) -> Cow<'_, [f32]> {
        match self.params.as_slice() {
            Some(values) => Cow::Borrowed(values),
            None => Cow::Owned(self.params.iter().copied().collect()),
        }
    }
}

use ndarray::ArrayD;

use super::Status;
use crate::{
    accumulator::Accumulator,
    error::Result,
    message::{Target, UpdateMessage},
};

/// The receipt of an accepted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    /// The amount of updates accepted in the round, this one included.
    pub accepted: usize,
    /// Whether this update closed the round.
    pub complete: bool,
}

/// Decides how updates are merged, when a round is ready to be replicated and how it's reported.
pub trait AggregationPolicy: Send + Sync {
    /// Merges a single update into `accumulator`.
    ///
    /// By default whole updates are added to the entire accumulator and partial
    /// updates to their addressed slice.
    ///
    /// # Returns
    /// A `ShapeMismatch` or `Addressing` error, in which case `accumulator` is left as is.
    fn merge(&self, accumulator: &Accumulator, msg: &UpdateMessage) -> Result<()> {
        match msg.target() {
            Target::Whole => accumulator.add(msg.arr()),
            Target::Partial { dimensions, index } => {
                accumulator.add_along(dimensions, index, msg.arr())
            }
        }
    }

    /// Merges `msg` into the shared accumulator and records it for the open round.
    ///
    /// # Returns
    /// The receipt of the update or the reason it was rejected.
    fn update(&self, msg: UpdateMessage) -> Result<Accepted>;

    /// Whether enough updates arrived to replicate the accumulator.
    fn should_replicate(&self) -> bool;

    /// Resets the round, should be called once the accumulator was consumed.
    fn complete_round(&self);

    /// Snapshots the accumulator and resets the round in one step.
    ///
    /// # Returns
    /// The accumulator contents if the round was ready, `None` otherwise.
    fn replicate(&self) -> Option<ArrayD<f32>>;

    /// Returns a consistent snapshot of the round.
    fn status(&self) -> Status;

    /// Renders `status` as json.
    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.status())
    }
}

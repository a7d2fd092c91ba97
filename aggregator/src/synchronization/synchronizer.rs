use std::{error::Error, fmt, sync::Arc};

use super::Replica;
use crate::{error::AggregateErr, message::UpdateMessage, policy::Status};

/// Why a training step didn't produce a replica.
#[derive(Debug)]
pub enum StepErr {
    /// The update was refused, the round goes on without it.
    Rejected(AggregateErr),
    /// Replicas are no longer being published.
    Closed,
}

impl fmt::Display for StepErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepErr::Rejected(e) => write!(f, "update rejected: {e}"),
            StepErr::Closed => f.write_str("replica channel closed"),
        }
    }
}

impl Error for StepErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StepErr::Rejected(e) => Some(e),
            StepErr::Closed => None,
        }
    }
}

impl From<AggregateErr> for StepErr {
    fn from(value: AggregateErr) -> Self {
        Self::Rejected(value)
    }
}

/// Executes a single aggregation step on behalf of one worker.
///
/// A `Synchronizer` merges the worker's update and produces the replica of the round it belongs to.
#[allow(unused)]
#[trait_variant::make(Synchronizer: Send)]
pub trait SynchronizerTemplate: Clone {
    /// Should merge `msg` and wait for the replica of its round.
    ///
    /// # Arguments
    /// * `msg` - The worker's update for the open round.
    ///
    /// # Returns
    /// The replica closing the round or a `StepErr`.
    async fn step(&self, msg: UpdateMessage) -> Result<Arc<Replica>, StepErr>;

    /// Returns the last published replica.
    fn current(&self) -> Arc<Replica>;

    /// Returns the amount of workers taking part in each round.
    fn workers(&self) -> usize;

    /// Returns the status of the open round.
    fn status(&self) -> Status;
}

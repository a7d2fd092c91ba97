use std::{num::NonZeroUsize, thread};

use log::{debug, info, warn};
use ndarray::ArrayD;
use parking_lot::Mutex;

use super::{Accepted, AggregationPolicy, Status};
use crate::{
    accumulator::Accumulator,
    error::{AggregateErr, Result},
    message::UpdateMessage,
    storage::{InMemoryUpdateLog, UpdateLog},
};

/// Aggregates a fixed amount of workers per round.
///
/// Every update is merged as soon as it arrives, the round is ready to be replicated
/// exactly when the log holds one update per worker. Further updates are refused
/// until the round is completed.
///
/// The log lock is held across validation, merge and append, so concurrent updates
/// are serialized and the accepted count always matches the accumulator contents.
#[derive(Debug)]
pub struct SynchronousAggregator<L: UpdateLog = InMemoryUpdateLog> {
    workers: NonZeroUsize,
    accumulator: Accumulator,
    log: Mutex<L>,
}

impl<L: UpdateLog> SynchronousAggregator<L> {
    /// Creates a new `SynchronousAggregator`.
    ///
    /// # Arguments
    /// * `workers` - The amount of updates that make up a round.
    /// * `log` - Where accepted updates are recorded.
    /// * `accumulator` - The shared array updates are merged into.
    pub fn new(workers: NonZeroUsize, log: L, accumulator: Accumulator) -> Self {
        Self {
            workers,
            accumulator,
            log: Mutex::new(log),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Returns the handle to the shared accumulator.
    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Runs `f` on the update log while holding the round lock.
    pub fn inspect_log<T>(&self, f: impl FnOnce(&L) -> T) -> T {
        f(&self.log.lock())
    }
}

impl SynchronousAggregator {
    /// Creates a new `SynchronousAggregator` with an in memory log, expecting one
    /// worker per available core.
    pub fn with_available_parallelism(accumulator: Accumulator) -> Self {
        let workers = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
        Self::new(workers, InMemoryUpdateLog::new(), accumulator)
    }
}

impl<L: UpdateLog> AggregationPolicy for SynchronousAggregator<L> {
    fn update(&self, msg: UpdateMessage) -> Result<Accepted> {
        let workers = self.workers.get();
        let mut log = self.log.lock();

        if log.count() >= workers {
            warn!(workers = workers; "update received for a full round");
            return Err(AggregateErr::RoundOverflow { workers });
        }

        if let Err(e) = self.merge(&self.accumulator, &msg) {
            warn!(accepted = log.count(), whole = msg.is_whole(); "rejected update: {e}");
            return Err(e);
        }

        log.append(msg);
        let accepted = log.count();
        debug!(accepted = accepted, workers = workers; "accepted update");

        Ok(Accepted {
            accepted,
            complete: accepted == workers,
        })
    }

    fn should_replicate(&self) -> bool {
        self.log.lock().count() == self.workers.get()
    }

    fn complete_round(&self) {
        let mut log = self.log.lock();
        let accepted = log.count();

        if accepted != self.workers.get() {
            warn!(accepted = accepted, workers = self.workers.get(); "completing an unfinished round");
        }

        log.clear();
    }

    fn replicate(&self) -> Option<ArrayD<f32>> {
        let mut log = self.log.lock();

        if log.count() != self.workers.get() {
            return None;
        }

        let params = self.accumulator.snapshot();
        log.clear();
        info!(workers = self.workers.get(); "round complete");
        Some(params)
    }

    fn status(&self) -> Status {
        let log = self.log.lock();

        Status {
            workers: self.workers.get(),
            accumulated_updates: log.count(),
        }
    }
}

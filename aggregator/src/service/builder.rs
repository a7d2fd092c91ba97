use std::{num::NonZeroUsize, thread};

use comms::specs::aggregator::AggregatorSpec;
use log::info;

use super::AggregationServer;
use crate::{
    accumulator::Accumulator,
    initialization::{self, Result},
    policy::SynchronousAggregator,
    storage::InMemoryUpdateLog,
    synchronization::BarrierSync,
};

/// The server type produced by an `AggregatorBuilder`.
pub type SyncServer = AggregationServer<BarrierSync<SynchronousAggregator>>;

/// Builds `AggregationServer`s given a specification.
#[derive(Debug, Default)]
pub struct AggregatorBuilder;

impl AggregatorBuilder {
    /// Creates a new `AggregatorBuilder`.
    ///
    /// # Returns
    /// A new `AggregatorBuilder` instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new server following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification of the aggregation job.
    ///
    /// # Returns
    /// A new server or an `InitErr` if the spec has invalid initialization values.
    pub fn build(&self, spec: AggregatorSpec) -> Result<SyncServer> {
        let workers = spec.workers.unwrap_or_else(Self::default_workers);
        let params = initialization::initial_params(&spec.shape, spec.init, spec.seed)?;

        let accumulator = Accumulator::new(params);
        let initial = accumulator.snapshot();
        let policy = SynchronousAggregator::new(workers, InMemoryUpdateLog::new(), accumulator);
        let synchronizer = BarrierSync::new(policy, initial);

        info!(
            workers = workers.get(),
            rounds = spec.rounds;
            "built aggregator for shape {:?}", spec.shape
        );

        Ok(AggregationServer::new(spec.rounds, synchronizer))
    }

    /// One worker per available core.
    fn default_workers() -> NonZeroUsize {
        thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
    }
}

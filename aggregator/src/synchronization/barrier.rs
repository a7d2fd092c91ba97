use std::sync::Arc;

use log::{debug, warn};
use ndarray::ArrayD;
use tokio::sync::watch;

use super::{Replica, StepErr, Synchronizer};
use crate::{
    message::UpdateMessage,
    policy::{AggregationPolicy, Status},
};

/// Holds every worker of a round until the last update is merged, then hands them all the same replica.
///
/// The worker whose update closes the round takes the replica and resets the round
/// before publishing it, so no update of the next round can be merged early.
pub struct BarrierSync<P: AggregationPolicy> {
    policy: Arc<P>,
    replicas: Arc<watch::Sender<Arc<Replica>>>,
}

impl<P: AggregationPolicy> Clone for BarrierSync<P> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            replicas: Arc::clone(&self.replicas),
        }
    }
}

impl<P: AggregationPolicy> BarrierSync<P> {
    /// Creates a new `BarrierSync` synchronizer.
    ///
    /// # Arguments
    /// * `policy` - The aggregation policy deciding when a round is complete.
    /// * `initial` - The contents handed to workers before the first round.
    pub fn new(policy: P, initial: ArrayD<f32>) -> Self {
        let (replicas, _) = watch::channel(Arc::new(Replica::new(0, initial)));

        Self {
            policy: Arc::new(policy),
            replicas: Arc::new(replicas),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Publishes `params` as the replica following the last published one.
    fn publish(&self, params: ArrayD<f32>) {
        self.replicas.send_modify(|replica| {
            let round = replica.round + 1;
            debug!(round = round; "publishing replica");
            *replica = Arc::new(Replica::new(round, params));
        });
    }
}

impl<P: AggregationPolicy> Synchronizer for BarrierSync<P> {
    async fn step(&self, msg: UpdateMessage) -> Result<Arc<Replica>, StepErr> {
        let round = self.replicas.borrow().round;
        let mut replicas = self.replicas.subscribe();

        let accepted = self.policy.update(msg)?;

        if accepted.complete {
            match self.policy.replicate() {
                Some(params) => self.publish(params),
                None => warn!(round = round; "round was reset before it could be replicated"),
            }
        }

        let replica = replicas
            .wait_for(|replica| replica.round > round)
            .await
            .map_err(|_| StepErr::Closed)?;

        Ok(Arc::clone(&replica))
    }

    fn current(&self) -> Arc<Replica> {
        Arc::clone(&self.replicas.borrow())
    }

    fn workers(&self) -> usize {
        self.policy.status().workers
    }

    fn status(&self) -> Status {
        self.policy.status()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ndarray::{ArrayD, IxDyn};

    use super::*;
    use crate::{
        accumulator::Accumulator, error::AggregateErr, policy::SynchronousAggregator,
        storage::InMemoryUpdateLog,
    };

    fn barrier(workers: usize, shape: &[usize]) -> BarrierSync<SynchronousAggregator> {
        let accumulator = Accumulator::zeros(shape);
        let initial = accumulator.snapshot();
        let workers = NonZeroUsize::new(workers).unwrap();
        let policy = SynchronousAggregator::new(workers, InMemoryUpdateLog::new(), accumulator);
        BarrierSync::new(policy, initial)
    }

    fn ones(shape: &[usize]) -> ArrayD<f32> {
        ArrayD::ones(IxDyn(shape))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn every_worker_gets_the_same_replica() {
        const WORKERS: usize = 4;

        let sync = barrier(WORKERS, &[3]);
        assert_eq!(sync.current().round, 0);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..WORKERS {
            let sync = sync.clone();
            tasks.spawn(async move { sync.step(UpdateMessage::whole(ones(&[3]))).await });
        }

        let replicas: Vec<_> = tasks
            .join_all()
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();

        for replica in &replicas {
            assert_eq!(replica.round, 1);
            assert_eq!(replica.params, ones(&[3]) * WORKERS as f32);
        }

        assert_eq!(sync.status().accumulated_updates, 0);
        assert_eq!(sync.current().round, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rounds_follow_each_other() {
        let sync = barrier(1, &[2]);

        for round in 1..=3 {
            let replica = sync.step(UpdateMessage::whole(ones(&[2]))).await.unwrap();
            assert_eq!(replica.round, round);
            assert_eq!(replica.params, ones(&[2]) * round as f32);
        }
    }

    #[tokio::test]
    async fn steps_on_a_current_thread_runtime() {
        let sync = barrier(1, &[2]);

        let replica = sync.step(UpdateMessage::whole(ones(&[2]))).await.unwrap();
        assert_eq!(replica.round, 1);
        assert_eq!(replica.params, ones(&[2]));

        let err = sync.step(UpdateMessage::whole(ones(&[3]))).await.unwrap_err();
        assert!(matches!(err, StepErr::Rejected(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn extra_callers_get_consecutive_rounds() {
        let sync = barrier(1, &[2]);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..2 {
            let sync = sync.clone();
            tasks.spawn(async move { sync.step(UpdateMessage::whole(ones(&[2]))).await });
        }

        // The second caller may land before the first round is replicated.
        let mut replicated = 0;
        for res in tasks.join_all().await {
            match res {
                Ok(replica) => {
                    assert!(replica.round >= 1);
                    replicated += 1;
                }
                Err(e) => assert!(matches!(
                    e,
                    StepErr::Rejected(AggregateErr::RoundOverflow { workers: 1 })
                )),
            }
        }

        let current = sync.current();
        assert!(replicated >= 1);
        assert_eq!(current.round, replicated);
        assert_eq!(current.params, ones(&[2]) * replicated as f32);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejected_update_returns_immediately() {
        let sync = barrier(2, &[2]);

        let err = sync.step(UpdateMessage::whole(ones(&[5]))).await.unwrap_err();
        assert!(matches!(
            err,
            StepErr::Rejected(AggregateErr::ShapeMismatch { .. })
        ));
        assert_eq!(sync.status().accumulated_updates, 0);
    }
}

mod aggregation;
mod status;
mod synchronous;

pub use aggregation::{Accepted, AggregationPolicy};
pub use status::Status;
pub use synchronous::SynchronousAggregator;

pub mod accumulator;
pub mod error;
pub mod initialization;
pub mod message;
pub mod policy;
pub mod service;
pub mod storage;
pub mod synchronization;

pub use accumulator::Accumulator;
pub use error::{AddressingErr, AggregateErr};
pub use message::UpdateMessage;
pub use policy::{Accepted, AggregationPolicy, Status, SynchronousAggregator};
pub use storage::{InMemoryUpdateLog, UpdateLog};

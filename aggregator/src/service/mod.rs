mod builder;
mod server;

pub use builder::{AggregatorBuilder, SyncServer};
pub use server::AggregationServer;

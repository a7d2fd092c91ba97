mod barrier;
mod replica;
mod synchronizer;

pub use barrier::BarrierSync;
pub use replica::Replica;
pub use synchronizer::{StepErr, Synchronizer};

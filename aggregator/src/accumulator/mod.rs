mod addressing;
mod store;

pub use addressing::SliceAddr;
pub use store::Accumulator;

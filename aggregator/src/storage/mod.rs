mod memory;
mod update_log;

pub use memory::InMemoryUpdateLog;
pub use update_log::UpdateLog;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A snapshot of an aggregator's round, taken at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub workers: usize,
    pub accumulated_updates: usize,
}

impl Status {
    /// Returns the monitoring fields keyed by their exported names.
    pub fn to_map(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("workers", self.workers),
            ("accumulatedUpdates", self.accumulated_updates),
        ])
    }
}

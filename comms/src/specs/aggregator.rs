use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// The specification for the initial contents of the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
}

impl Default for InitSpec {
    fn default() -> Self {
        Self::Const { value: 0. }
    }
}

/// The specification for an aggregation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorSpec {
    /// The amount of workers per round, defaults to the available parallelism.
    #[serde(default)]
    pub workers: Option<NonZeroUsize>,
    pub shape: Vec<usize>,
    #[serde(default)]
    pub init: InitSpec,
    pub rounds: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

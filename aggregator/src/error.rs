use std::{error::Error, fmt, io};

/// The aggregation module's result type.
pub type Result<T> = std::result::Result<T, AggregateErr>;

/// Reasons an update was refused by an aggregator.
///
/// None of them are retried internally, the update is neither merged nor logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateErr {
    /// The payload doesn't have the shape of its target region.
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    /// The `(dimensions, index)` pair doesn't resolve to a slice of the accumulator.
    Addressing(AddressingErr),
    /// The round already holds one update per worker.
    RoundOverflow { workers: usize },
}

/// Why a partial update couldn't be resolved to a slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingErr {
    EmptyDimensions,
    /// The whole update sentinel appears together with other dimensions.
    MixedSentinel,
    NegativeDimension(i32),
    DimensionOutOfRange { dim: i32, ndim: usize },
    DuplicateDimension(i32),
    IndexOutOfRange { index: i64, len: usize },
}

impl fmt::Display for AggregateErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateErr::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected:?}, got {got:?}")
            }
            AggregateErr::Addressing(e) => write!(f, "addressing error: {e}"),
            AggregateErr::RoundOverflow { workers } => {
                write!(f, "round overflow: already accepted {workers} updates")
            }
        }
    }
}

impl fmt::Display for AddressingErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingErr::EmptyDimensions => f.write_str("no dimensions given"),
            AddressingErr::MixedSentinel => {
                f.write_str("the whole update sentinel -1 can't be mixed with other dimensions")
            }
            AddressingErr::NegativeDimension(dim) => write!(f, "negative dimension {dim}"),
            AddressingErr::DimensionOutOfRange { dim, ndim } => {
                write!(f, "dimension {dim} out of range for {ndim} dimensions")
            }
            AddressingErr::DuplicateDimension(dim) => write!(f, "dimension {dim} given twice"),
            AddressingErr::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} slices")
            }
        }
    }
}

impl Error for AggregateErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AggregateErr::Addressing(e) => Some(e),
            _ => None,
        }
    }
}

impl Error for AddressingErr {}

impl From<AddressingErr> for AggregateErr {
    fn from(value: AddressingErr) -> Self {
        Self::Addressing(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<AggregateErr> for io::Error {
    fn from(value: AggregateErr) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, value)
    }
}

use std::{
    error::Error,
    fmt::{self, Display},
};

use comms::specs::aggregator::InitSpec;
use ndarray::{ArrayD, IxDyn};
use rand::{
    SeedableRng,
    distr::{Distribution, Uniform, uniform::Error as UniformError},
    rngs::StdRng,
};

/// The specific result type for building the initial accumulator contents.
pub type Result<T> = std::result::Result<T, InitErr>;

/// Error returned whenever the initialization spec can't produce any contents.
#[derive(Debug)]
pub struct InitErr(String);

impl From<UniformError> for InitErr {
    fn from(value: UniformError) -> Self {
        Self(value.to_string())
    }
}

impl Display for InitErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for InitErr {}

/// Generates the initial contents of an accumulator.
///
/// # Arguments
/// * `shape` - The shape of the accumulator.
/// * `init` - How to fill it.
/// * `seed` - An optional seed for random initializations.
///
/// # Returns
/// The initial array or an `InitErr` if `init` has invalid values.
pub fn initial_params(shape: &[usize], init: InitSpec, seed: Option<u64>) -> Result<ArrayD<f32>> {
    match init {
        InitSpec::Const { value } => Ok(ArrayD::from_elem(IxDyn(shape), value)),
        InitSpec::Uniform { low, high } => {
            let dist = Uniform::new(low, high)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            Ok(ArrayD::from_shape_simple_fn(IxDyn(shape), || {
                dist.sample(&mut rng)
            }))
        }
    }
}

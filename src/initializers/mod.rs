//! Initializers - transforms applied once to build the starting grid.

mod constant;
mod pattern;
mod random;

use std::fmt;

use rand::RngCore;

use crate::compute::Grid;

pub use constant::*;
pub use pattern::*;
pub use random::*;

/// Transform of the zero-filled grid into an initial state.
pub trait Initializer: fmt::Debug {
    fn initialize(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, InitializerError>;
}

impl<I: Initializer + ?Sized> Initializer for Box<I> {
    fn initialize(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, InitializerError> {
        (**self).initialize(grid, rng)
    }
}

/// Initializer errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InitializerError {
    #[error("Pattern is {expected}-dimensional but the grid has {actual} dimensions")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Invalid state distribution: {0}")]
    InvalidDistribution(String),
    #[error("Probability p_value = {0} is outside [0, 1]")]
    InvalidProbability(f64),
}

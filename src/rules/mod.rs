//! Rules - per-tick transforms of the automaton grid.
//!
//! Every rule implements [`Rule`]: it validates the grid it is given, then
//! returns the transformed grid. Rules hold configuration only and never keep
//! the grid between calls. Randomness comes from the generator passed in.

mod base;
mod change_state;
mod elementary;
mod forest;
mod life;
mod morphology;
mod multi;

use std::fmt;

use rand::RngCore;
use rand_distr::Bernoulli;

use crate::compute::Grid;

pub use base::*;
pub use change_state::*;
pub use elementary::*;
pub use forest::*;
pub use life::*;
pub use morphology::*;
pub use multi::*;

/// A transform applied to the whole grid once per tick.
pub trait Rule: fmt::Debug {
    /// Rank of grid this rule accepts, or `None` for any rank.
    fn required_rank(&self) -> Option<usize> {
        None
    }

    /// Check that `grid` is compatible with this rule, before any mutation.
    fn check(&self, grid: &Grid) -> Result<(), RuleError> {
        check_rank(self.required_rank(), grid)
    }

    /// Apply the rule for a single tick.
    fn apply(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError>;
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    fn required_rank(&self) -> Option<usize> {
        (**self).required_rank()
    }

    fn check(&self, grid: &Grid) -> Result<(), RuleError> {
        (**self).check(grid)
    }

    fn apply(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        (**self).apply(grid, rng)
    }
}

/// Fail with [`RuleError::DimensionMismatch`] if `grid` does not have rank `expected`.
pub fn check_rank(expected: Option<usize>, grid: &Grid) -> Result<(), RuleError> {
    match expected {
        Some(expected) if expected != grid.ndim() => Err(RuleError::DimensionMismatch {
            expected,
            actual: grid.ndim(),
        }),
        _ => Ok(()),
    }
}

/// Coin with success probability `p`, used for per-cell random draws.
pub(crate) fn coin(name: &'static str, p: f64) -> Result<Bernoulli, RuleError> {
    Bernoulli::new(p).map_err(|_| RuleError::InvalidProbability { name, value: p })
}

/// Rule application errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("States are expected to be {expected}-dimensional, but have {actual} dimensions")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Probability {name} = {value} is outside [0, 1]")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Unknown morphology operation '{0}'")]
    UnknownOperation(String),
}

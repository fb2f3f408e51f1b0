//! Base rules: rank validation and neighbour counting.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Rule, RuleError, check_rank};
use crate::compute::{self, Boundary, Counts, Grid, Mask, Structure};

/// Rule that only checks the grid rank and passes it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCheckRule {
    pub ndim: usize,
}

impl Default for RankCheckRule {
    fn default() -> Self {
        Self { ndim: 2 }
    }
}

impl Rule for RankCheckRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.ndim)
    }

    fn apply(&self, grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;
        Ok(grid)
    }
}

/// Rules that count neighbours through a structuring element.
///
/// The structure's rank is the rank the rule requires.
pub trait CountNeighbours {
    fn structure(&self) -> &Structure;

    fn boundary(&self) -> Boundary;

    /// Count the set cells of `mask` around every cell.
    fn count_neighbours(&self, mask: &Mask) -> Result<Counts, RuleError> {
        if mask.ndim() != self.structure().ndim() {
            return Err(RuleError::DimensionMismatch {
                expected: self.structure().ndim(),
                actual: mask.ndim(),
            });
        }
        Ok(compute::count_neighbours(
            mask,
            self.structure(),
            self.boundary(),
        ))
    }
}

pub(crate) fn moore_2d() -> Structure {
    Structure::moore(2)
}

/// Neighbour counter usable on its own; as a rule it leaves the grid unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountNeighboursRule {
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for CountNeighboursRule {
    fn default() -> Self {
        Self {
            structure: moore_2d(),
            boundary: Boundary::Empty,
        }
    }
}

impl CountNeighbours for CountNeighboursRule {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }
}

impl Rule for CountNeighboursRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        check_rank(self.required_rank(), &grid)?;
        Ok(grid)
    }
}

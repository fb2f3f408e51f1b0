//! Conway's Game of Life and related outer-totalistic rules.

use std::collections::BTreeSet;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{CountNeighbours, Rule, RuleError, base::moore_2d};
use crate::compute::{Boundary, Grid, Structure};

/// Life-like rule.
///
/// A cell that is not live becomes live when its live-neighbour count is in
/// `born_counts`; a live cell stays live only when its count is in
/// `survive_counts`. All counts are taken from the grid before the update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeRule {
    pub dead_state: u8,
    pub live_state: u8,
    pub born_counts: BTreeSet<u32>,
    pub survive_counts: BTreeSet<u32>,
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for LifeRule {
    fn default() -> Self {
        Self {
            dead_state: 0,
            live_state: 1,
            born_counts: BTreeSet::from([3]),
            survive_counts: BTreeSet::from([2, 3]),
            structure: moore_2d(),
            boundary: Boundary::Empty,
        }
    }
}

impl LifeRule {
    /// Rule from born and survive counts, e.g. `(&[3, 6], &[2, 3])` for HighLife.
    pub fn with_counts(born: &[u32], survive: &[u32]) -> Self {
        Self {
            born_counts: born.iter().copied().collect(),
            survive_counts: survive.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl CountNeighbours for LifeRule {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }
}

impl Rule for LifeRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, mut grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let live = grid.mask_of(self.live_state);
        let counts = self.count_neighbours(&live)?;

        for ((cell, &alive), count) in grid
            .as_mut_slice()
            .iter_mut()
            .zip(live.as_slice())
            .zip(counts.as_slice())
        {
            if alive {
                if !self.survive_counts.contains(count) {
                    *cell = self.dead_state;
                }
            } else if self.born_counts.contains(count) {
                *cell = self.live_state;
            }
        }

        Ok(grid)
    }
}

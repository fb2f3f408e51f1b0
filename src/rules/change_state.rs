//! Probabilistic recolouring of one state into another.

use rand::RngCore;
use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};

use super::{Rule, RuleError, coin};
use crate::compute::Grid;

/// Change cells holding `from_state` to `to_state`, each with probability
/// `p_change`.
///
/// Mimics random growth or death processes. With `p_change == 1.0` every
/// matching cell changes and no random draws are made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeStateRule {
    pub from_state: u8,
    pub to_state: u8,
    pub p_change: f64,
}

impl Default for ChangeStateRule {
    fn default() -> Self {
        Self {
            from_state: 0,
            to_state: 1,
            p_change: 1.0,
        }
    }
}

impl Rule for ChangeStateRule {
    fn apply(&self, mut grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let coin = coin("p_change", self.p_change)?;

        let cells = grid.as_mut_slice().iter_mut().filter(|c| **c == self.from_state);
        if self.p_change == 1.0 {
            cells.for_each(|cell| *cell = self.to_state);
        } else {
            for cell in cells {
                if coin.sample(rng) {
                    *cell = self.to_state;
                }
            }
        }

        Ok(grid)
    }
}

//! Elementary 1-D cellular automata with Wolfram rule numbering.
//!
//! The next value of a cell is looked up from its three-cell neighbourhood
//! `(left, centre, right)` read as the index `left * 4 + centre * 2 + right`.
//! Bit `i` of the rule number is the table entry for index `i`.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Rule, RuleError};
use crate::compute::{Boundary, Grid, sample};

/// Index permutation that swaps the left and right neighbours.
pub const REFLECT_PERMUTATION: [usize; 8] = [0, 4, 2, 6, 1, 5, 3, 7];

/// Elementary 1-D automaton rule.
///
/// Cells equal to `filled_state` are on; every other value is treated as off
/// and written back as `empty_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Elementary1DRule {
    /// Wolfram rule number.
    pub rule_number: u8,
    pub empty_state: u8,
    pub filled_state: u8,
    pub boundary: Boundary,
}

impl Default for Elementary1DRule {
    fn default() -> Self {
        Self {
            rule_number: 0,
            empty_state: 0,
            filled_state: 1,
            boundary: Boundary::Empty,
        }
    }
}

impl Elementary1DRule {
    pub fn new(rule_number: u8) -> Self {
        Self {
            rule_number,
            ..Default::default()
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Lookup table decoded from the rule number.
    pub fn bit_mask(&self) -> [bool; 8] {
        std::array::from_fn(|i| (self.rule_number >> i) & 1 == 1)
    }

    /// Replace the lookup table, re-encoding the rule number.
    pub fn set_bit_mask(&mut self, bits: [bool; 8]) {
        self.rule_number = bits
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &bit)| acc | (u8::from(bit) << i));
    }

    /// Mirror the rule left-to-right.
    pub fn reflect(&mut self) {
        let bits = self.bit_mask();
        self.set_bit_mask(std::array::from_fn(|i| bits[REFLECT_PERMUTATION[i]]));
    }

    /// Swap the roles of on and off cells throughout.
    pub fn complement(&mut self) {
        let bits = self.bit_mask();
        self.set_bit_mask(std::array::from_fn(|i| !bits[7 - i]));
    }
}

impl Rule for Elementary1DRule {
    fn required_rank(&self) -> Option<usize> {
        Some(1)
    }

    fn apply(&self, grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let table = self.bit_mask();
        let filled = grid.mask_of(self.filled_state);
        let next = filled.as_slice().iter().enumerate().map(|(i, &centre)| {
            let left = sample(&filled, &[i], &[-1], self.boundary);
            let right = sample(&filled, &[i], &[1], self.boundary);
            let index = usize::from(left) * 4 + usize::from(centre) * 2 + usize::from(right);
            if table[index] {
                self.filled_state
            } else {
                self.empty_state
            }
        });

        Ok(Grid::from_parts(grid.shape().to_vec(), next.collect()))
    }
}

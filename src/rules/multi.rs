//! Rule composition: sequential pipelines and state-masked pipelines.

use rand::RngCore;

use super::{Rule, RuleError};
use crate::compute::Grid;

/// Apply sub-rules in order, each receiving the previous rule's output.
///
/// Every sub-rule validates the grid before any of them runs.
#[derive(Debug, Default)]
pub struct MultiRule {
    pub rules: Vec<Box<dyn Rule>>,
}

impl MultiRule {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: impl Rule + 'static) {
        self.rules.push(Box::new(rule));
    }

    fn run(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.rules
            .iter()
            .try_fold(grid, |grid, rule| rule.apply(grid, rng))
    }
}

impl Rule for MultiRule {
    fn check(&self, grid: &Grid) -> Result<(), RuleError> {
        self.rules.iter().try_for_each(|rule| rule.check(grid))
    }

    fn apply(&self, grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;
        self.run(grid, rng)
    }
}

/// Run a pipeline on a copy and commit it only where cells held `mask_state`.
///
/// Lets a sub-pipeline govern one labelled region while the rest of the grid
/// keeps its values.
#[derive(Debug, Default)]
pub struct MaskStateMultiRule {
    pub mask_state: u8,
    pub pipeline: MultiRule,
}

impl MaskStateMultiRule {
    pub fn new(mask_state: u8, rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            mask_state,
            pipeline: MultiRule::new(rules),
        }
    }
}

impl Rule for MaskStateMultiRule {
    fn check(&self, grid: &Grid) -> Result<(), RuleError> {
        self.pipeline.check(grid)
    }

    fn apply(&self, mut grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let changed = self.pipeline.run(grid.clone(), rng)?;
        for (cell, &new) in grid.as_mut_slice().iter_mut().zip(changed.as_slice()) {
            if *cell == self.mask_state {
                *cell = new;
            }
        }

        Ok(grid)
    }
}

//! Binary morphology applied to one foreground state.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Rule, RuleError};
use crate::compute::{
    Boundary, Grid, Mask, Structure, binary_closing, binary_dilation, binary_erosion,
    binary_fill_holes, binary_opening, binary_propagation,
};

/// Morphological operation selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphologyOp {
    #[default]
    Dilation,
    Erosion,
    Opening,
    Closing,
    Propagation,
    FillHoles,
}

impl MorphologyOp {
    pub const ALL: [MorphologyOp; 6] = [
        MorphologyOp::Dilation,
        MorphologyOp::Erosion,
        MorphologyOp::Opening,
        MorphologyOp::Closing,
        MorphologyOp::Propagation,
        MorphologyOp::FillHoles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MorphologyOp::Dilation => "dilation",
            MorphologyOp::Erosion => "erosion",
            MorphologyOp::Opening => "opening",
            MorphologyOp::Closing => "closing",
            MorphologyOp::Propagation => "propagation",
            MorphologyOp::FillHoles => "fill_holes",
        }
    }

    /// Run the operation on `input`.
    ///
    /// Fill-holes always floods from outside the grid, so it ignores `boundary`.
    pub fn apply(self, input: &Mask, structure: &Structure, boundary: Boundary) -> Mask {
        match self {
            MorphologyOp::Dilation => binary_dilation(input, structure, boundary),
            MorphologyOp::Erosion => binary_erosion(input, structure, boundary),
            MorphologyOp::Opening => binary_opening(input, structure, boundary),
            MorphologyOp::Closing => binary_closing(input, structure, boundary),
            MorphologyOp::Propagation => binary_propagation(input, structure, boundary, None),
            MorphologyOp::FillHoles => binary_fill_holes(input, structure),
        }
    }
}

impl fmt::Display for MorphologyOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MorphologyOp {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MorphologyOp::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| RuleError::UnknownOperation(s.to_string()))
    }
}

/// Apply a morphology operation to the cells holding `foreground_state`.
///
/// Cells set by the operation become foreground; foreground cells cleared by
/// it become `background_state`. Other cells are left alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryMorphologyRule {
    pub background_state: u8,
    pub foreground_state: u8,
    pub operation: MorphologyOp,
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for BinaryMorphologyRule {
    fn default() -> Self {
        Self {
            background_state: 0,
            foreground_state: 1,
            operation: MorphologyOp::Dilation,
            structure: Structure::full(2),
            boundary: Boundary::Empty,
        }
    }
}

impl BinaryMorphologyRule {
    pub fn new(operation: MorphologyOp) -> Self {
        Self {
            operation,
            ..Default::default()
        }
    }
}

impl Rule for BinaryMorphologyRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, mut grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let foreground = grid.mask_of(self.foreground_state);
        let result = self
            .operation
            .apply(&foreground, &self.structure, self.boundary);

        for ((cell, &was), &now) in grid
            .as_mut_slice()
            .iter_mut()
            .zip(foreground.as_slice())
            .zip(result.as_slice())
        {
            if now {
                *cell = self.foreground_state;
            } else if was {
                *cell = self.background_state;
            }
        }

        Ok(grid)
    }
}

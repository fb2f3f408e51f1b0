//! Pattern overlay initializer.

use log::warn;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Initializer, InitializerError};
use crate::compute::{Grid, unravel};

/// Stamp a fixed pattern onto the grid.
///
/// The pattern's centre (`shape / 2` on each axis) lands on `position`. An axis
/// whose position is `None`, or missing, is centred on the grid. Pattern cells
/// falling outside the grid are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOverlay {
    pub pattern: Grid,
    #[serde(default)]
    pub position: Vec<Option<usize>>,
}

impl PatternOverlay {
    /// Pattern centred on the grid.
    pub fn centered(pattern: Grid) -> Self {
        Self {
            pattern,
            position: Vec::new(),
        }
    }

    pub fn at(pattern: Grid, position: &[usize]) -> Self {
        Self {
            pattern,
            position: position.iter().copied().map(Some).collect(),
        }
    }
}

impl Initializer for PatternOverlay {
    fn initialize(
        &self,
        mut grid: Grid,
        _rng: &mut dyn RngCore,
    ) -> Result<Grid, InitializerError> {
        if self.pattern.ndim() != grid.ndim() {
            return Err(InitializerError::DimensionMismatch {
                expected: self.pattern.ndim(),
                actual: grid.ndim(),
            });
        }

        let origin: Vec<isize> = grid
            .shape()
            .iter()
            .zip(self.pattern.shape())
            .enumerate()
            .map(|(axis, (&len, &plen))| {
                let centre = self.position.get(axis).copied().flatten().unwrap_or(len / 2);
                centre as isize - (plen / 2) as isize
            })
            .collect();

        let mut clipped = 0usize;
        for (flat, &value) in self.pattern.as_slice().iter().enumerate() {
            let target: Option<Vec<usize>> = unravel(self.pattern.shape(), flat)
                .into_iter()
                .zip(&origin)
                .zip(grid.shape())
                .map(|((p, &o), &len)| {
                    let i = o + p as isize;
                    (0..len as isize).contains(&i).then_some(i as usize)
                })
                .collect();
            match target.and_then(|index| grid.get_mut(&index)) {
                Some(cell) => *cell = value,
                None => clipped += 1,
            }
        }
        if clipped > 0 {
            warn!(
                "Pattern overlay clipped {} of {} cells at the grid edge",
                clipped,
                self.pattern.len()
            );
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(init: &PatternOverlay, grid: Grid) -> Result<Grid, InitializerError> {
        init.initialize(grid, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_single_cell_centred() {
        let init = PatternOverlay::centered(Grid::from_vec(vec![1], vec![1]).unwrap());
        let out = run(&init, Grid::zeros(&[8])).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_2d_at_position() {
        let pattern = Grid::from_vec(vec![2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
        let init = PatternOverlay::at(pattern, &[1, 2]);
        let out = run(&init, Grid::zeros(&[4, 5])).unwrap();
        // Pattern origin is (1 - 1, 2 - 1).
        assert_eq!(
            out.as_slice(),
            &[
                0, 1, 2, 3, 0, //
                0, 4, 5, 6, 0, //
                0, 0, 0, 0, 0, //
                0, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_mixed_position() {
        let pattern = Grid::from_vec(vec![1, 1], vec![7]).unwrap();
        let init = PatternOverlay {
            pattern,
            position: vec![Some(0), None],
        };
        let out = run(&init, Grid::zeros(&[3, 5])).unwrap();
        assert_eq!(out.get(&[0, 2]), Some(&7));
        assert_eq!(out.count_states()[7], 1);
    }

    #[test]
    fn test_clipped_at_edge() {
        let pattern = Grid::full(&[3, 3], 2);
        let init = PatternOverlay::at(pattern, &[0, 0]);
        let out = run(&init, Grid::zeros(&[4, 4])).unwrap();
        assert_eq!(out.count_states()[2], 4);
        assert_eq!(out.get(&[1, 1]), Some(&2));
        assert_eq!(out.get(&[2, 2]), Some(&0));
    }

    #[test]
    fn test_rank_mismatch() {
        let init = PatternOverlay::centered(Grid::full(&[2, 2], 1));
        assert_eq!(
            run(&init, Grid::zeros(&[8])),
            Err(InitializerError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}

//! Constant fill initializer.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Initializer, InitializerError};
use crate::compute::Grid;

/// Fill every cell with `initial_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constant {
    pub initial_value: u8,
}

impl Initializer for Constant {
    fn initialize(
        &self,
        mut grid: Grid,
        _rng: &mut dyn RngCore,
    ) -> Result<Grid, InitializerError> {
        grid.fill(self.initial_value);
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_constant_fill() {
        let init = Constant { initial_value: 9 };
        let out = init
            .initialize(Grid::zeros(&[3, 4]), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(out, Grid::full(&[3, 4], 9));
    }
}

//! Forest-fire rules: spreading fire, grove fires and mold.
//!
//! The default neighbourhood for fires is the 2-D von Neumann cross without
//! its centre, so fire only travels orthogonally.

use rand::RngCore;
use rand::distributions::Distribution;
use serde::{Deserialize, Serialize};

use super::{CountNeighbours, Rule, RuleError, coin};
use crate::compute::{Boundary, Grid, Mask, Structure, binary_dilation, label};

/// Default structure for fires and mold.
pub fn fire_structure() -> Structure {
    Structure::von_neumann(2)
}

/// Fire spreads from burning cells to neighbouring burnable cells.
///
/// Burning cells keep burning; see [`SlowBurnRule`] for fires that burn out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnRule {
    pub burnt_state: u8,
    pub burnable_state: u8,
    pub burning_state: u8,
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for BurnRule {
    fn default() -> Self {
        Self {
            burnt_state: 0,
            burnable_state: 1,
            burning_state: 2,
            structure: fire_structure(),
            boundary: Boundary::Empty,
        }
    }
}

impl BurnRule {
    /// Mark every burnable neighbour of a burning cell as burning.
    ///
    /// Returns the mask of cells that were burning before the spread.
    fn spread(&self, grid: &mut Grid) -> Mask {
        let burning = grid.mask_of(self.burning_state);
        let reached = binary_dilation(&burning, &self.structure, self.boundary);

        for (cell, &hit) in grid.as_mut_slice().iter_mut().zip(reached.as_slice()) {
            if hit && *cell == self.burnable_state {
                *cell = self.burning_state;
            }
        }

        burning
    }
}

impl Rule for BurnRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, mut grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;
        self.spread(&mut grid);
        Ok(grid)
    }
}

/// Fire that lasts one tick per cell.
///
/// Burnable neighbours of burning cells ignite while the cells that were
/// burning become burnt, so the fire front advances one ring per tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlowBurnRule(pub BurnRule);

impl From<BurnRule> for SlowBurnRule {
    fn from(rule: BurnRule) -> Self {
        Self(rule)
    }
}

impl Rule for SlowBurnRule {
    fn required_rank(&self) -> Option<usize> {
        self.0.required_rank()
    }

    fn apply(&self, mut grid: Grid, _rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;

        let burning = self.0.spread(&mut grid);
        for (cell, &was_burning) in grid.as_mut_slice().iter_mut().zip(burning.as_slice()) {
            if was_burning {
                *cell = self.0.burnt_state;
            }
        }

        Ok(grid)
    }
}

/// Lightning sets whole groves alight at once.
///
/// Every cell is struck independently with probability `p_fire`. A strike on a
/// burnable cell ignites its entire connected component of burnable cells,
/// where connectivity follows `structure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnGrovesRule {
    pub burnable_state: u8,
    pub burning_state: u8,
    pub p_fire: f64,
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for BurnGrovesRule {
    fn default() -> Self {
        Self {
            burnable_state: 1,
            burning_state: 2,
            p_fire: 5e-6,
            structure: fire_structure(),
            boundary: Boundary::Empty,
        }
    }
}

impl Rule for BurnGrovesRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, mut grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;
        let strike = coin("p_fire", self.p_fire)?;

        let burnable = grid.mask_of(self.burnable_state);
        let (groves, count) = label(&burnable, &self.structure, self.boundary);

        let mut alight = vec![false; count as usize + 1];
        for &grove in groves.as_slice() {
            if strike.sample(rng) && grove != 0 {
                alight[grove as usize] = true;
            }
        }
        if !alight.contains(&true) {
            return Ok(grid);
        }

        for (cell, &grove) in grid.as_mut_slice().iter_mut().zip(groves.as_slice()) {
            if alight[grove as usize] {
                *cell = self.burning_state;
            }
        }
        Ok(grid)
    }
}

/// Overcrowded live cells die of mold with probability `p_mold`.
///
/// A live cell is susceptible when at least `critical_density` of its
/// neighbours are live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoldRule {
    pub dead_state: u8,
    pub live_state: u8,
    pub critical_density: u32,
    pub p_mold: f64,
    pub structure: Structure,
    pub boundary: Boundary,
}

impl Default for MoldRule {
    fn default() -> Self {
        Self {
            dead_state: 0,
            live_state: 1,
            critical_density: 3,
            p_mold: 3e-3,
            structure: fire_structure(),
            boundary: Boundary::Empty,
        }
    }
}

impl CountNeighbours for MoldRule {
    fn structure(&self) -> &Structure {
        &self.structure
    }

    fn boundary(&self) -> Boundary {
        self.boundary
    }
}

impl Rule for MoldRule {
    fn required_rank(&self) -> Option<usize> {
        Some(self.structure.ndim())
    }

    fn apply(&self, mut grid: Grid, rng: &mut dyn RngCore) -> Result<Grid, RuleError> {
        self.check(&grid)?;
        let decay = coin("p_mold", self.p_mold)?;

        let live = grid.mask_of(self.live_state);
        let counts = self.count_neighbours(&live)?;

        for ((cell, &alive), &count) in grid
            .as_mut_slice()
            .iter_mut()
            .zip(live.as_slice())
            .zip(counts.as_slice())
        {
            if alive && count >= self.critical_density && decay.sample(rng) {
                *cell = self.dead_state;
            }
        }

        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EMPTY: u8 = 0;
    const TREE: u8 = 1;
    const FIRE: u8 = 2;

    fn forest(rows: &[&str]) -> Grid {
        let shape = vec![rows.len(), rows[0].len()];
        let data = rows
            .iter()
            .flat_map(|r| {
                r.chars().map(|c| match c {
                    'T' => TREE,
                    'F' => FIRE,
                    _ => EMPTY,
                })
            })
            .collect();
        Grid::from_vec(shape, data).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_burn_spreads_and_persists() {
        let grid = forest(&["TTT", "TFT", "TTT"]);
        let out = BurnRule::default().apply(grid, &mut rng()).unwrap();
        assert_eq!(out, forest(&["TFT", "FFF", "TFT"]));
    }

    #[test]
    fn test_slow_burn_grows_one_ring_per_tick() {
        let rule = SlowBurnRule::default();
        let mut grid = forest(&["TTTTT", "TTTTT", "TTFTT", "TTTTT", "TTTTT"]);

        grid = rule.apply(grid, &mut rng()).unwrap();
        assert_eq!(grid, forest(&["TTTTT", "TTFTT", "TF.FT", "TTFTT", "TTTTT"]));

        grid = rule.apply(grid, &mut rng()).unwrap();
        assert_eq!(grid, forest(&["TTFTT", "TF.FT", "F...F", "TF.FT", "TTFTT"]));
    }

    #[test]
    fn test_slow_burn_does_not_cross_gaps() {
        let rule = SlowBurnRule::default();
        let grid = forest(&["F.T"]);
        let out = rule.apply(grid, &mut rng()).unwrap();
        assert_eq!(out, forest(&["..T"]));
    }

    #[test]
    fn test_burn_groves_certain_strike() {
        let rule = BurnGrovesRule {
            p_fire: 1.0,
            ..Default::default()
        };
        let grid = forest(&["TT..T", "....T", "T...."]);
        let out = rule.apply(grid, &mut rng()).unwrap();
        assert_eq!(out, forest(&["FF..F", "....F", "F...."]));
    }

    #[test]
    fn test_burn_groves_never_strikes() {
        let rule = BurnGrovesRule {
            p_fire: 0.0,
            ..Default::default()
        };
        let grid = forest(&["TT..T", "....T", "T...."]);
        assert_eq!(rule.apply(grid.clone(), &mut rng()).unwrap(), grid);
    }

    #[test]
    fn test_burn_groves_ignites_whole_components() {
        let rule = BurnGrovesRule {
            p_fire: 0.2,
            ..Default::default()
        };
        let grid = forest(&[
            "TTTT.TTTT",
            "TTTT.TTTT",
            ".........",
            "TTTT.TTTT",
            "TTTT.TTTT",
        ]);
        let (groves, _) = label(&grid.mask_of(TREE), &fire_structure(), Boundary::Empty);

        for seed in 0..20 {
            let out = rule
                .apply(grid.clone(), &mut StdRng::seed_from_u64(seed))
                .unwrap();
            // Each grove is either entirely on fire or entirely untouched.
            for id in 1..=4 {
                let states: Vec<u8> = groves
                    .as_slice()
                    .iter()
                    .zip(out.as_slice())
                    .filter(|&(&g, _)| g == id)
                    .map(|(_, &s)| s)
                    .collect();
                assert!(
                    states.iter().all(|&s| s == FIRE) || states.iter().all(|&s| s == TREE),
                    "grove {} partially burnt: {:?}",
                    id,
                    states
                );
            }
        }
    }

    #[test]
    fn test_mold_kills_crowded_cells() {
        let rule = MoldRule {
            p_mold: 1.0,
            ..Default::default()
        };
        let grid = forest(&["TTT", "TTT", "TTT"]);
        let out = rule.apply(grid, &mut rng()).unwrap();
        // Edges and centre have at least 3 live orthogonal neighbours, corners 2.
        assert_eq!(out, forest(&["T.T", "...", "T.T"]));
    }

    #[test]
    fn test_mold_zero_probability() {
        let rule = MoldRule {
            p_mold: 0.0,
            ..Default::default()
        };
        let grid = forest(&["TTT", "TTT", "TTT"]);
        assert_eq!(rule.apply(grid.clone(), &mut rng()).unwrap(), grid);
    }

    #[test]
    fn test_fire_rules_reject_1d() {
        let line = Grid::zeros(&[5]);
        assert!(BurnRule::default().apply(line.clone(), &mut rng()).is_err());
        assert!(SlowBurnRule::default().apply(line.clone(), &mut rng()).is_err());
        assert!(BurnGrovesRule::default().apply(line.clone(), &mut rng()).is_err());
        assert!(MoldRule::default().apply(line, &mut rng()).is_err());
    }
}

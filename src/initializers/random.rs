//! Random initializers: Bernoulli overlay and weighted state choice.

use rand::RngCore;
use rand::distributions::Distribution;
use rand_distr::{Bernoulli, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::{Initializer, InitializerError};
use crate::compute::Grid;

/// Set each cell to `overlay_value` independently with probability `p_value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomOverlay {
    pub overlay_value: u8,
    pub p_value: f64,
}

impl Default for RandomOverlay {
    fn default() -> Self {
        Self {
            overlay_value: 0,
            p_value: 0.5,
        }
    }
}

impl Initializer for RandomOverlay {
    fn initialize(
        &self,
        mut grid: Grid,
        rng: &mut dyn RngCore,
    ) -> Result<Grid, InitializerError> {
        let coin = Bernoulli::new(self.p_value)
            .map_err(|_| InitializerError::InvalidProbability(self.p_value))?;
        for cell in grid.as_mut_slice() {
            if coin.sample(rng) {
                *cell = self.overlay_value;
            }
        }
        Ok(grid)
    }
}

/// Draw every cell from a discrete distribution over state values.
///
/// `distribution[s]` is the relative weight of state `s`; missing entries are
/// zero. Weights need not sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomChoice {
    pub distribution: Vec<f64>,
}

impl RandomChoice {
    /// Distribution over `states` with the given probabilities, or uniform
    /// when `probs` is `None`.
    pub fn from_states(states: &[u8], probs: Option<&[f64]>) -> Result<Self, InitializerError> {
        if states.is_empty() {
            return Err(InitializerError::InvalidDistribution(
                "no states given".to_string(),
            ));
        }
        let uniform;
        let probs = match probs {
            Some(probs) if probs.len() != states.len() => {
                return Err(InitializerError::InvalidDistribution(format!(
                    "{} states but {} probabilities",
                    states.len(),
                    probs.len()
                )));
            }
            Some(probs) => probs,
            None => {
                uniform = vec![1.0 / states.len() as f64; states.len()];
                &uniform
            }
        };

        let len = states.iter().map(|&s| s as usize + 1).max().unwrap_or(0);
        let mut distribution = vec![0.0; len];
        for (&state, &p) in states.iter().zip(probs) {
            distribution[state as usize] = p;
        }
        Ok(Self { distribution })
    }

    /// Check the weights without drawing anything.
    pub fn validate(&self) -> Result<(), InitializerError> {
        self.weighted_index().map(|_| ())
    }

    fn weighted_index(&self) -> Result<WeightedIndex<f64>, InitializerError> {
        if self.distribution.len() > 256 {
            return Err(InitializerError::InvalidDistribution(format!(
                "{} weights given for 256 states",
                self.distribution.len()
            )));
        }
        WeightedIndex::new(&self.distribution)
            .map_err(|e| InitializerError::InvalidDistribution(e.to_string()))
    }
}

impl Initializer for RandomChoice {
    fn initialize(
        &self,
        mut grid: Grid,
        rng: &mut dyn RngCore,
    ) -> Result<Grid, InitializerError> {
        let index = self.weighted_index()?;
        for cell in grid.as_mut_slice() {
            *cell = index.sample(rng) as u8;
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_overlay_extremes() {
        let all = RandomOverlay {
            overlay_value: 4,
            p_value: 1.0,
        };
        let out = all.initialize(Grid::zeros(&[5, 5]), &mut rng()).unwrap();
        assert_eq!(out, Grid::full(&[5, 5], 4));

        let none = RandomOverlay {
            overlay_value: 4,
            p_value: 0.0,
        };
        let out = none.initialize(Grid::zeros(&[5, 5]), &mut rng()).unwrap();
        assert_eq!(out, Grid::zeros(&[5, 5]));
    }

    #[test]
    fn test_overlay_density() {
        let init = RandomOverlay {
            overlay_value: 1,
            p_value: 0.25,
        };
        let out = init.initialize(Grid::zeros(&[100, 100]), &mut rng()).unwrap();
        let set = out.count_states()[1];
        assert!(set > 2200 && set < 2800, "set = {}", set);
    }

    #[test]
    fn test_overlay_invalid_probability() {
        let init = RandomOverlay {
            overlay_value: 1,
            p_value: 1.5,
        };
        assert_eq!(
            init.initialize(Grid::zeros(&[2]), &mut rng()),
            Err(InitializerError::InvalidProbability(1.5))
        );
    }

    #[test]
    fn test_from_states_uniform() {
        let choice = RandomChoice::from_states(&[0, 2], None).unwrap();
        assert_eq!(choice.distribution, vec![0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_from_states_rejects_length_mismatch() {
        assert!(RandomChoice::from_states(&[0, 1], Some(&[1.0])).is_err());
        assert!(RandomChoice::from_states(&[], None).is_err());
    }

    #[test]
    fn test_choice_only_draws_weighted_states() {
        let choice = RandomChoice::from_states(&[3, 200], Some(&[0.9, 0.1])).unwrap();
        let out = choice
            .initialize(Grid::zeros(&[50, 50]), &mut rng())
            .unwrap();
        let counts = out.count_states();
        assert_eq!(counts[3] + counts[200], 2500);
        assert!(counts[3] > counts[200]);
    }

    #[test]
    fn test_choice_rejects_all_zero_weights() {
        let choice = RandomChoice {
            distribution: vec![0.0; 4],
        };
        assert!(matches!(
            choice.initialize(Grid::zeros(&[2]), &mut rng()),
            Err(InitializerError::InvalidDistribution(_))
        ));
    }
}

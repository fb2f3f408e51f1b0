//! Configuration types describing a complete automaton run.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::compute::{Automaton, AutomatonError, Grid, GridError, validate_shape};
use crate::initializers::{
    Constant, Initializer, InitializerError, PatternOverlay, RandomChoice, RandomOverlay,
};
use crate::rules::{
    BinaryMorphologyRule, BurnGrovesRule, BurnRule, ChangeStateRule, CountNeighboursRule,
    Elementary1DRule, LifeRule, MaskStateMultiRule, MoldRule, MultiRule, RankCheckRule, Rule,
    RuleError, SlowBurnRule,
};

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid extent along each axis.
    pub shape: Vec<usize>,
    /// Seed for the automaton's generator. Drawn from entropy when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Applied in order by `start()`.
    #[serde(default)]
    pub initializers: Vec<InitializerConfig>,
    /// Applied in order by every `step()`.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::forest_fire(&[256, 256])
    }
}

impl SimulationConfig {
    /// Trees grow on empty ground, lightning ignites trees, fire burns out.
    pub fn forest_fire(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            random_seed: None,
            initializers: Vec::new(),
            rules: vec![
                RuleConfig::ChangeState(ChangeStateRule {
                    from_state: 0,
                    to_state: 1,
                    p_change: 0.0025,
                }),
                RuleConfig::ChangeState(ChangeStateRule {
                    from_state: 1,
                    to_state: 2,
                    p_change: 1e-5,
                }),
                RuleConfig::SlowBurn(SlowBurnRule::default()),
            ],
        }
    }

    /// Single live cell in the middle of a strip, evolved by one elementary rule.
    pub fn elementary(rule_number: u8, width: usize) -> Self {
        Self {
            shape: vec![width],
            random_seed: None,
            initializers: vec![InitializerConfig::PatternOverlay(PatternOverlay::centered(
                Grid::full(&[1], 1),
            ))],
            rules: vec![RuleConfig::Elementary1D(Elementary1DRule::new(rule_number))],
        }
    }

    /// Conway's Life from a half-filled random soup.
    pub fn life(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            random_seed: None,
            initializers: vec![InitializerConfig::RandomOverlay(RandomOverlay {
                overlay_value: 1,
                p_value: 0.5,
            })],
            rules: vec![RuleConfig::Life(LifeRule::default())],
        }
    }

    /// Number of cells in the grid.
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_shape(&self.shape)?;

        for (index, initializer) in self.initializers.iter().enumerate() {
            initializer
                .validate(self.shape.len())
                .map_err(|source| ConfigError::Initializer { index, source })?;
        }

        // Rank checks only look at the number of axes.
        let probe = Grid::zeros(&vec![1; self.shape.len()]);
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()?;
            rule.build()
                .check(&probe)
                .map_err(|source| ConfigError::Rule { index, source })?;
        }
        Ok(())
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(
            "Loaded config from {}: shape {:?}, {} initializers, {} rules",
            path.display(),
            config.shape,
            config.initializers.len(),
            config.rules.len()
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate, then build an unstarted automaton.
    pub fn build_automaton(&self) -> Result<Automaton, ConfigError> {
        self.validate()?;

        let mut builder = Automaton::builder()
            .shape(self.shape.clone())
            .initializers(self.initializers.iter().map(InitializerConfig::build).collect())
            .rules(self.rules.iter().map(RuleConfig::build).collect());
        if let Some(seed) = self.random_seed {
            builder = builder.seed(seed);
        }
        Ok(builder.build()?)
    }
}

/// Serialisable rule description, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleConfig {
    RankCheck(RankCheckRule),
    CountNeighbours(CountNeighboursRule),
    ChangeState(ChangeStateRule),
    Life(LifeRule),
    #[serde(rename = "elementary_1d")]
    Elementary1D(Elementary1DRule),
    Burn(BurnRule),
    SlowBurn(SlowBurnRule),
    BurnGroves(BurnGrovesRule),
    Mold(MoldRule),
    BinaryMorphology(BinaryMorphologyRule),
    Multi {
        #[serde(default)]
        rules: Vec<RuleConfig>,
    },
    MaskStateMulti {
        mask_state: u8,
        #[serde(default)]
        rules: Vec<RuleConfig>,
    },
}

impl RuleConfig {
    pub fn build(&self) -> Box<dyn Rule> {
        match self {
            RuleConfig::RankCheck(rule) => Box::new(rule.clone()),
            RuleConfig::CountNeighbours(rule) => Box::new(rule.clone()),
            RuleConfig::ChangeState(rule) => Box::new(rule.clone()),
            RuleConfig::Life(rule) => Box::new(rule.clone()),
            RuleConfig::Elementary1D(rule) => Box::new(rule.clone()),
            RuleConfig::Burn(rule) => Box::new(rule.clone()),
            RuleConfig::SlowBurn(rule) => Box::new(rule.clone()),
            RuleConfig::BurnGroves(rule) => Box::new(rule.clone()),
            RuleConfig::Mold(rule) => Box::new(rule.clone()),
            RuleConfig::BinaryMorphology(rule) => Box::new(rule.clone()),
            RuleConfig::Multi { rules } => {
                Box::new(MultiRule::new(rules.iter().map(RuleConfig::build).collect()))
            }
            RuleConfig::MaskStateMulti { mask_state, rules } => Box::new(MaskStateMultiRule::new(
                *mask_state,
                rules.iter().map(RuleConfig::build).collect(),
            )),
        }
    }

    /// Check probability parameters, recursing into composite rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            RuleConfig::ChangeState(rule) => check_probability("p_change", rule.p_change),
            RuleConfig::BurnGroves(rule) => check_probability("p_fire", rule.p_fire),
            RuleConfig::Mold(rule) => check_probability("p_mold", rule.p_mold),
            RuleConfig::Multi { rules } | RuleConfig::MaskStateMulti { rules, .. } => {
                rules.iter().try_for_each(RuleConfig::validate)
            }
            _ => Ok(()),
        }
    }
}

/// Serialisable initializer description, tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitializerConfig {
    Constant(Constant),
    PatternOverlay(PatternOverlay),
    RandomOverlay(RandomOverlay),
    RandomChoice(RandomChoice),
}

impl InitializerConfig {
    pub fn build(&self) -> Box<dyn Initializer> {
        match self {
            InitializerConfig::Constant(init) => Box::new(*init),
            InitializerConfig::PatternOverlay(init) => Box::new(init.clone()),
            InitializerConfig::RandomOverlay(init) => Box::new(*init),
            InitializerConfig::RandomChoice(init) => Box::new(init.clone()),
        }
    }

    /// Check parameters against a grid with `ndim` axes.
    pub fn validate(&self, ndim: usize) -> Result<(), InitializerError> {
        match self {
            InitializerConfig::Constant(_) => Ok(()),
            InitializerConfig::PatternOverlay(init) if init.pattern.ndim() != ndim => {
                Err(InitializerError::DimensionMismatch {
                    expected: init.pattern.ndim(),
                    actual: ndim,
                })
            }
            InitializerConfig::PatternOverlay(_) => Ok(()),
            InitializerConfig::RandomOverlay(init) if !(0.0..=1.0).contains(&init.p_value) => {
                Err(InitializerError::InvalidProbability(init.p_value))
            }
            InitializerConfig::RandomOverlay(_) => Ok(()),
            InitializerConfig::RandomChoice(init) => init.validate(),
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { name, value });
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid grid shape: {0}")]
    InvalidShape(#[from] GridError),
    #[error("Probability {name} = {value} is outside [0, 1]")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Rule {index} does not fit the grid: {source}")]
    Rule {
        index: usize,
        #[source]
        source: RuleError,
    },
    #[error("Initializer {index} is invalid: {source}")]
    Initializer {
        index: usize,
        #[source]
        source: InitializerError,
    },
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
}

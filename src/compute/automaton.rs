//! Automaton - state machine driving initializers and rules over a grid.
//!
//! Lifecycle:
//!
//! ```text
//!   Unstarted --start()--> Running --step()--> Running
//!       ^                     |
//!       +------reset()--------+   (reset is allowed from any state)
//! ```
//!
//! Listeners registered with [`Automaton::subscribe`] run synchronously after
//! every committed tick change, before the triggering call returns.

use std::fmt;

use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{Grid, GridError, validate_shape};
use crate::initializers::{Initializer, InitializerError};
use crate::rules::{Rule, RuleError};

/// Callback fired after each tick change. Return `false` to unsubscribe.
pub type Listener = Box<dyn FnMut(&Automaton) -> bool>;

/// Lifecycle state derived from the tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not started yet, or reset.
    Unstarted,
    /// Started; the tick counter is valid.
    Running,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Unstarted => f.write_str("unstarted"),
            Lifecycle::Running => f.write_str("running"),
        }
    }
}

/// Automaton errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AutomatonError {
    #[error("Cannot {operation} an automaton that is {state}")]
    InvalidStateTransition {
        operation: &'static str,
        state: Lifecycle,
    },
    #[error("Cannot construct automaton: {0}")]
    Construction(String),
    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("Rule {index} failed: {source}")]
    Rule {
        index: usize,
        #[source]
        source: RuleError,
    },
    #[error("Initializer {index} failed: {source}")]
    Initializer {
        index: usize,
        #[source]
        source: InitializerError,
    },
    #[error("Stage {index} changed the grid shape from {expected:?} to {actual:?}")]
    ShapeChanged {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// Builder for [`Automaton`]. Exactly one of `shape` and `states` is required,
/// or both when they agree.
#[derive(Default)]
pub struct AutomatonBuilder {
    shape: Option<Vec<usize>>,
    states: Option<Grid>,
    initializers: Vec<Box<dyn Initializer>>,
    rules: Vec<Box<dyn Rule>>,
    seed: Option<u64>,
}

impl AutomatonBuilder {
    /// Start from a zero-filled grid of this shape.
    pub fn shape(mut self, shape: impl Into<Vec<usize>>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Start from an explicit initial grid.
    pub fn states(mut self, states: Grid) -> Self {
        self.states = Some(states);
        self
    }

    pub fn initializer(mut self, initializer: impl Initializer + 'static) -> Self {
        self.initializers.push(Box::new(initializer));
        self
    }

    pub fn initializers(mut self, initializers: Vec<Box<dyn Initializer>>) -> Self {
        self.initializers.extend(initializers);
        self
    }

    pub fn rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Seed the random generator; without a seed it is drawn from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Automaton, AutomatonError> {
        let grid = match (self.shape, self.states) {
            (None, None) => {
                return Err(AutomatonError::Construction(
                    "must specify either shape or initial states".to_string(),
                ));
            }
            (Some(shape), Some(states)) if shape != states.shape() => {
                return Err(AutomatonError::Construction(format!(
                    "shape {:?} conflicts with initial states of shape {:?}",
                    shape,
                    states.shape()
                )));
            }
            (_, Some(states)) => {
                validate_shape(states.shape())?;
                states
            }
            (Some(shape), None) => {
                validate_shape(&shape)?;
                Grid::zeros(&shape)
            }
        };

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Automaton {
            grid,
            tick: None,
            initializers: self.initializers,
            rules: self.rules,
            rng,
            listeners: Vec::new(),
        })
    }
}

/// A cellular automaton: a grid of byte states, a tick counter, and the
/// initializers and rules that evolve it.
pub struct Automaton {
    grid: Grid,
    tick: Option<u64>,
    initializers: Vec<Box<dyn Initializer>>,
    rules: Vec<Box<dyn Rule>>,
    rng: StdRng,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("shape", &self.grid.shape())
            .field("tick", &self.tick)
            .field("initializers", &self.initializers)
            .field("rules", &self.rules)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Automaton {
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    /// Automaton over a zero-filled grid with no initializers or rules.
    pub fn with_shape(shape: impl Into<Vec<usize>>) -> Result<Self, AutomatonError> {
        Self::builder().shape(shape).build()
    }

    /// Current grid.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.grid.shape()
    }

    /// Current tick, or `None` before `start()` and after `reset()`.
    #[inline]
    pub fn tick(&self) -> Option<u64> {
        self.tick
    }

    #[inline]
    pub fn is_started(&self) -> bool {
        self.tick.is_some()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.is_started() {
            Lifecycle::Running
        } else {
            Lifecycle::Unstarted
        }
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Rule list, editable between ticks.
    pub fn rules_mut(&mut self) -> &mut Vec<Box<dyn Rule>> {
        &mut self.rules
    }

    pub fn initializers(&self) -> &[Box<dyn Initializer>] {
        &self.initializers
    }

    pub fn initializers_mut(&mut self) -> &mut Vec<Box<dyn Initializer>> {
        &mut self.initializers
    }

    /// Register a listener fired after every tick change.
    pub fn subscribe(&mut self, listener: impl FnMut(&Automaton) -> bool + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Run the initializers in order and move to tick 0.
    pub fn start(&mut self) -> Result<(), AutomatonError> {
        if self.is_started() {
            return Err(AutomatonError::InvalidStateTransition {
                operation: "start",
                state: self.lifecycle(),
            });
        }

        let mut grid = self.grid.clone();
        for (index, initializer) in self.initializers.iter().enumerate() {
            grid = initializer
                .initialize(grid, &mut self.rng)
                .map_err(|source| AutomatonError::Initializer { index, source })?;
            check_shape(index, self.grid.shape(), &grid)?;
        }

        self.grid = grid;
        self.tick = Some(0);
        debug!(
            "Automaton started: shape {:?}, {} initializers, {} rules",
            self.grid.shape(),
            self.initializers.len(),
            self.rules.len()
        );
        self.notify();
        Ok(())
    }

    /// Advance one tick by threading a copy of the grid through every rule.
    ///
    /// The grid is replaced only once all rules have succeeded.
    pub fn step(&mut self) -> Result<(), AutomatonError> {
        let Some(tick) = self.tick else {
            return Err(AutomatonError::InvalidStateTransition {
                operation: "step",
                state: self.lifecycle(),
            });
        };

        let mut grid = self.grid.clone();
        for (index, rule) in self.rules.iter().enumerate() {
            trace!("Applying rule {} {:?}", index, rule);
            grid = rule
                .apply(grid, &mut self.rng)
                .map_err(|source| AutomatonError::Rule { index, source })?;
            check_shape(index, self.grid.shape(), &grid)?;
        }

        self.grid = grid;
        self.tick = Some(tick + 1);
        trace!("Automaton advanced to tick {}", tick + 1);
        self.notify();
        Ok(())
    }

    /// Advance `ticks` times, stopping at the first error.
    pub fn run(&mut self, ticks: u64) -> Result<(), AutomatonError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Zero the grid and return to the unstarted state.
    pub fn reset(&mut self) {
        self.grid = Grid::zeros(self.grid.shape());
        self.tick = None;
        debug!("Automaton reset");
        self.notify();
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        let this: &Automaton = self;
        listeners.retain_mut(|listener| listener(this));
        self.listeners = listeners;
    }
}

fn check_shape(index: usize, expected: &[usize], grid: &Grid) -> Result<(), AutomatonError> {
    if grid.shape() != expected {
        return Err(AutomatonError::ShapeChanged {
            index,
            expected: expected.to_vec(),
            actual: grid.shape().to_vec(),
        });
    }
    Ok(())
}

//! Cellular Automata - Discrete N-dimensional cellular automata.
//!
//! A grid of byte-valued cell states evolves over discrete ticks. Initializers
//! build the starting grid, then every tick threads a copy of the grid through
//! an ordered pipeline of rules and commits the result atomically.
//!
//! # Architecture
//!
//! - `compute`: Grid storage, boundary modes, neighbour counting, binary
//!   morphology and the [`Automaton`] state machine
//! - `rules`: Per-tick transforms (Life, elementary 1-D, forest fire, mold,
//!   morphology, composite pipelines)
//! - `initializers`: Transforms producing the initial grid
//! - `recording`: [`Recorder`] observing an automaton's history
//! - `schema`: Serialisable configuration of whole runs
//!
//! # Example
//!
//! ```rust
//! use cellular_automata::{
//!     compute::{Automaton, Grid},
//!     initializers::PatternOverlay,
//!     recording::Recorder,
//!     rules::Elementary1DRule,
//! };
//!
//! let mut automaton = Automaton::builder()
//!     .shape([64])
//!     .initializer(PatternOverlay::centered(Grid::full(&[1], 1)))
//!     .rule(Elementary1DRule::new(30))
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let recorder = Recorder::new(&mut automaton);
//!
//! automaton.start().unwrap();
//! automaton.run(31).unwrap();
//!
//! let history = recorder.as_stacked_array().unwrap();
//! assert_eq!(history.shape(), &[32, 64]);
//! ```

pub mod compute;
pub mod initializers;
pub mod recording;
pub mod rules;
pub mod schema;

// Re-export commonly used types
pub use compute::{Automaton, AutomatonError, Boundary, Grid, Structure};
pub use initializers::Initializer;
pub use recording::Recorder;
pub use rules::Rule;
pub use schema::SimulationConfig;

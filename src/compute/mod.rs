//! Compute module - Grid storage, neighbourhood operations and the automaton engine.

mod automaton;
mod grid;
mod morphology;
mod neighbours;

pub use automaton::*;
pub use grid::*;
pub use morphology::*;
pub use neighbours::*;

//! Schema module - Serialisable descriptions of automaton runs.

mod config;

pub use config::*;

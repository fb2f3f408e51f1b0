//! Recording of automaton history.
//!
//! A [`Recorder`] subscribes to an [`Automaton`](crate::compute::Automaton)
//! and appends one entry per tick change to an ordered log. Entries are grid
//! snapshots by default, or any value produced by a transform such as
//! [`count_states`]. A transform returning `None` suppresses that tick's entry,
//! which is how [`every_nth`] subsamples.

mod recorder;
mod transforms;

pub use recorder::{Recorder, RecorderError, Transform};
pub use transforms::{StateCounts, call_if, count_states, every_nth};

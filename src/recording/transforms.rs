//! Recorder transforms: state histograms and subsampling combinators.

use crate::compute::Automaton;

/// Number of cells in each of the 256 states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCounts(pub [u64; 256]);

impl StateCounts {
    #[inline]
    pub fn get(&self, state: u8) -> u64 {
        self.0[state as usize]
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// `(state, count)` pairs for the states that occur.
    pub fn present(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.0.iter().copied())
            .filter(|&(_, count)| count > 0)
    }
}

/// Histogram of the automaton's cell states.
pub fn count_states(automaton: &Automaton) -> Option<StateCounts> {
    Some(StateCounts(automaton.grid().count_states()))
}

/// Wrap a transform so it only runs when `test` holds.
pub fn call_if<T>(
    test: impl Fn(&Automaton) -> bool,
    transform: impl Fn(&Automaton) -> Option<T>,
) -> impl Fn(&Automaton) -> Option<T> {
    move |automaton| {
        if test(automaton) {
            transform(automaton)
        } else {
            None
        }
    }
}

/// Wrap a transform so it only runs on ticks divisible by `n`.
///
/// `n = 0` is treated as 1.
pub fn every_nth<T>(
    n: u64,
    transform: impl Fn(&Automaton) -> Option<T>,
) -> impl Fn(&Automaton) -> Option<T> {
    let n = n.max(1);
    call_if(
        move |automaton: &Automaton| automaton.tick().is_some_and(|tick| tick % n == 0),
        transform,
    )
}

//! Recorder bound to an automaton through its listener list.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;

use crate::compute::{Automaton, Grid, GridError};

/// Maps the automaton to a log entry; `None` skips the tick.
pub type Transform<T> = Rc<dyn Fn(&Automaton) -> Option<T>>;

/// Recorder errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecorderError {
    #[error("Cannot stack an empty record")]
    Empty,
    #[error("Record entry {index} has shape {actual:?}, expected {expected:?}")]
    IncompatibleShape {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

struct Log<T> {
    entries: Vec<T>,
    /// Incremented on every rebind; stale listeners compare against it and
    /// unsubscribe themselves.
    binding: u64,
}

/// Ordered log of one automaton's history.
///
/// The log holds one entry per observed tick since the last `start()`,
/// tick 0 included. A `reset()` of the observed automaton empties it.
///
/// ```
/// use cellular_automata::compute::Automaton;
/// use cellular_automata::recording::Recorder;
///
/// let mut automaton = Automaton::with_shape([4, 4]).unwrap();
/// let recorder = Recorder::new(&mut automaton);
/// automaton.start().unwrap();
/// automaton.run(3).unwrap();
/// assert_eq!(recorder.len(), 4);
/// ```
pub struct Recorder<T = Grid> {
    log: Rc<RefCell<Log<T>>>,
    transform: Transform<T>,
}

impl<T> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let log = self.log.borrow();
        f.debug_struct("Recorder")
            .field("entries", &log.entries.len())
            .field("binding", &log.binding)
            .finish()
    }
}

impl Recorder<Grid> {
    /// Record a copy of the grid on every tick.
    pub fn new(automaton: &mut Automaton) -> Self {
        Self::with_transform(automaton, |automaton: &Automaton| {
            Some(automaton.grid().clone())
        })
    }

    /// Stack the recorded grids along a new leading axis.
    pub fn as_stacked_array(&self) -> Result<Grid, RecorderError> {
        let log = self.log.borrow();
        let first = log.entries.first().ok_or(RecorderError::Empty)?;

        let mut data = Vec::with_capacity(first.len() * log.entries.len());
        for (index, entry) in log.entries.iter().enumerate() {
            if entry.shape() != first.shape() {
                return Err(RecorderError::IncompatibleShape {
                    index,
                    expected: first.shape().to_vec(),
                    actual: entry.shape().to_vec(),
                });
            }
            data.extend_from_slice(entry.as_slice());
        }

        let mut shape = Vec::with_capacity(first.ndim() + 1);
        shape.push(log.entries.len());
        shape.extend_from_slice(first.shape());
        Ok(Grid::from_vec(shape, data)?)
    }
}

impl<T: 'static> Recorder<T> {
    /// Record `transform(automaton)` on every tick, skipping `None`.
    pub fn with_transform(
        automaton: &mut Automaton,
        transform: impl Fn(&Automaton) -> Option<T> + 'static,
    ) -> Self {
        let recorder = Self {
            log: Rc::new(RefCell::new(Log {
                entries: Vec::new(),
                binding: 0,
            })),
            transform: Rc::new(transform),
        };
        recorder.observe(automaton);
        recorder
    }

    /// Bind to `automaton`, dropping the current log and any previous binding.
    ///
    /// An automaton that is already started is recorded immediately.
    pub fn observe(&self, automaton: &mut Automaton) {
        let binding = {
            let mut log = self.log.borrow_mut();
            log.binding += 1;
            log.entries.clear();
            if automaton.is_started()
                && let Some(entry) = (self.transform)(automaton)
            {
                log.entries.push(entry);
            }
            log.binding
        };
        debug!(
            "Recorder bound to automaton at tick {:?}",
            automaton.tick()
        );

        let log = Rc::downgrade(&self.log);
        let transform = Rc::clone(&self.transform);
        automaton.subscribe(move |automaton| record_tick(&log, binding, &*transform, automaton));
    }

    /// Stop recording. The log is kept.
    pub fn detach(&self) {
        self.log.borrow_mut().binding += 1;
    }
}

impl<T> Recorder<T> {
    /// Entries recorded so far, oldest first.
    pub fn record(&self) -> Ref<'_, [T]> {
        Ref::map(self.log.borrow(), |log| log.entries.as_slice())
    }

    /// Move the entries out, leaving the log empty.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut self.log.borrow_mut().entries)
    }

    pub fn len(&self) -> usize {
        self.log.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().entries.is_empty()
    }
}

fn record_tick<T>(
    log: &Weak<RefCell<Log<T>>>,
    binding: u64,
    transform: &dyn Fn(&Automaton) -> Option<T>,
    automaton: &Automaton,
) -> bool {
    let Some(shared) = log.upgrade() else {
        return false;
    };
    let mut log = shared.borrow_mut();
    if log.binding != binding {
        return false;
    }

    match automaton.tick() {
        None => log.entries.clear(),
        Some(_) => {
            if let Some(entry) = transform(automaton) {
                log.entries.push(entry);
            }
        }
    }
    true
}

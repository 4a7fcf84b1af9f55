//! Loading flag shared by concurrent collaborator calls.

use crate::application::change::Change;

/// Counts outstanding calls. The flag is raised by the first call of a wave
/// and lowered only when the last one finishes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadingTracker {
    in_flight: usize,
}

impl LoadingTracker {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Register `calls` new outstanding calls.
    pub fn begin(&mut self, calls: usize) -> Option<Change> {
        let was_loading = self.is_loading();
        self.in_flight += calls;
        (!was_loading && self.is_loading()).then_some(Change::Loading(true))
    }

    /// One call finished. Unbalanced calls are ignored.
    pub fn end(&mut self) -> Option<Change> {
        if self.in_flight == 0 {
            return None;
        }
        self.in_flight -= 1;
        (!self.is_loading()).then_some(Change::Loading(false))
    }
}

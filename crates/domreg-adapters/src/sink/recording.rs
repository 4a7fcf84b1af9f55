//! Change sink that keeps everything it is given.

use std::sync::{Arc, Mutex, MutexGuard};

use domreg_core::application::{Change, ChangeSink};

/// Records changes in publish order. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Vec<Change>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn changes(&self) -> Vec<Change> {
        self.lock().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<Change> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, change: &Change) -> bool {
        self.lock().contains(change)
    }

    // A panic while pushing cannot leave the Vec half-written.
    fn lock(&self) -> MutexGuard<'_, Vec<Change>> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl ChangeSink for RecordingSink {
    fn publish(&self, change: Change) {
        self.lock().push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let sink = RecordingSink::new();
        let other = sink.clone();
        other.publish(Change::Loading(true));

        assert_eq!(sink.len(), 1);
        assert!(sink.contains(&Change::Loading(true)));
        assert_eq!(sink.take(), vec![Change::Loading(true)]);
        assert!(other.is_empty());
    }
}

//! Change sink that forwards onto a tokio channel.

use tokio::sync::mpsc;
use tracing::trace;

use domreg_core::application::{Change, ChangeSink};

/// Publishes every change onto an unbounded channel.
///
/// Publishing never blocks the view model. Once the receiver is dropped,
/// changes are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Change>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Change>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ChangeSink for ChannelSink {
    fn publish(&self, change: Change) {
        if let Err(err) = self.tx.send(change) {
            trace!(change = err.0.name(), "Change receiver dropped");
        }
    }
}

//! Change sinks.

pub mod channel;
pub mod recording;

pub use channel::ChannelSink;
pub use recording::RecordingSink;

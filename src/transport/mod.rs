pub mod logging;
pub mod udp;

use std::fmt;
use std::io;

use async_trait::async_trait;

use crate::core::state::VelocityCommand;

pub use logging::LogSink;
pub use udp::UdpSink;

/// Errors that can occur while delivering commands.
/// None of them are retried; the next key press produces a fresh command.
#[derive(Debug)]
pub enum SinkError {
    /// Socket or file failure.
    Io(io::Error),
    /// The command could not be serialized.
    Encode(serde_json::Error),
    /// `send` after `close`.
    Closed,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "sink I/O error: {e}"),
            SinkError::Encode(e) => write!(f, "encode error: {e}"),
            SinkError::Closed => write!(f, "sink closed"),
        }
    }
}

impl std::error::Error for SinkError {}

impl From<io::Error> for SinkError {
    fn from(e: io::Error) -> Self {
        SinkError::Io(e)
    }
}

/// Publish-only endpoint for velocity commands. Latest command wins; there
/// is no acknowledgement.
#[async_trait]
pub trait CommandSink: Send {
    /// Returns the name of the sink.
    fn name(&self) -> &str;

    /// Transmits one command, best effort.
    async fn send(&mut self, command: &VelocityCommand) -> Result<(), SinkError>;

    /// Releases the transport. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), SinkError>;
}

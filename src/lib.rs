//! keyteleop library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod input;
pub mod teleop;
pub mod transport;

#[cfg(test)]
pub mod test_support;

/// Where velocity commands go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// JSON datagrams to a motion-control endpoint.
    #[default]
    Udp,
    /// Dry run: commands are only written to the log.
    Log,
}

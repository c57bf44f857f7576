//! Dry-run sink: commands go to the log file only.

use async_trait::async_trait;
use log::info;

use super::{CommandSink, SinkError};
use crate::core::state::VelocityCommand;

#[derive(Debug, Default)]
pub struct LogSink {
    sent: u64,
    closed: bool,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

#[async_trait]
impl CommandSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&mut self, command: &VelocityCommand) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        info!(
            "cmd_vel #{}: linear.x={:.3} angular.z={:.3}",
            self.sent, command.linear, command.angular
        );
        self.sent += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if !self.closed {
            self.closed = true;
            info!("Log sink closed after {} commands", self.sent);
        }
        Ok(())
    }
}

//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::core::keymap::Key;
use crate::core::state::VelocityCommand;
use crate::input::{InputError, KeySource};
use crate::transport::{CommandSink, SinkError};

/// A key source that replays a fixed script, then blocks forever
/// (like an operator who stopped typing).
pub struct ScriptedKeys {
    script: VecDeque<Result<Key, InputError>>,
    raw: bool,
    fail_close: bool,
    close_calls: usize,
    restores: Arc<AtomicUsize>,
}

impl ScriptedKeys {
    pub fn new<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        Self {
            script: keys.into_iter().map(Ok).collect(),
            raw: true,
            fail_close: false,
            close_calls: 0,
            restores: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Appends a read failure after the scripted keys.
    pub fn then_fail(mut self, error: InputError) -> Self {
        self.script.push_back(Err(error));
        self
    }

    /// Makes the restore step report an error (after flipping out of raw).
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    /// Number of times the terminal was actually put back.
    pub fn restores(&self) -> usize {
        self.restores.load(Ordering::SeqCst)
    }

    pub fn restore_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.restores)
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl KeySource for ScriptedKeys {
    async fn read_key(&mut self) -> Result<Key, InputError> {
        match self.script.pop_front() {
            Some(next) => next,
            None => std::future::pending().await,
        }
    }

    fn close(&mut self) -> Result<(), InputError> {
        self.close_calls += 1;
        if !self.raw {
            return Ok(());
        }
        self.raw = false;
        self.restores.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(InputError::TerminalConfig(io::Error::other("tcsetattr failed")));
        }
        Ok(())
    }
}

/// A sink that remembers every command it was handed.
#[derive(Default)]
pub struct RecordingSink {
    commands: Vec<VelocityCommand>,
    close_calls: usize,
    closed: bool,
    fail_sends: bool,
    fail_close: bool,
    observed_restores: Option<Arc<AtomicUsize>>,
    restores_seen_at_close: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails, but the attempt is still recorded.
    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    /// Closing reports an error (the sink still counts as closed).
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Snapshots a key source's restore counter when this sink is closed.
    pub fn observing(mut self, restores: Arc<AtomicUsize>) -> Self {
        self.observed_restores = Some(restores);
        self
    }

    pub fn commands(&self) -> &[VelocityCommand] {
        &self.commands
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    pub fn restores_seen_at_close(&self) -> Option<usize> {
        self.restores_seen_at_close
    }
}

#[async_trait]
impl CommandSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&mut self, command: &VelocityCommand) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.commands.push(*command);
        if self.fail_sends {
            return Err(SinkError::Io(io::Error::other("network unreachable")));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.close_calls += 1;
        self.closed = true;
        if let Some(ref restores) = self.observed_restores {
            self.restores_seen_at_close = Some(restores.load(Ordering::SeqCst));
        }
        if self.fail_close {
            return Err(SinkError::Io(io::Error::other("socket already gone")));
        }
        Ok(())
    }
}

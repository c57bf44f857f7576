//! # Shutdown
//!
//! One exit path for quit, interrupt and input failure:
//!
//! 1. restore the terminal (`KeySource::close`)
//! 2. release the transport (`CommandSink::close`)
//! 3. report completion so `main` can exit with success
//!
//! Each step runs even if the previous one failed. The handler runs at most
//! once; later calls are no-ops.

use log::{error, info, warn};

use crate::input::{InputError, KeySource};
use crate::transport::CommandSink;

/// Why the control loop ended.
#[derive(Debug)]
pub enum StopReason {
    Quit,
    Interrupted,
    InputFailed(InputError),
    /// The loop was dropped without an explicit shutdown (panic, early return).
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    AlreadyDone,
}

#[derive(Debug, Default)]
pub struct ShutdownHandler {
    completed: bool,
}

impl ShutdownHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn run<K, S>(&mut self, keys: &mut K, sink: &mut S, reason: &StopReason) -> Outcome
    where
        K: KeySource + ?Sized,
        S: CommandSink + ?Sized,
    {
        if self.completed {
            return Outcome::AlreadyDone;
        }
        self.completed = true;

        match reason {
            StopReason::Quit => info!("Shutting down: quit key"),
            StopReason::Interrupted => info!("Shutting down: interrupt"),
            StopReason::InputFailed(e) => warn!("Shutting down: {}", e),
            StopReason::Abandoned => warn!("Shutting down: loop abandoned"),
        }

        if let Err(e) = keys.close() {
            error!("Failed to restore terminal: {}", e);
        }
        release_sink(sink);
        Outcome::Completed
    }
}

/// Closes a sink, logging rather than propagating a failure. Also used when
/// startup aborts before the loop exists.
pub fn release_sink<S: CommandSink + ?Sized>(sink: &mut S) {
    if let Err(e) = sink.close() {
        error!("Failed to close {} sink: {}", sink.name(), e);
    }
}

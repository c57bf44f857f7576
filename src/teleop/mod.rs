//! # Teleop Driver
//!
//! Runs the read → update → publish cycle on top of the pure core.
//!
//! The only suspension point is the key read. An interrupt future is raced
//! against it; when the interrupt wins, the pending read is dropped and the
//! loop stops. Cleanup never happens inside the signal path itself, only in
//! [`TeleopLoop::shutdown`].
//!
//! ```text
//!   ┌──────────┐  key   ┌──────────┐ Effect ┌──────────────┐
//!   │KeySource │ ─────▶ │ update() │ ─────▶ │ CommandSink  │
//!   └──────────┘        └──────────┘        └──────────────┘
//!        ▲                                         │
//!        └────────── ShutdownHandler ◀─────────────┘
//! ```

use std::future::Future;
use std::io::{self, Write};

use log::{debug, info, warn};

use crate::core::action::{Effect, update};
use crate::core::shutdown::{Outcome, ShutdownHandler, StopReason};
use crate::core::state::{Phase, Speeds, TeleopState, VelocityCommand};
use crate::input::{InputError, KeySource};
use crate::transport::CommandSink;

pub struct TeleopLoop<K: KeySource, S: CommandSink> {
    state: TeleopState,
    keys: K,
    sink: S,
    shutdown: ShutdownHandler,
    published: u64,
}

impl<K: KeySource, S: CommandSink> TeleopLoop<K, S> {
    pub fn new(speeds: Speeds, keys: K, sink: S) -> Self {
        Self {
            state: TeleopState::new(speeds),
            keys,
            sink,
            shutdown: ShutdownHandler::new(),
            published: 0,
        }
    }

    pub fn state(&self) -> &TeleopState {
        &self.state
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Commands handed to the sink, including ones it failed to deliver.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Runs until quit, interrupt or input failure.
    pub async fn run<F>(&mut self, interrupt: F) -> StopReason
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        loop {
            self.state.reset();

            let read = tokio::select! {
                biased;
                _ = &mut interrupt => {
                    info!("Interrupt received while waiting for a key");
                    self.state.phase = Phase::Stopping;
                    return StopReason::Interrupted;
                }
                read = self.keys.read_key() => read,
            };

            let key = match read {
                Ok(key) => key,
                Err(InputError::Interrupted) => {
                    info!("Ctrl+C pressed");
                    self.state.phase = Phase::Stopping;
                    return StopReason::Interrupted;
                }
                Err(e) => {
                    self.state.phase = Phase::Stopping;
                    return StopReason::InputFailed(e);
                }
            };

            match update(&mut self.state, key) {
                Effect::Publish(command) => self.publish(command).await,
                Effect::Quit => return StopReason::Quit,
                Effect::None => {}
            }
        }
    }

    async fn publish(&mut self, command: VelocityCommand) {
        self.published += 1;
        debug!(
            "publish linear={:.3} angular={:.3} via {}",
            command.linear,
            command.angular,
            self.sink.name()
        );
        if let Err(e) = self.sink.send(&command).await {
            warn!("Failed to publish command: {}", e);
        }
    }

    /// Restores the terminal and releases the sink. Only the first call
    /// does anything.
    pub fn shutdown(&mut self, reason: &StopReason) -> Outcome {
        self.shutdown.run(&mut self.keys, &mut self.sink, reason)
    }
}

impl<K: KeySource, S: CommandSink> Drop for TeleopLoop<K, S> {
    fn drop(&mut self) {
        if !self.shutdown.is_completed() {
            warn!("Teleop loop dropped before shutdown");
            self.shutdown(&StopReason::Abandoned);
        }
    }
}

/// Completes on the operator's interrupt signal (SIGINT / Ctrl+C on the
/// console). Never completes if the handler cannot be installed.
///
/// The handler is installed when this is called, not when the future is
/// first polled, so call it before the terminal goes raw. A signal that lands
/// in between is then held for the loop instead of killing the process with
/// the terminal still raw. Must be called inside a tokio runtime.
pub fn interrupt_signal() -> impl Future<Output = ()> + Send + 'static {
    let listener = listen_for_interrupt();
    async move {
        match listener {
            Ok(mut listener) => {
                if listener.recv().await.is_some() {
                    return;
                }
                warn!("Interrupt signal stream closed");
            }
            Err(e) => warn!("Failed to listen for interrupt signal: {}", e),
        }
        std::future::pending::<()>().await
    }
}

#[cfg(unix)]
fn listen_for_interrupt() -> io::Result<tokio::signal::unix::Signal> {
    use tokio::signal::unix::{SignalKind, signal};
    signal(SignalKind::interrupt())
}

#[cfg(windows)]
fn listen_for_interrupt() -> io::Result<tokio::signal::windows::CtrlC> {
    tokio::signal::windows::ctrl_c()
}

/// Operator instructions, printed before the terminal goes raw.
pub fn print_banner(out: &mut impl Write, speeds: Speeds) -> io::Result<()> {
    writeln!(
        out,
        "Setup:\n  linear = {} m/s\n  angular = {} rad/s",
        speeds.max_linear, speeds.max_angular
    )?;
    writeln!(out, "Reading from keyboard")?;
    writeln!(out, "---------------------------")?;
    writeln!(out, "Use arrow keys to move the robot. 'q' to quit.")?;
    out.flush()
}

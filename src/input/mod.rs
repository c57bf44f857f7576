//! # Raw Keyboard Input
//!
//! A [`KeySource`] hands out one logical key per read. Opening a source puts
//! the terminal into raw mode; [`KeySource::close`] puts it back.
//!
//! `terminal` is the only backend that touches a real terminal. Tests drive
//! the loop with scripted sources instead.

pub mod terminal;

use std::fmt;
use std::io;

use async_trait::async_trait;

use crate::core::keymap::Key;

pub use terminal::TerminalKeySource;

#[derive(Debug)]
pub enum InputError {
    /// Raw mode could not be established. Fatal at startup.
    TerminalConfig(io::Error),
    /// The device failed mid-read. Ends the session.
    Read(io::Error),
    /// The event stream ended.
    Closed,
    /// The operator pressed Ctrl+C while the terminal was raw.
    Interrupted,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::TerminalConfig(e) => write!(f, "cannot configure terminal: {e}"),
            InputError::Read(e) => write!(f, "read failed: {e}"),
            InputError::Closed => write!(f, "input closed"),
            InputError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::TerminalConfig(e) | InputError::Read(e) => Some(e),
            InputError::Closed | InputError::Interrupted => None,
        }
    }
}

#[async_trait]
pub trait KeySource: Send {
    /// Waits for the next key. Errors are end-of-input, never retried.
    async fn read_key(&mut self) -> Result<Key, InputError>;

    /// Restores the terminal mode captured at open. Safe to call repeatedly.
    fn close(&mut self) -> Result<(), InputError>;
}

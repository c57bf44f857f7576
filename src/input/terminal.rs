//! crossterm-backed [`KeySource`].
//!
//! crossterm hides the platform split (termios on Unix, console input on
//! Windows) and already folds arrow-key escape sequences into single events,
//! so the loop only ever sees logical [`Key`]s.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures::StreamExt;
use log::{debug, info, warn};

use super::{InputError, KeySource};
use crate::core::keymap::Key;

/// Owns raw mode from `open()` until `close()` (or drop).
pub struct TerminalKeySource {
    events: EventStream,
    raw: bool,
}

impl TerminalKeySource {
    /// Captures the current terminal mode and switches to raw mode.
    pub fn open() -> Result<Self, InputError> {
        terminal::enable_raw_mode().map_err(InputError::TerminalConfig)?;
        info!("Terminal switched to raw mode");
        Ok(Self {
            events: EventStream::new(),
            raw: true,
        })
    }
}

/// Resolves a key event to a logical key.
///
/// `None` means the event is not a key press at all (a release), and
/// `Err(Interrupted)` is Ctrl+C, which raw mode no longer turns into SIGINT.
pub(crate) fn translate(event: KeyEvent) -> Option<Result<Key, InputError>> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let key = match (event.modifiers, event.code) {
        (m, KeyCode::Char('c')) if m.contains(KeyModifiers::CONTROL) => {
            return Some(Err(InputError::Interrupted));
        }
        (_, KeyCode::Up) => Key::Up,
        (_, KeyCode::Down) => Key::Down,
        (_, KeyCode::Left) => Key::Left,
        (_, KeyCode::Right) => Key::Right,
        (_, KeyCode::Char(c)) => Key::Char(c),
        _ => Key::Other,
    };
    Some(Ok(key))
}

#[async_trait::async_trait]
impl KeySource for TerminalKeySource {
    async fn read_key(&mut self) -> Result<Key, InputError> {
        loop {
            match self.events.next().await {
                Some(Ok(Event::Key(key_event))) => {
                    debug!("Key event: {:?} with modifiers {:?}", key_event.code, key_event.modifiers);
                    if let Some(result) = translate(key_event) {
                        return result;
                    }
                }
                // Resize, focus, mouse, paste
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(InputError::Read(e)),
                None => return Err(InputError::Closed),
            }
        }
    }

    fn close(&mut self) -> Result<(), InputError> {
        if !self.raw {
            debug!("Terminal already restored");
            return Ok(());
        }
        self.raw = false;
        terminal::disable_raw_mode().map_err(InputError::TerminalConfig)?;
        info!("Terminal mode restored");
        Ok(())
    }
}

impl Drop for TerminalKeySource {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to restore terminal on drop: {}", e);
        }
    }
}

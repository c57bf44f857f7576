//! # Key Map
//!
//! The fixed key → motion policy. Left turns are positive angular velocity
//! and right turns negative, matching the robot's rotation convention.

use crate::core::state::Speeds;

/// The key that ends the session.
pub const QUIT_KEY: char = 'q';

/// A logical key, already resolved from whatever bytes the terminal sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    /// Any key the input layer has no name for (function keys, Home, ...).
    Other,
}

/// What a key asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Linear(f64),
    Angular(f64),
    Quit,
    /// Unrecognized key: no velocity change, no termination.
    Ignore,
}

impl Motion {
    /// True if this motion requests a non-zero velocity.
    pub fn is_moving(&self) -> bool {
        match *self {
            Motion::Linear(v) | Motion::Angular(v) => v != 0.0,
            Motion::Quit | Motion::Ignore => false,
        }
    }
}

pub fn map_key(key: Key, speeds: Speeds) -> Motion {
    match key {
        Key::Up => Motion::Linear(speeds.max_linear),
        Key::Down => Motion::Linear(-speeds.max_linear),
        Key::Left => Motion::Angular(speeds.max_angular),
        Key::Right => Motion::Angular(-speeds.max_angular),
        Key::Char(QUIT_KEY) => Motion::Quit,
        Key::Char(_) | Key::Other => Motion::Ignore,
    }
}

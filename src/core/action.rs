//! # Update
//!
//! Every key the operator presses goes through `update()`.
//! Up arrow? That's `Effect::Publish(VelocityCommand { linear: max, .. })`.
//! `q`? That's `Effect::Quit`.
//!
//! ```text
//! State + Key  →  update()  →  New State + Effect
//! ```
//!
//! No I/O here. The driver in `teleop` performs the effect.

use log::debug;

use crate::core::keymap::{Key, Motion, map_key};
use crate::core::state::{Phase, TeleopState, VelocityCommand};

/// Side effect requested by one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    None,
    Publish(VelocityCommand),
    Quit,
}

pub fn update(state: &mut TeleopState, key: Key) -> Effect {
    state.reset();

    let motion = map_key(key, state.speeds());
    debug!("key {:?} -> {:?}", key, motion);

    match motion {
        Motion::Quit => {
            state.phase = Phase::Stopping;
            return Effect::Quit;
        }
        Motion::Linear(v) => state.linear = v,
        Motion::Angular(v) => state.angular = v,
        Motion::Ignore => {}
    }

    if motion.is_moving() {
        state.dirty = true;
    }

    if state.dirty {
        state.dirty = false;
        Effect::Publish(state.command())
    } else {
        Effect::None
    }
}

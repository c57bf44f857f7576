//! # Core Teleoperation Logic
//!
//! Everything that decides *what* the robot is asked to do.
//! It knows nothing about terminals or sockets.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (velocities)   │
//!                    │  • map_key() (policy)   │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. Pure.          │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   input    │      │   teleop   │      │ transport  │
//!     │ (raw keys) │      │  (driver)  │      │  (sinks)   │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `TeleopState` and `VelocityCommand`
//! - [`keymap`]: the key → motion table
//! - [`action`]: `update()`, one loop iteration as a state transition
//! - [`shutdown`]: the single exit path that restores the terminal
//! - [`config`]: config file loading and resolution
//!
//! `config` reads the config file and `shutdown` closes whatever it is handed.
//! Everything else here is pure.

pub mod action;
pub mod config;
pub mod keymap;
pub mod shutdown;
pub mod state;

//! # Teleoperation State
//!
//! ```text
//! TeleopState
//! ├── speeds: Speeds        // max linear / angular, fixed for the process
//! ├── linear: f64           // requested linear velocity, this iteration
//! ├── angular: f64          // requested angular velocity, this iteration
//! ├── dirty: bool           // a recognized key changed the request
//! └── phase: Phase          // Running until quit or input failure
//! ```
//!
//! State changes only happen through `update(state, key)` in action.rs.

/// Default max linear speed in m/s.
pub const DEFAULT_MAX_LINEAR: f64 = 1.0;
/// Default max angular speed in rad/s.
pub const DEFAULT_MAX_ANGULAR: f64 = 0.5;

/// Speed limits applied by the key map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speeds {
    pub max_linear: f64,
    pub max_angular: f64,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            max_linear: DEFAULT_MAX_LINEAR,
            max_angular: DEFAULT_MAX_ANGULAR,
        }
    }
}

/// A single motion request handed to a sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    /// Terminal. Reached by the quit key or an input failure.
    Stopping,
}

#[derive(Debug, Clone)]
pub struct TeleopState {
    speeds: Speeds,
    pub linear: f64,
    pub angular: f64,
    pub dirty: bool,
    pub phase: Phase,
}

impl TeleopState {
    pub fn new(speeds: Speeds) -> Self {
        Self {
            speeds,
            linear: 0.0,
            angular: 0.0,
            dirty: false,
            phase: Phase::Running,
        }
    }

    pub fn speeds(&self) -> Speeds {
        self.speeds
    }

    /// Zeroes the requested velocity. Called before every key is interpreted.
    pub fn reset(&mut self) {
        self.linear = 0.0;
        self.angular = 0.0;
    }

    pub fn command(&self) -> VelocityCommand {
        VelocityCommand {
            linear: self.linear,
            angular: self.angular,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// One of the two relativistic clocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// Elapsed proper time.
    pub ticks: f64,
    /// Three-state label cycling `a -> b -> c` with each whole tick.
    pub state: char,
    pub dilation: f64,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            ticks: 0.0,
            state: 'a',
            dilation: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clocks {
    pub earth: ClockState,
    pub rocket: ClockState,
}

/// Reference traveller whose speed (fraction of c) drives the rocket clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spaceship {
    pub x: f64,
    pub y: f64,
    pub v: f64,
}

impl Spaceship {
    pub const START_X: f64 = -0.9;
    pub const START_Y: f64 = 0.6;

    #[must_use]
    pub fn new(v: f64) -> Self {
        Self {
            x: Self::START_X,
            y: Self::START_Y,
            v,
        }
    }
}

/// Cosmological phase; only ever advances as rigidity decays.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Primordial,
    Hadronic,
    Atomic,
    Molecular,
    Stellar,
    Cosmic,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Primordial,
        Phase::Hadronic,
        Phase::Atomic,
        Phase::Molecular,
        Phase::Stellar,
        Phase::Cosmic,
    ];

    /// The following phase, or `None` for `Cosmic`.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Primordial => Some(Phase::Hadronic),
            Phase::Hadronic => Some(Phase::Atomic),
            Phase::Atomic => Some(Phase::Molecular),
            Phase::Molecular => Some(Phase::Stellar),
            Phase::Stellar => Some(Phase::Cosmic),
            Phase::Cosmic => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Phase::Primordial => "PRIMORDIAL",
            Phase::Hadronic => "HADRONIC",
            Phase::Atomic => "ATOMIC",
            Phase::Molecular => "MOLECULAR",
            Phase::Stellar => "STELLAR",
            Phase::Cosmic => "COSMIC",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contents of the mailbox shared with the agent layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedMemory {
    pub user_deduction: String,
    pub pending_actions: VecDeque<String>,
    pub evolution_log: VecDeque<String>,
}

// Result of a single liveness round trip.

use serde::Serialize;
use std::fmt;

/// Outcome of one liveness query.
///
/// Anything but `Alive` means "not alive" for callers which only need a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every watched service answered `true` in time.
    Alive,
    /// The responder answered in time and at least one service said `false`.
    Unhealthy,
    /// No answer arrived before the deadline.
    TimedOut,
}

impl Outcome {
    pub fn is_alive(self) -> bool {
        matches!(self, Outcome::Alive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Alive => "alive",
            Outcome::Unhealthy => "unhealthy",
            Outcome::TimedOut => "timed_out",
        }
    }
}

impl From<bool> for Outcome {
    fn from(is_alive: bool) -> Self {
        if is_alive {
            Outcome::Alive
        } else {
            Outcome::Unhealthy
        }
    }
}

impl From<Outcome> for bool {
    fn from(outcome: Outcome) -> Self {
        outcome.is_alive()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

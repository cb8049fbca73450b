use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Phases in the election lifecycle. Transitions only ever move forward.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Candidates may be registered; no votes are accepted yet.
    #[default]
    NotStarted,
    /// The voting window is open.
    Active,
    /// Voting has closed for good.
    Ended,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::NotStarted => "not started",
                Self::Active => "active",
                Self::Ended => "ended",
            }
        )
    }
}

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::CandidateIndex;

/// Notifications emitted after a mutation has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ElectionEvent<I> {
    CandidateRegistered {
        index: CandidateIndex,
        name: String,
    },
    VoteCast {
        voter: I,
        candidate: CandidateIndex,
    },
    ElectionEnded,
}

impl<I: Display> Display for ElectionEvent<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CandidateRegistered { index, name } => {
                write!(f, "CandidateRegistered({index}, {name:?})")
            }
            Self::VoteCast { voter, candidate } => write!(f, "VoteCast({voter}, {candidate})"),
            Self::ElectionEnded => write!(f, "ElectionEnded()"),
        }
    }
}

/// Observer that receives every [`ElectionEvent`], synchronously and in order.
///
/// Delivery is fire-and-forget: a sink has no way to report failure back to
/// the election, so whatever it does cannot undo or block the mutation.
pub trait EventSink<I> {
    fn notify(&mut self, event: ElectionEvent<I>);
}

/// Discards every event.
impl<I> EventSink<I> for () {
    fn notify(&mut self, _event: ElectionEvent<I>) {}
}

/// Records every event, oldest first.
impl<I> EventSink<I> for Vec<ElectionEvent<I>> {
    fn notify(&mut self, event: ElectionEvent<I>) {
        self.push(event);
    }
}

//! The election state machine: candidate registry, ballot record, lifecycle and tallies.

pub use candidate::{Candidate, CandidateIndex, CandidateStats, Winner};
pub use election_core::{Election, MIN_CANDIDATES};
pub use error::{ElectionError, Result};
pub use event::{ElectionEvent, EventSink};
pub use phase::Phase;
pub use snapshot::{ElectionSnapshot, SnapshotError};

mod candidate;
mod election_core;
mod error;
mod event;
mod phase;
mod snapshot;

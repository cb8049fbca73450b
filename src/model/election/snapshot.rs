use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Candidate, CandidateIndex, Election, Phase, MIN_CANDIDATES};

/// Everything needed to rebuild an [`Election`], minus its event sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSnapshot<I> {
    pub admin: I,
    pub phase: Phase,
    pub candidates: Vec<Candidate>,
    /// Identities that have voted, in no particular order.
    pub voters: Vec<I>,
}

/// A snapshot that no sequence of election operations could have produced.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Candidate at position {position} claims index {index}")]
    IndexMismatch {
        position: usize,
        index: CandidateIndex,
    },
    #[error("Candidate {0} has an empty name")]
    EmptyName(CandidateIndex),
    #[error("An identity appears more than once in the ballot record")]
    DuplicateVoter,
    #[error("Tallies add up to {tallied} votes but {voters} identities have voted")]
    TallyMismatch { tallied: u128, voters: usize },
    #[error("A {0} election cannot hold any votes")]
    UnexpectedVotes(Phase),
    #[error("Voting needs at least two candidates, snapshot has {0}")]
    TooFewCandidates(usize),
}

impl<I, S> Election<I, S>
where
    I: Clone + Eq + Hash,
{
    /// Capture the current state.
    pub fn snapshot(&self) -> ElectionSnapshot<I> {
        ElectionSnapshot {
            admin: self.admin.clone(),
            phase: self.phase,
            candidates: self.candidates.clone(),
            voters: self.voters.iter().cloned().collect(),
        }
    }

    /// Rebuild an election from a snapshot, checking that it is internally consistent.
    /// No events are emitted for the restored history.
    pub fn restore(snapshot: ElectionSnapshot<I>, sink: S) -> Result<Self, SnapshotError> {
        let ElectionSnapshot {
            admin,
            phase,
            candidates,
            voters,
        } = snapshot;

        for (position, candidate) in candidates.iter().enumerate() {
            if candidate.index != position {
                return Err(SnapshotError::IndexMismatch {
                    position,
                    index: candidate.index,
                });
            }
            if candidate.name.is_empty() {
                return Err(SnapshotError::EmptyName(position));
            }
        }

        let voter_count = voters.len();
        let voters = voters.into_iter().collect::<HashSet<_>>();
        if voters.len() != voter_count {
            return Err(SnapshotError::DuplicateVoter);
        }

        let tallied = candidates
            .iter()
            .map(|c| u128::from(c.vote_count))
            .sum::<u128>();
        if tallied != voter_count as u128 {
            return Err(SnapshotError::TallyMismatch {
                tallied,
                voters: voter_count,
            });
        }

        if phase == Phase::NotStarted && voter_count > 0 {
            return Err(SnapshotError::UnexpectedVotes(phase));
        }
        // Only an election ended straight from `NotStarted` may have fewer candidates,
        // and such an election never held votes.
        if (phase == Phase::Active || voter_count > 0) && candidates.len() < MIN_CANDIDATES {
            return Err(SnapshotError::TooFewCandidates(candidates.len()));
        }

        Ok(Self {
            admin,
            phase,
            candidates,
            voters,
            sink,
        })
    }
}

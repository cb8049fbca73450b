use serde::{Deserialize, Serialize};

use crate::model::election::{Election, Phase};

/// An API-friendly overview of the election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Whether votes are currently accepted.
    pub active: bool,
    /// Number of registered candidates.
    pub candidates: usize,
    /// Number of votes cast so far.
    pub total_votes: u64,
}

impl<I, S> From<&Election<I, S>> for ElectionSummary
where
    I: Eq + std::hash::Hash,
{
    fn from(election: &Election<I, S>) -> Self {
        Self {
            phase: election.phase(),
            active: election.is_active(),
            candidates: election.candidate_count(),
            total_votes: election.total_votes(),
        }
    }
}

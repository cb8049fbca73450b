use serde::{Deserialize, Serialize};

/// Candidates are identified by their 0-based position in registration order.
pub type CandidateIndex = usize;

/// A registered candidate together with its running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Position in registration order. Never reused or reordered.
    pub index: CandidateIndex,
    /// Display name, never empty.
    pub name: String,
    /// Number of votes received so far.
    pub vote_count: u64,
}

impl Candidate {
    pub(crate) fn new(index: CandidateIndex, name: String) -> Self {
        Self {
            index,
            name,
            vote_count: 0,
        }
    }

    /// This candidate's share of `total_votes` as a whole percentage, rounded down.
    /// Zero turnout gives zero rather than an error.
    pub fn percentage_of(&self, total_votes: u64) -> u64 {
        if total_votes == 0 {
            return 0;
        }
        // Widen so that `vote_count * 100` cannot overflow.
        let percentage = u128::from(self.vote_count) * 100 / u128::from(total_votes);
        u64::try_from(percentage).unwrap_or(u64::MAX)
    }

    /// Statistics for this candidate given the election-wide turnout.
    pub fn stats(&self, total_votes: u64) -> CandidateStats {
        CandidateStats {
            index: self.index,
            name: self.name.clone(),
            vote_count: self.vote_count,
            percentage: self.percentage_of(total_votes),
        }
    }
}

/// Per-candidate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStats {
    pub index: CandidateIndex,
    pub name: String,
    pub vote_count: u64,
    /// `floor(vote_count * 100 / total_votes)`, or 0 when nobody has voted.
    pub percentage: u64,
}

/// The candidate currently in the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub index: CandidateIndex,
    pub name: String,
    pub vote_count: u64,
}

impl From<&Candidate> for Winner {
    fn from(candidate: &Candidate) -> Self {
        Self {
            index: candidate.index,
            name: candidate.name.clone(),
            vote_count: candidate.vote_count,
        }
    }
}

use thiserror::Error;

use super::{CandidateIndex, Phase};

pub type Result<T> = std::result::Result<T, ElectionError>;

/// Reasons an election operation can be refused. None of these are transient:
/// a refused operation has left the election exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("Only the administrator may {0}")]
    Unauthorized(&'static str),
    #[error("Cannot {action} while the election is {phase}")]
    InvalidPhase { action: &'static str, phase: Phase },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Need at least {required} candidates to start voting, only {registered} registered")]
    InsufficientCandidates { registered: usize, required: usize },
    #[error("No candidate with index {index} ({count} registered)")]
    InvalidCandidate { index: CandidateIndex, count: usize },
    #[error("Already voted")]
    DuplicateVote,
    #[error("No votes cast yet")]
    NoVotesCast,
}

impl ElectionError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::InvalidPhase { .. } => "InvalidPhase",
            Self::InvalidInput(_) => "InvalidInput",
            Self::InsufficientCandidates { .. } => "InsufficientCandidates",
            Self::InvalidCandidate { .. } => "InvalidCandidate",
            Self::DuplicateVote => "DuplicateVote",
            Self::NoVotesCast => "NoVotesCast",
        }
    }
}

//! Independent checking of an [`ElectionDump`]: the snapshot must be internally
//! consistent, and its audit log must cover the whole history and agree with
//! the tallies and the lifecycle phase.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{
    election::{CandidateIndex, CandidateStats, ElectionEvent, Phase, SnapshotError, Winner},
    identity::Identity,
    store::ElectionDump,
    HostedElection,
};

/// Ways a dump can fail verification.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Inconsistent election state: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Audit log is not contiguous from sequence 0: position {position} holds #{sequence}")]
    IncompleteAuditLog { position: usize, sequence: u64 },
    #[error("Audit log registers {logged} candidates, but the election has {actual}")]
    CandidateCountMismatch { logged: usize, actual: usize },
    #[error("Audit log registers candidate {logged} where candidate {expected} was due")]
    RegistrationOutOfOrder {
        expected: CandidateIndex,
        logged: CandidateIndex,
    },
    #[error("Audit log registers candidate {0} after voting had begun or ended")]
    LateRegistration(CandidateIndex),
    #[error("Audit log registers candidate {index} as {logged:?}, but the election disagrees")]
    NameMismatch { index: CandidateIndex, logged: String },
    #[error("Audit log records a vote for unknown candidate {0}")]
    UnknownCandidate(CandidateIndex),
    #[error("Audit log records a vote by {0} after the election ended")]
    VoteAfterEnd(Identity),
    #[error("Audit log records {0} voting more than once")]
    RepeatedVoter(Identity),
    #[error("Audit log records a vote by {0}, who is missing from the ballot record")]
    UnrecordedVoter(Identity),
    #[error("Audit log records {logged} votes for candidate {index}, but the tally is {tallied}")]
    TallyMismatch {
        index: CandidateIndex,
        logged: u64,
        tallied: u64,
    },
    #[error("Audit log records an end, but the election is {0}")]
    UnexpectedEnd(Phase),
    #[error("Election has ended, but the audit log records no end")]
    UnloggedEnd,
}

/// The outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedResults {
    pub phase: Phase,
    pub total_votes: u64,
    /// Statistics for every candidate, in index order.
    pub standings: Vec<CandidateStats>,
    /// `None` until somebody has voted.
    pub winner: Option<Winner>,
}

/// Verify a dump, returning the results it attests to.
pub fn verify(dump: ElectionDump) -> Result<VerifiedResults, VerificationError> {
    let election = dump.into_election()?;
    verify_election(&election)?;
    Ok(VerifiedResults {
        phase: election.phase(),
        total_votes: election.total_votes(),
        standings: election.standings(),
        winner: election.current_winner().ok(),
    })
}

/// Replay the audit log of an already restored election against its state.
pub fn verify_election(election: &HostedElection) -> Result<(), VerificationError> {
    let entries = election.sink().entries();
    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 {
            return Err(VerificationError::IncompleteAuditLog {
                position,
                sequence: entry.sequence,
            });
        }
    }

    let mut registered = 0;
    let mut logged_votes = vec![0_u64; election.candidate_count()];
    let mut voters = HashSet::new();
    let mut voting_begun = false;
    let mut ended = false;

    for entry in entries {
        match &entry.event {
            ElectionEvent::CandidateRegistered { index, name } => {
                if voting_begun || ended {
                    return Err(VerificationError::LateRegistration(*index));
                }
                if *index != registered {
                    return Err(VerificationError::RegistrationOutOfOrder {
                        expected: registered,
                        logged: *index,
                    });
                }
                if election.candidate(*index).map(|c| &c.name) != Some(name) {
                    return Err(VerificationError::NameMismatch {
                        index: *index,
                        logged: name.clone(),
                    });
                }
                registered += 1;
            }
            ElectionEvent::VoteCast { voter, candidate } => {
                if ended {
                    return Err(VerificationError::VoteAfterEnd(voter.clone()));
                }
                voting_begun = true;
                let count = logged_votes
                    .get_mut(*candidate)
                    .ok_or(VerificationError::UnknownCandidate(*candidate))?;
                *count += 1;
                if !voters.insert(voter) {
                    return Err(VerificationError::RepeatedVoter(voter.clone()));
                }
                if !election.has_voted(voter) {
                    return Err(VerificationError::UnrecordedVoter(voter.clone()));
                }
            }
            ElectionEvent::ElectionEnded => ended = true,
        }
    }

    if registered != election.candidate_count() {
        return Err(VerificationError::CandidateCountMismatch {
            logged: registered,
            actual: election.candidate_count(),
        });
    }
    for (index, logged) in logged_votes.into_iter().enumerate() {
        let tallied = election.candidate(index).map_or(0, |c| c.vote_count);
        if logged != tallied {
            return Err(VerificationError::TallyMismatch {
                index,
                logged,
                tallied,
            });
        }
    }
    match (ended, election.phase()) {
        (true, Phase::Ended) | (false, Phase::NotStarted | Phase::Active) => {}
        (true, phase) => return Err(VerificationError::UnexpectedEnd(phase)),
        (false, Phase::Ended) => return Err(VerificationError::UnloggedEnd),
    }

    Ok(())
}

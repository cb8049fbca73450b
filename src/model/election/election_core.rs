use std::collections::HashSet;
use std::hash::Hash;

use super::{
    Candidate, CandidateIndex, CandidateStats, ElectionError, ElectionEvent, EventSink, Phase,
    Result, Winner,
};

/// Voting cannot open with fewer candidates than this.
pub const MIN_CANDIDATES: usize = 2;

/// A single election: candidate registry, ballot record and lifecycle phase.
///
/// Mutating operations take `&mut self` and run every precondition check before
/// touching any field, so a refused operation never leaves partial changes.
/// Hosts that share an election between threads must serialise writers behind
/// one lock around the whole value.
#[derive(Debug, Clone)]
pub struct Election<I, S> {
    /// The only identity allowed to register candidates and drive the lifecycle.
    pub(super) admin: I,
    pub(super) phase: Phase,
    /// Indexed by [`CandidateIndex`].
    pub(super) candidates: Vec<Candidate>,
    /// Everyone who has voted. Entries are never removed.
    pub(super) voters: HashSet<I>,
    pub(super) sink: S,
}

impl<I, S> Election<I, S>
where
    I: Clone + Eq + Hash,
    S: EventSink<I>,
{
    /// Create an election administered by `admin`, reporting events to `sink`.
    pub fn new(admin: I, sink: S) -> Self {
        Self {
            admin,
            phase: Phase::NotStarted,
            candidates: Vec::new(),
            voters: HashSet::new(),
            sink,
        }
    }

    /// Register a new candidate, returning its index. Administrator only, before voting opens.
    pub fn register(&mut self, caller: &I, name: impl Into<String>) -> Result<CandidateIndex> {
        const ACTION: &str = "register candidates";
        self.exit_if_not_admin(caller, ACTION)?;
        self.exit_unless_phase(Phase::NotStarted, ACTION)?;

        let name = name.into();
        if name.is_empty() {
            return Err(ElectionError::InvalidInput(
                "candidate name must not be empty".to_string(),
            ));
        }

        let index = self.candidates.len();
        self.candidates.push(Candidate::new(index, name.clone()));
        self.sink
            .notify(ElectionEvent::CandidateRegistered { index, name });

        Ok(index)
    }

    /// Open the voting window. Administrator only; requires [`MIN_CANDIDATES`].
    pub fn start(&mut self, caller: &I) -> Result<()> {
        const ACTION: &str = "start voting";
        self.exit_if_not_admin(caller, ACTION)?;
        self.exit_unless_phase(Phase::NotStarted, ACTION)?;

        let registered = self.candidates.len();
        if registered < MIN_CANDIDATES {
            return Err(ElectionError::InsufficientCandidates {
                registered,
                required: MIN_CANDIDATES,
            });
        }

        self.phase = Phase::Active;
        Ok(())
    }

    /// Close the election for good. Administrator only.
    ///
    /// Accepted in every phase: ending an election that has already ended is a
    /// successful no-op that emits [`ElectionEvent::ElectionEnded`] again, and
    /// ending one that never started skips straight to [`Phase::Ended`].
    pub fn end(&mut self, caller: &I) -> Result<()> {
        self.exit_if_not_admin(caller, "end the election")?;

        self.phase = Phase::Ended;
        self.sink.notify(ElectionEvent::ElectionEnded);
        Ok(())
    }

    /// Record `caller`'s vote for the candidate at `index`. Votes are final.
    pub fn cast_vote(&mut self, caller: &I, index: CandidateIndex) -> Result<()> {
        self.exit_unless_phase(Phase::Active, "cast votes")?;

        let count = self.candidates.len();
        let candidate = self
            .candidates
            .get_mut(index)
            .ok_or(ElectionError::InvalidCandidate { index, count })?;

        if self.voters.contains(caller) {
            return Err(ElectionError::DuplicateVote);
        }

        candidate.vote_count += 1;
        self.voters.insert(caller.clone());
        self.sink.notify(ElectionEvent::VoteCast {
            voter: caller.clone(),
            candidate: index,
        });

        Ok(())
    }

    fn exit_if_not_admin(&self, caller: &I, action: &'static str) -> Result<()> {
        if caller != &self.admin {
            return Err(ElectionError::Unauthorized(action));
        }
        Ok(())
    }

    fn exit_unless_phase(&self, required: Phase, action: &'static str) -> Result<()> {
        if self.phase != required {
            return Err(ElectionError::InvalidPhase {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }
}

impl<I, S> Election<I, S>
where
    I: Eq + Hash,
{
    pub fn admin(&self) -> &I {
        &self.admin
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the voting window is open.
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate(&self, index: CandidateIndex) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    pub fn has_voted(&self, identity: &I) -> bool {
        self.voters.contains(identity)
    }

    /// Sum of all tallies. Always equal to the number of distinct voters.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// Name, tally and floored percentage share for one candidate.
    pub fn candidate_stats(&self, index: CandidateIndex) -> Result<CandidateStats> {
        let candidate = self
            .candidates
            .get(index)
            .ok_or(ElectionError::InvalidCandidate {
                index,
                count: self.candidates.len(),
            })?;
        Ok(candidate.stats(self.total_votes()))
    }

    /// Statistics for every candidate, in index order.
    pub fn standings(&self) -> Vec<CandidateStats> {
        let total_votes = self.total_votes();
        self.candidates
            .iter()
            .map(|candidate| candidate.stats(total_votes))
            .collect()
    }

    /// The candidate with the most votes. Ties go to the earliest-registered candidate.
    pub fn current_winner(&self) -> Result<Winner> {
        if self.total_votes() == 0 {
            return Err(ElectionError::NoVotesCast);
        }
        // Strictly greater, so an equal tally never displaces an earlier candidate.
        self.candidates
            .iter()
            .reduce(|best, candidate| {
                if candidate.vote_count > best.vote_count {
                    candidate
                } else {
                    best
                }
            })
            .map(Winner::from)
            .ok_or(ElectionError::NoVotesCast)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "admin";
    const U1: &str = "user1";
    const U2: &str = "user2";
    const U3: &str = "user3";
    const VOTERS: [&str; 8] = ["v0", "v1", "v2", "v3", "v4", "v5", "v6", "v7"];

    type TestElection = Election<&'static str, Vec<ElectionEvent<&'static str>>>;

    fn election() -> TestElection {
        Election::new(ADMIN, Vec::new())
    }

    /// An active election with the given candidate names.
    fn active_with(names: &[&str]) -> TestElection {
        let mut election = election();
        for name in names {
            election.register(&ADMIN, *name).unwrap();
        }
        election.start(&ADMIN).unwrap();
        election
    }

    /// An active election where candidate `i` received `votes[i]` votes.
    fn tallied(votes: &[u64]) -> TestElection {
        let names = (1..=votes.len())
            .map(|i| format!("Candidate {i}"))
            .collect::<Vec<_>>();
        let mut election = election();
        for name in &names {
            election.register(&ADMIN, name.as_str()).unwrap();
        }
        election.start(&ADMIN).unwrap();

        let mut voters = VOTERS.iter();
        for (index, count) in votes.iter().enumerate() {
            for _ in 0..*count {
                let voter = voters.next().expect("not enough test voters");
                election.cast_vote(voter, index).unwrap();
            }
        }
        election
    }

    #[test]
    fn admin_registers_candidates_in_order() {
        let mut election = election();
        assert_eq!(election.register(&ADMIN, "Candidate 1"), Ok(0));
        assert_eq!(election.register(&ADMIN, "Candidate 2"), Ok(1));
        assert_eq!(election.candidate_count(), 2);
        assert_eq!(election.candidate(1).unwrap().name, "Candidate 2");
        assert_eq!(election.candidate(1).unwrap().vote_count, 0);
        assert_eq!(
            election.sink(),
            &vec![
                ElectionEvent::CandidateRegistered {
                    index: 0,
                    name: "Candidate 1".to_string()
                },
                ElectionEvent::CandidateRegistered {
                    index: 1,
                    name: "Candidate 2".to_string()
                },
            ]
        );
    }

    #[test]
    fn non_admin_cannot_register() {
        let mut election = election();
        assert_eq!(
            election.register(&U1, "Candidate 1"),
            Err(ElectionError::Unauthorized("register candidates"))
        );
        assert_eq!(election.candidate_count(), 0);
        assert!(election.sink().is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut election = election();
        assert!(matches!(
            election.register(&ADMIN, ""),
            Err(ElectionError::InvalidInput(_))
        ));
        assert_eq!(election.candidate_count(), 0);
    }

    #[test]
    fn authority_is_checked_before_phase_and_input() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        assert_eq!(
            election.register(&U1, ""),
            Err(ElectionError::Unauthorized("register candidates"))
        );
        assert!(matches!(
            election.register(&ADMIN, ""),
            Err(ElectionError::InvalidPhase {
                phase: Phase::Active,
                ..
            })
        ));
    }

    #[test]
    fn cannot_register_once_voting_started_or_ended() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        assert!(matches!(
            election.register(&ADMIN, "Candidate 3"),
            Err(ElectionError::InvalidPhase { .. })
        ));
        election.end(&ADMIN).unwrap();
        assert!(matches!(
            election.register(&ADMIN, "Candidate 3"),
            Err(ElectionError::InvalidPhase {
                phase: Phase::Ended,
                ..
            })
        ));
        assert_eq!(election.candidate_count(), 2);
    }

    #[test]
    fn start_needs_two_candidates() {
        let mut election = election();
        election.register(&ADMIN, "Candidate 1").unwrap();
        assert_eq!(
            election.start(&ADMIN),
            Err(ElectionError::InsufficientCandidates {
                registered: 1,
                required: MIN_CANDIDATES
            })
        );
        assert_eq!(election.phase(), Phase::NotStarted);

        election.register(&ADMIN, "Candidate 2").unwrap();
        assert_eq!(election.start(&ADMIN), Ok(()));
        assert!(election.is_active());
    }

    #[test]
    fn start_is_admin_only_and_happens_once() {
        let mut election = election();
        election.register(&ADMIN, "Candidate 1").unwrap();
        election.register(&ADMIN, "Candidate 2").unwrap();
        assert_eq!(
            election.start(&U1),
            Err(ElectionError::Unauthorized("start voting"))
        );
        election.start(&ADMIN).unwrap();
        assert!(matches!(
            election.start(&ADMIN),
            Err(ElectionError::InvalidPhase {
                phase: Phase::Active,
                ..
            })
        ));
        election.end(&ADMIN).unwrap();
        assert!(matches!(
            election.start(&ADMIN),
            Err(ElectionError::InvalidPhase {
                phase: Phase::Ended,
                ..
            })
        ));
        assert!(!election.is_active());
    }

    #[test]
    fn end_is_admin_only() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        assert_eq!(
            election.end(&U1),
            Err(ElectionError::Unauthorized("end the election"))
        );
        assert!(election.is_active());
    }

    #[test]
    fn end_is_idempotent_and_reemits() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        election.end(&ADMIN).unwrap();
        assert_eq!(election.end(&ADMIN), Ok(()));
        assert_eq!(election.phase(), Phase::Ended);

        let ended = election
            .sink()
            .iter()
            .filter(|event| **event == ElectionEvent::ElectionEnded)
            .count();
        assert_eq!(ended, 2);
    }

    #[test]
    fn end_before_start_closes_registration() {
        let mut election = election();
        election.register(&ADMIN, "Candidate 1").unwrap();
        election.end(&ADMIN).unwrap();
        assert_eq!(election.phase(), Phase::Ended);
        assert!(matches!(
            election.register(&ADMIN, "Candidate 2"),
            Err(ElectionError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn votes_are_recorded_and_announced() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        election.cast_vote(&U1, 0).unwrap();
        election.cast_vote(&U2, 1).unwrap();

        assert_eq!(election.candidate_count(), 2);
        assert!(election.has_voted(&U1));
        assert!(election.has_voted(&U2));
        assert!(!election.has_voted(&U3));
        assert_eq!(election.total_votes(), 2);
        assert_eq!(
            election.sink().last(),
            Some(&ElectionEvent::VoteCast {
                voter: U2,
                candidate: 1
            })
        );
    }

    #[test]
    fn voting_requires_an_active_election() {
        let mut election = election();
        election.register(&ADMIN, "Candidate 1").unwrap();
        election.register(&ADMIN, "Candidate 2").unwrap();
        assert!(matches!(
            election.cast_vote(&U1, 0),
            Err(ElectionError::InvalidPhase {
                phase: Phase::NotStarted,
                ..
            })
        ));

        election.start(&ADMIN).unwrap();
        election.end(&ADMIN).unwrap();
        assert!(matches!(
            election.cast_vote(&U1, 0),
            Err(ElectionError::InvalidPhase {
                phase: Phase::Ended,
                ..
            })
        ));
        assert!(!election.has_voted(&U1));
        assert_eq!(election.total_votes(), 0);
    }

    #[test]
    fn vote_for_unknown_candidate_is_rejected() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        assert_eq!(
            election.cast_vote(&U1, 2),
            Err(ElectionError::InvalidCandidate { index: 2, count: 2 })
        );
        assert!(!election.has_voted(&U1));
    }

    #[test]
    fn second_vote_is_rejected_whatever_the_choice() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        election.cast_vote(&U1, 0).unwrap();
        assert_eq!(election.cast_vote(&U1, 0), Err(ElectionError::DuplicateVote));
        assert_eq!(election.cast_vote(&U1, 1), Err(ElectionError::DuplicateVote));
        assert_eq!(election.total_votes(), 1);
        assert_eq!(election.candidate(1).unwrap().vote_count, 0);
    }

    #[test]
    fn admin_may_vote_too() {
        let mut election = active_with(&["Candidate 1", "Candidate 2"]);
        election.cast_vote(&ADMIN, 1).unwrap();
        assert!(election.has_voted(&ADMIN));
    }

    #[test]
    fn every_vote_adds_exactly_one() {
        let mut election = active_with(&["Candidate 1", "Candidate 2", "Candidate 3"]);
        for (n, (voter, choice)) in [(U1, 2), (U2, 2), (U3, 0)].into_iter().enumerate() {
            election.cast_vote(&voter, choice).unwrap();
            assert_eq!(election.total_votes(), n as u64 + 1);
        }
    }

    #[test]
    fn three_way_tie_reports_33_percent_each() {
        let election = tallied(&[1, 1, 1]);
        let percentages = (0..3)
            .map(|i| election.candidate_stats(i).unwrap().percentage)
            .collect::<Vec<_>>();
        assert_eq!(percentages, vec![33, 33, 33]);
        assert_eq!(
            election.candidate_stats(2).unwrap(),
            CandidateStats {
                index: 2,
                name: "Candidate 3".to_string(),
                vote_count: 1,
                percentage: 33,
            }
        );
        assert_eq!(election.current_winner().unwrap().index, 0);
    }

    #[test]
    fn percentages_never_exceed_100() {
        let cases: [&[u64]; 5] = [&[1, 2], &[3, 3, 1], &[5, 0, 2], &[1, 1, 1, 1], &[7]];
        for votes in cases {
            let election = tallied(votes);
            let sum: u64 = election.standings().iter().map(|s| s.percentage).sum();
            assert!(sum <= 100, "{votes:?} summed to {sum}");
        }
        let sum: u64 = tallied(&[1, 1, 2])
            .standings()
            .iter()
            .map(|s| s.percentage)
            .sum();
        assert_eq!(sum, 100);
    }

    #[test]
    fn stats_are_available_before_any_vote() {
        let mut election = election();
        election.register(&ADMIN, "Candidate 1").unwrap();
        let stats = election.candidate_stats(0).unwrap();
        assert_eq!(stats.vote_count, 0);
        assert_eq!(stats.percentage, 0);
        assert_eq!(
            election.candidate_stats(1),
            Err(ElectionError::InvalidCandidate { index: 1, count: 1 })
        );
    }

    #[test]
    fn unique_maximum_wins() {
        let winner = tallied(&[1, 2, 1]).current_winner().unwrap();
        assert_eq!(
            winner,
            Winner {
                index: 1,
                name: "Candidate 2".to_string(),
                vote_count: 2,
            }
        );
    }

    #[test]
    fn earliest_candidate_wins_ties() {
        assert_eq!(tallied(&[2, 2, 1]).current_winner().unwrap().index, 0);
        assert_eq!(tallied(&[0, 3, 3]).current_winner().unwrap().index, 1);
    }

    #[test]
    fn no_winner_without_votes() {
        assert_eq!(election().current_winner(), Err(ElectionError::NoVotesCast));
        assert_eq!(
            active_with(&["Candidate 1", "Candidate 2"]).current_winner(),
            Err(ElectionError::NoVotesCast)
        );
    }

    #[test]
    fn winner_survives_end_of_election() {
        let mut election = tallied(&[1, 0]);
        election.end(&ADMIN).unwrap();
        assert_eq!(election.current_winner().unwrap().name, "Candidate 1");
    }
}

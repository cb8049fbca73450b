use serde::{Deserialize, Serialize};

use crate::model::election::CandidateIndex;

/// A ballot the caller wishes to cast for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSpec {
    pub candidate: CandidateIndex,
}

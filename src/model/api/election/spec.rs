use serde::{Deserialize, Serialize};

use crate::model::election::CandidateIndex;

/// A candidate the administrator wishes to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
}

/// The index assigned to a newly registered candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCandidate {
    pub index: CandidateIndex,
}

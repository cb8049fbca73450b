mod desc;
mod spec;

pub use desc::ElectionSummary;
pub use spec::{CandidateSpec, RegisteredCandidate};

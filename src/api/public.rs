use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::election::ElectionSummary,
    audit::AuditEntry,
    election::{CandidateIndex, CandidateStats, Winner},
    identity::Identity,
    store::ElectionDump,
};
use crate::SharedElection;

pub fn routes() -> Vec<Route> {
    routes![
        election_summary,
        candidate_count,
        candidates,
        candidate_stats,
        winner,
        has_voted,
        events,
        dump,
    ]
}

#[get("/election")]
pub async fn election_summary(election: &State<SharedElection>) -> Json<ElectionSummary> {
    Json((&*election.read().await).into())
}

#[get("/candidates/count")]
pub async fn candidate_count(election: &State<SharedElection>) -> Json<usize> {
    Json(election.read().await.candidate_count())
}

/// Statistics for every candidate, in registration order.
#[get("/candidates")]
pub async fn candidates(election: &State<SharedElection>) -> Json<Vec<CandidateStats>> {
    Json(election.read().await.standings())
}

#[get("/candidates/<index>")]
pub async fn candidate_stats(
    index: CandidateIndex,
    election: &State<SharedElection>,
) -> Result<Json<CandidateStats>> {
    let stats = election.read().await.candidate_stats(index)?;
    Ok(Json(stats))
}

#[get("/winner")]
pub async fn winner(election: &State<SharedElection>) -> Result<Json<Winner>> {
    let winner = election.read().await.current_winner()?;
    Ok(Json(winner))
}

#[get("/voters/<identity>/voted")]
pub async fn has_voted(identity: Identity, election: &State<SharedElection>) -> Json<bool> {
    Json(election.read().await.has_voted(&identity))
}

/// The audit log, optionally starting from a given sequence number.
#[get("/events?<since>")]
pub async fn events(
    since: Option<u64>,
    election: &State<SharedElection>,
) -> Json<Vec<AuditEntry>> {
    let election = election.read().await;
    Json(election.sink().since(since.unwrap_or(0)).to_vec())
}

/// Everything needed to independently verify the election.
#[get("/dump")]
pub async fn dump(election: &State<SharedElection>) -> Json<ElectionDump> {
    Json(ElectionDump::capture(&*election.read().await))
}

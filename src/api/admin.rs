use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{
            auth::AuthToken,
            election::{CandidateSpec, RegisteredCandidate},
        },
        store::SnapshotStore,
    },
    SharedElection,
};

pub fn routes() -> Vec<Route> {
    routes![register_candidate, start_election, end_election]
}

#[post("/candidates", data = "<spec>", format = "json")]
pub async fn register_candidate(
    token: AuthToken,
    spec: Json<CandidateSpec>,
    election: &State<SharedElection>,
    store: &State<SnapshotStore>,
) -> Result<Json<RegisteredCandidate>> {
    let index = store
        .apply(election, |election| election.register(token.id(), spec.0.name))
        .await?;
    Ok(Json(RegisteredCandidate { index }))
}

#[post("/election/start")]
pub async fn start_election(
    token: AuthToken,
    election: &State<SharedElection>,
    store: &State<SnapshotStore>,
) -> Result<()> {
    store
        .apply(election, |election| election.start(token.id()))
        .await
}

#[post("/election/end")]
pub async fn end_election(
    token: AuthToken,
    election: &State<SharedElection>,
    store: &State<SnapshotStore>,
) -> Result<()> {
    store
        .apply(election, |election| election.end(token.id()))
        .await
}

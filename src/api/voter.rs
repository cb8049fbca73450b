use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        api::{auth::AuthToken, ballot::BallotSpec},
        store::SnapshotStore,
    },
    SharedElection,
};

pub fn routes() -> Vec<Route> {
    routes![cast_vote]
}

#[post("/votes", data = "<ballot>", format = "json")]
pub async fn cast_vote(
    token: AuthToken,
    ballot: Json<BallotSpec>,
    election: &State<SharedElection>,
    store: &State<SnapshotStore>,
) -> Result<()> {
    store
        .apply(election, |election| {
            election.cast_vote(token.id(), ballot.candidate)
        })
        .await
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::api::test_support::{open_election, persisting_client, temp_dir, vote_as};
    use crate::model::{audit::AuditEntry, election::CandidateStats};

    use super::*;

    async fn has_voted(client: &Client, identity: &str) -> bool {
        client
            .get(format!("/voters/{identity}/voted"))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap()
    }

    async fn standings(client: &Client) -> Vec<CandidateStats> {
        client
            .get(uri!(crate::api::public::candidates))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap()
    }

    #[backend_test(voter)]
    async fn no_votes_before_start(client: Client) {
        let response = client
            .post(uri!(cast_vote))
            .header(ContentType::JSON)
            .body(json!(BallotSpec { candidate: 0 }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        assert!(!has_voted(&client, "user1").await);
    }

    #[backend_test]
    async fn voting_requires_sign_in(client: Client) {
        open_election(&client, 2).await;
        client.delete(uri!(crate::api::auth::logout)).dispatch().await;

        let response = client
            .post(uri!(cast_vote))
            .header(ContentType::JSON)
            .body(json!(BallotSpec { candidate: 0 }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn two_voters_two_candidates(client: Client) {
        open_election(&client, 2).await;

        assert_eq!(vote_as(&client, "user1", 0).await, Status::Ok);
        assert_eq!(vote_as(&client, "user2", 1).await, Status::Ok);

        let response = client
            .get(uri!(crate::api::public::candidate_count))
            .dispatch()
            .await;
        assert_eq!(response.into_json::<usize>().await, Some(2));

        assert!(has_voted(&client, "user1").await);
        assert!(has_voted(&client, "user2").await);
        assert!(!has_voted(&client, "user3").await);
    }

    #[backend_test]
    async fn second_vote_is_rejected(client: Client) {
        open_election(&client, 2).await;

        assert_eq!(vote_as(&client, "user1", 0).await, Status::Ok);
        assert_eq!(vote_as(&client, "user1", 1).await, Status::Conflict);

        let counts = standings(&client)
            .await
            .into_iter()
            .map(|stats| stats.vote_count)
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![1, 0]);
    }

    #[backend_test]
    async fn unknown_candidate_is_rejected(client: Client) {
        open_election(&client, 2).await;

        assert_eq!(vote_as(&client, "user1", 2).await, Status::NotFound);
        assert!(!has_voted(&client, "user1").await);

        // The failed attempt does not use up the vote.
        assert_eq!(vote_as(&client, "user1", 1).await, Status::Ok);
    }

    #[rocket::async_test]
    async fn failed_save_does_not_record_vote() {
        let dir = temp_dir("tally-votes");
        let client = persisting_client(&dir).await;
        open_election(&client, 2).await;

        // Saving fails from here on.
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(
            vote_as(&client, "user1", 0).await,
            Status::InternalServerError
        );

        assert!(!has_voted(&client, "user1").await);
        let counts = standings(&client)
            .await
            .into_iter()
            .map(|stats| stats.vote_count)
            .collect::<Vec<_>>();
        assert_eq!(counts, vec![0, 0]);
        let events: Vec<AuditEntry> = client
            .get(uri!(crate::api::public::events(_)))
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        assert_eq!(events.len(), 2);

        // Once saving works again, the same participant can still vote.
        std::fs::create_dir(&dir).unwrap();
        assert_eq!(vote_as(&client, "user1", 0).await, Status::Ok);
        assert!(has_voted(&client, "user1").await);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}

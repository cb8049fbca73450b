use std::path::PathBuf;

use chrono::Duration;
use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::sync::RwLock,
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    api::admin::{AdminAccount, AdminCredentials},
    audit::AuditLog,
    store::SnapshotStore,
    verification::verify_election,
    HostedElection,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the hosted election.
#[derive(Deserialize)]
struct ElectionConfig {
    // non-secrets
    admin_username: String,
    snapshot_path: Option<PathBuf>,
    // secrets
    admin_password: String,
}

/// A fairing that sets up the administrator account, restores the election
/// from its snapshot (or creates a fresh one), and places the
/// [`AdminAccount`], [`crate::SharedElection`] and [`SnapshotStore`] into
/// managed state.
pub struct ElectionFairing;

#[rocket::async_trait]
impl Fairing for ElectionFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<ElectionConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load election config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.admin_username.is_empty() {
            error!("`admin_username` must not be empty");
            return Err(rocket);
        }

        // Hash the admin password; the plaintext is dropped here.
        let credentials = AdminCredentials {
            username: config.admin_username,
            password: config.admin_password,
        };
        let admin = match AdminAccount::try_from(credentials) {
            Ok(admin) => admin,
            Err(e) => {
                error!("Failed to hash admin password: {e}");
                return Err(rocket);
            }
        };

        // Restore the previous election, if any.
        let store = SnapshotStore::new(config.snapshot_path);
        let election = match store.load().await {
            Ok(Some(dump)) => match dump.into_election() {
                Ok(election) if election.admin() != admin.identity() => {
                    error!(
                        "Snapshot is administered by {}, but the configured admin is {}",
                        election.admin(),
                        admin.identity()
                    );
                    return Err(rocket);
                }
                Ok(election) => {
                    if let Err(e) = verify_election(&election) {
                        error!("Snapshot does not match its audit log: {e}");
                        return Err(rocket);
                    }
                    info!(
                        "Restored {} election with {} candidates and {} votes",
                        election.phase(),
                        election.candidate_count(),
                        election.total_votes()
                    );
                    election
                }
                Err(e) => {
                    error!("Snapshot is corrupt: {e}");
                    return Err(rocket);
                }
            },
            Ok(None) => {
                info!("No snapshot found, starting a fresh election");
                HostedElection::new(admin.identity().clone(), AuditLog::new())
            }
            Err(e) => {
                error!("Failed to load snapshot: {e}");
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket
            .manage(admin)
            .manage(RwLock::new(election))
            .manage(store);
        Ok(rocket)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use rocket::serde::json::serde_json;

    use crate::model::{identity::Identity, store::ElectionDump};
    use crate::SharedElection;

    use super::*;

    fn running_dump(admin: &str) -> ElectionDump {
        let admin = Identity::new(admin);
        let mut election = HostedElection::new(admin.clone(), AuditLog::new());
        election.register(&admin, "Candidate 1").unwrap();
        election.register(&admin, "Candidate 2").unwrap();
        election.start(&admin).unwrap();
        election.cast_vote(&Identity::new("user1"), 1).unwrap();
        ElectionDump::capture(&election)
    }

    fn write_dump(name: &str, dump: &ElectionDump) -> PathBuf {
        log4rs_test_utils::test_logging::init_logging_once_for(["tally_backend"], None, None);
        let random: u32 = rand::random();
        let path = std::env::temp_dir().join(format!("{name}-{random}.json"));
        std::fs::write(&path, serde_json::to_vec(dump).unwrap()).unwrap();
        path
    }

    async fn ignites(path: &Path) -> bool {
        crate::test_rocket_persisting_to(Some(path))
            .ignite()
            .await
            .is_ok()
    }

    #[rocket::async_test]
    async fn restart_resumes_election() {
        let path = write_dump("tally-resume", &running_dump("coordinator"));

        let rocket = crate::test_rocket_persisting_to(Some(&path))
            .ignite()
            .await
            .unwrap();
        let election = rocket.state::<SharedElection>().unwrap().read().await;
        assert!(election.is_active());
        assert_eq!(election.total_votes(), 1);
        assert!(election.has_voted(&Identity::new("user1")));
        assert_eq!(election.sink().entries().len(), 3);

        std::fs::remove_file(path).unwrap();
    }

    #[rocket::async_test]
    async fn gapped_audit_log_is_refused() {
        let mut dump = running_dump("coordinator");
        dump.audit_log.remove(1);
        let path = write_dump("tally-gapped", &dump);

        assert!(!ignites(&path).await);

        std::fs::remove_file(path).unwrap();
    }

    #[rocket::async_test]
    async fn audit_log_must_match_tallies() {
        let mut dump = running_dump("coordinator");
        dump.election.candidates[0].vote_count += 1;
        dump.election.candidates[1].vote_count -= 1;
        let path = write_dump("tally-tampered", &dump);

        assert!(!ignites(&path).await);

        std::fs::remove_file(path).unwrap();
    }

    #[rocket::async_test]
    async fn snapshot_for_another_admin_is_refused() {
        let path = write_dump("tally-admin", &running_dump("someone-else"));

        assert!(!ignites(&path).await);

        std::fs::remove_file(path).unwrap();
    }
}

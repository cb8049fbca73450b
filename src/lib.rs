#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{tokio::sync::RwLock, Build, Rocket};

use crate::config::{ConfigFairing, ElectionFairing};
use crate::logging::LoggerFairing;
use crate::model::HostedElection;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// The one hosted election. Mutating routes hold the write lock for the
/// whole operation, including persistence.
pub type SharedElection = RwLock<HostedElection>;

/// Assemble the server from `Rocket.toml` and `ROCKET_*` environment variables.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build())
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(ElectionFairing)
        .attach(LoggerFairing)
}

/// A server with a fixed test configuration, isolated from `Rocket.toml`
/// and with nothing persisted to disk.
#[cfg(test)]
pub(crate) fn test_rocket() -> Rocket<Build> {
    test_rocket_persisting_to(None)
}

/// As [`test_rocket`], but keeping the election at `snapshot_path`.
#[cfg(test)]
pub(crate) fn test_rocket_persisting_to(snapshot_path: Option<&std::path::Path>) -> Rocket<Build> {
    use rocket::figment::Figment;

    let mut figment = Figment::from(rocket::Config::debug_default())
        .merge(("jwt_secret", "test-jwt-secret"))
        .merge(("auth_ttl", 3600))
        .merge(("admin_username", "coordinator"))
        .merge(("admin_password", "coordinator"));
    if let Some(path) = snapshot_path {
        figment = figment.merge(("snapshot_path", path));
    }
    assemble(rocket::custom(figment))
}

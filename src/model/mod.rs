pub mod api;
pub mod audit;
pub mod election;
pub mod identity;
pub mod store;
pub mod verification;

/// The election as hosted by the server: participants are [`identity::Identity`]s
/// and every event lands in the [`audit::AuditLog`].
pub type HostedElection = election::Election<identity::Identity, audit::AuditLog>;

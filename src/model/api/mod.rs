//! API-compatible types: request bodies and response payloads of the HTTP layer.

pub mod admin;
pub mod auth;
pub mod ballot;
pub mod election;

mod request;
mod token;

pub use request::VoterLogin;
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};

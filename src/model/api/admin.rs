use argon2::{Config, Error as Argon2Error};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::identity::Identity;

/// Raw admin credentials, received from the configuration or a sign-in request.
/// These are never stored directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// The election administrator, as held in managed state.
#[derive(Debug, PartialEq, Eq)]
pub struct AdminAccount {
    identity: Identity,
    password_hash: String,
}

impl AdminAccount {
    /// The identity the election recognises as its administrator.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Check whether the given credentials belong to this admin.
    pub fn verify(&self, credentials: &AdminCredentials) -> Result<bool, Argon2Error> {
        if credentials.username != self.identity.as_str() {
            return Ok(false);
        }
        argon2::verify_encoded(&self.password_hash, credentials.password.as_bytes())
    }
}

impl TryFrom<AdminCredentials> for AdminAccount {
    type Error = Argon2Error;

    /// Hash the password so that the plaintext can be dropped.
    fn try_from(cred: AdminCredentials) -> Result<Self, Self::Error> {
        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default())?;
        Ok(Self {
            identity: Identity::new(cred.username),
            password_hash,
        })
    }
}

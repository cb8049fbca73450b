use serde::{Deserialize, Serialize};

use crate::model::identity::Identity;

/// A participant signing in under the given identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoterLogin {
    pub identity: Identity,
}

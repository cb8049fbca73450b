use std::io::ErrorKind;
use std::path::PathBuf;

use rocket::{serde::json::serde_json, tokio::fs};
use serde::{Deserialize, Serialize};

use log::info;

use crate::error::Result;
use crate::model::{
    audit::{AuditEntry, AuditLog},
    election::{self, ElectionSnapshot, SnapshotError},
    HostedElection,
};
use crate::SharedElection;

/// The complete persisted state: the election plus its audit history.
/// This is also what `GET /dump` returns and what the verification tool reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDump {
    pub election: ElectionSnapshot<crate::model::identity::Identity>,
    pub audit_log: Vec<AuditEntry>,
}

impl ElectionDump {
    pub fn capture(election: &HostedElection) -> Self {
        Self {
            election: election.snapshot(),
            audit_log: election.sink().entries().to_vec(),
        }
    }

    /// Rebuild the hosted election, re-checking its invariants.
    pub fn into_election(self) -> std::result::Result<HostedElection, SnapshotError> {
        HostedElection::restore(self.election, AuditLog::from_entries(self.audit_log))
    }
}

/// Writes the election to a JSON file after every accepted mutation, and reads
/// it back on launch. Without a path, nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    path: Option<PathBuf>,
}

impl SnapshotStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Load the last saved dump, if there is one.
    pub async fn load(&self) -> Result<Option<ElectionDump>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Run `operation` against a copy of the shared election, persist the copy,
    /// and only then make it current. A refused operation or a failed save
    /// leaves the shared election untouched.
    pub async fn apply<T>(
        &self,
        shared: &SharedElection,
        operation: impl FnOnce(&mut HostedElection) -> election::Result<T>,
    ) -> Result<T> {
        let mut current = shared.write().await;
        let mut staged = current.clone();
        let committed = staged.sink().entries().len();

        let output = operation(&mut staged)?;
        self.save(&staged).await?;

        for entry in &staged.sink().entries()[committed..] {
            info!("Audit {entry}");
        }
        *current = staged;
        Ok(output)
    }

    /// Persist the current state of `election`.
    /// The file is replaced atomically, so a crash never leaves a torn snapshot behind.
    pub async fn save(&self, election: &HostedElection) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(&ElectionDump::capture(election))?;
        let staging = path.with_extension("tmp");
        fs::write(&staging, bytes).await?;
        fs::rename(&staging, path).await?;
        Ok(())
    }
}

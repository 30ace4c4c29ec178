//! JSON-file account store.
//!
//! The file holds a single `{"accounts": [...]}` document. Every query re-reads
//! the file and every mutation rewrites it through a temp file + rename, so the
//! store never serves a stale in-memory copy and never leaves a half-written file.
//! There is no file locking: one workflow owns the file at a time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use mailrotor_core::{AccountRecord, AccountStats, Clock, StoreError, SystemClock};

mod atomic;
pub mod export;

pub use atomic::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<AccountRecord>,
}

#[derive(Clone)]
pub struct AccountStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty accounts file if none exists yet.
    pub fn init(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        self.try_save(&[])?;
        info!(path = %self.path.display(), "created accounts file");
        Ok(())
    }

    /// All records in store order. A missing file is an empty store.
    pub fn try_load(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let file: Option<AccountsFile> = read_json(&self.path)?;
        Ok(file.map(|f| f.accounts).unwrap_or_default())
    }

    /// All records in store order; read failures degrade to an empty list.
    pub fn load(&self) -> Vec<AccountRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "failed to read accounts file");
                Vec::new()
            }
        }
    }

    /// Overwrite the file with `records`. Identifiers must be unique; a list
    /// with a repeated email is rejected before anything is written.
    pub fn try_save(&self, records: &[AccountRecord]) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        if let Some(dup) = records.iter().find(|r| !seen.insert(r.email.as_str())) {
            return Err(StoreError::Duplicate(dup.email.clone()));
        }

        let doc = AccountsFile {
            accounts: records.to_vec(),
        };
        write_json_atomic(&self.path, &doc)
    }

    /// Overwrite the file with `records`. Returns false if the write failed.
    pub fn save(&self, records: &[AccountRecord]) -> bool {
        match self.try_save(records) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to save accounts file");
                false
            }
        }
    }

    /// Append a new unused record, rejecting an identifier that already exists.
    ///
    /// Reads with [`try_load`](Self::try_load) so an unreadable file is reported
    /// instead of being replaced by a store holding only the new record.
    pub fn insert(
        &self,
        email: &str,
        password: &str,
        token: &str,
        usage_limit: &str,
    ) -> Result<AccountRecord, StoreError> {
        let mut records = self.try_load()?;

        if records.iter().any(|acc| acc.email == email) {
            return Err(StoreError::Duplicate(email.to_string()));
        }

        let record = AccountRecord::new(email, password, token, usage_limit, self.clock.now());
        records.push(record.clone());
        self.try_save(&records)?;

        Ok(record)
    }

    pub fn add(&self, email: &str, password: &str, token: &str, usage_limit: &str) -> bool {
        match self.insert(email, password, token, usage_limit) {
            Ok(_) => {
                info!(email, "account added");
                true
            }
            Err(StoreError::Duplicate(_)) => {
                warn!(email, "account already exists");
                false
            }
            Err(e) => {
                error!(email, error = %e, "failed to add account");
                false
            }
        }
    }

    pub fn try_mark_used(&self, email: &str) -> Result<AccountRecord, StoreError> {
        let mut records = self.try_load()?;

        let now = self.clock.now();
        let record = records
            .iter_mut()
            .find(|acc| acc.email == email)
            .ok_or_else(|| StoreError::NotFound(email.to_string()))?;
        record.mark_used(now);
        let updated = record.clone();

        self.try_save(&records)?;
        Ok(updated)
    }

    /// Flag an account as used now. False if it is absent or the write failed.
    pub fn mark_used(&self, email: &str) -> bool {
        match self.try_mark_used(email) {
            Ok(_) => true,
            Err(StoreError::NotFound(_)) => {
                warn!(email, "cannot mark unknown account as used");
                false
            }
            Err(e) => {
                error!(email, error = %e, "failed to mark account as used");
                false
            }
        }
    }

    pub fn find(&self, email: &str) -> Option<AccountRecord> {
        self.load().into_iter().find(|acc| acc.email == email)
    }

    pub fn stats(&self) -> AccountStats {
        AccountStats::from_records(&self.load())
    }

    /// Write the flat text export to `path`.
    pub fn export_text(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let text = export::render(&self.load());

        match std::fs::write(path, text) {
            Ok(()) => {
                info!(path = %path.display(), "accounts exported");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to export accounts");
                false
            }
        }
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use mailrotor_core::{local_time, Clock, StoreError, SystemClock};
use mailrotor_storage::{read_json, write_json_atomic};

use crate::{AuthStore, DeviceReset};

/// Contents of the active-session file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSession {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default, with = "local_time::option")]
    pub updated_time: Option<NaiveDateTime>,
}

/// Active session kept in a JSON file owned by this tool.
///
/// Serves as both the auth store and the device reset collaborator for
/// rotation from the command line.
#[derive(Clone)]
pub struct FileSession {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileSession {
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

    pub fn load(&self) -> Result<ActiveSession, StoreError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn modify<F>(&self, change: F) -> Result<ActiveSession, StoreError>
    where
        F: FnOnce(&mut ActiveSession),
    {
        let mut session = self.load()?;
        change(&mut session);
        session.updated_time = Some(self.clock.now());
        write_json_atomic(&self.path, &session)?;
        Ok(session)
    }
}

#[async_trait]
impl AuthStore for FileSession {
    async fn update(&self, identifier: &str, credential: &str) -> anyhow::Result<()> {
        self.modify(|s| {
            s.identifier = Some(identifier.to_string());
            s.credential = Some(credential.to_string());
        })?;
        info!(path = %self.path.display(), identifier, "session credential updated");
        Ok(())
    }
}

#[async_trait]
impl DeviceReset for FileSession {
    async fn reset(&self) -> anyhow::Result<()> {
        let session = self.modify(|s| s.device_id = Some(Uuid::new_v4().to_string()))?;
        info!(device_id = session.device_id.as_deref().unwrap_or_default(), "device identifier regenerated");
        Ok(())
    }
}

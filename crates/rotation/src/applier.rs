use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use mailrotor_core::AccountRecord;
use mailrotor_storage::AccountStore;

use crate::{AuthStore, DeviceReset};

#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("failed to update credential for {identifier}: {source}")]
    AuthUpdate {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to reset device identifier: {0}")]
    DeviceReset(#[source] anyhow::Error),
}

/// Puts an account into active use.
///
/// Credential push and device reset are hard requirements; the "used"
/// bookkeeping afterwards is best effort.
pub struct ActivationApplier {
    auth: Arc<dyn AuthStore>,
    device: Arc<dyn DeviceReset>,
    store: AccountStore,
}

impl ActivationApplier {
    pub fn new(auth: Arc<dyn AuthStore>, device: Arc<dyn DeviceReset>, store: AccountStore) -> Self {
        Self { auth, device, store }
    }

    /// Apply `account`, returning whether the bookkeeping write also succeeded.
    ///
    /// On error the account is left untouched in the store, so it stays
    /// available for the next rotation.
    pub async fn try_apply(&self, account: &AccountRecord) -> Result<bool, ActivationError> {
        info!(email = %account.email, "updating active credential");
        self.auth
            .update(&account.email, &account.token)
            .await
            .map_err(|source| ActivationError::AuthUpdate {
                identifier: account.email.clone(),
                source,
            })?;

        info!("resetting device identifier");
        self.device.reset().await.map_err(ActivationError::DeviceReset)?;

        // The credential is live at this point; a failed write only leaves the
        // store believing the account is still unused.
        let marked = self.store.mark_used(&account.email);
        if marked {
            info!(email = %account.email, "account marked as used");
        } else {
            warn!(email = %account.email, "account is active but could not be marked as used");
        }
        Ok(marked)
    }

    pub async fn apply(&self, account: &AccountRecord) -> bool {
        match self.try_apply(account).await {
            Ok(_) => true,
            Err(e) => {
                warn!(email = %account.email, error = %e, "activation aborted");
                false
            }
        }
    }
}

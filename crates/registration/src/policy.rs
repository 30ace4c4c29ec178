use tracing::{info, warn};

use mailrotor_core::{AccountRecord, Clock, SystemClock};
use mailrotor_rotation::ActivationApplier;
use mailrotor_storage::AccountStore;

use crate::types::RegisteredAccount;
use crate::{Registrar, RegistrationError};

/// What happens to a freshly registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    pub persist: bool,
    pub activate: bool,
}

impl RegistrationPolicy {
    /// Save only; used for batch runs
    pub fn batch() -> Self {
        Self {
            persist: true,
            activate: false,
        }
    }

    /// Save, then switch the active session over to the new account
    pub fn single() -> Self {
        Self {
            persist: true,
            activate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleRegistration {
    pub account: RegisteredAccount,
    pub persisted: bool,
    pub activated: bool,
}

/// Register one account and complete it according to `policy`.
///
/// Only the registration itself can fail; persistence and activation
/// problems are logged and reported in the returned flags.
pub async fn register_once(
    registrar: &dyn Registrar,
    store: &AccountStore,
    applier: Option<&ActivationApplier>,
    policy: RegistrationPolicy,
) -> Result<SingleRegistration, RegistrationError> {
    let account = registrar.register_account().await?;

    let persisted = policy.persist
        && store.add(&account.email, &account.password, &account.token, &account.usage_limit);

    let activated = match (policy.activate, applier) {
        (false, _) => false,
        (true, None) => {
            warn!(email = %account.email, "activation requested but no session is configured");
            false
        }
        (true, Some(applier)) => {
            // Always the fresh credential; a stored record under the same
            // address may carry an older token.
            let record = AccountRecord::new(
                &account.email,
                &account.password,
                &account.token,
                &account.usage_limit,
                SystemClock.now(),
            );
            applier.apply(&record).await
        }
    };

    info!(email = %account.email, persisted, activated, "registration complete");
    Ok(SingleRegistration {
        account,
        persisted,
        activated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedRegistrar, Step};
    use async_trait::async_trait;
    use mailrotor_rotation::{AuthStore, DeviceReset, FileSession};
    use std::sync::Arc;

    struct BrokenSession;

    #[async_trait]
    impl AuthStore for BrokenSession {
        async fn update(&self, _identifier: &str, _credential: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only session")
        }
    }

    #[async_trait]
    impl DeviceReset for BrokenSession {
        async fn reset(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_single_policy_persists_and_activates() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("accounts.json"));
        let session = Arc::new(FileSession::new(dir.path().join("session.json")));
        let applier = ActivationApplier::new(session.clone(), session.clone(), store.clone());
        let registrar = ScriptedRegistrar::new(vec![Step::Succeed("new@mail.test")]);

        let outcome = register_once(&registrar, &store, Some(&applier), RegistrationPolicy::single())
            .await
            .unwrap();

        assert!(outcome.persisted);
        assert!(outcome.activated);
        assert!(store.find("new@mail.test").unwrap().is_used());
        let active = session.load().unwrap();
        assert_eq!(active.identifier.as_deref(), Some("new@mail.test"));
        assert_eq!(active.credential.as_deref(), Some("tok-new@mail.test"));
    }

    #[tokio::test]
    async fn test_duplicate_address_activates_fresh_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("accounts.json"));
        store.add("new@mail.test", "old-secret", "OLD-TOKEN", "10");
        let session = Arc::new(FileSession::new(dir.path().join("session.json")));
        let applier = ActivationApplier::new(session.clone(), session.clone(), store.clone());
        let registrar = ScriptedRegistrar::new(vec![Step::Succeed("new@mail.test")]);

        let outcome = register_once(&registrar, &store, Some(&applier), RegistrationPolicy::single())
            .await
            .unwrap();

        assert!(!outcome.persisted);
        assert!(outcome.activated);
        let active = session.load().unwrap();
        assert_eq!(active.credential.as_deref(), Some("tok-new@mail.test"));
        assert_eq!(store.find("new@mail.test").unwrap().token, "OLD-TOKEN");
    }

    #[tokio::test]
    async fn test_batch_policy_only_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("accounts.json"));
        let registrar = ScriptedRegistrar::new(vec![Step::Succeed("new@mail.test")]);

        let outcome = register_once(&registrar, &store, None, RegistrationPolicy::batch())
            .await
            .unwrap();

        assert!(outcome.persisted);
        assert!(!outcome.activated);
        assert!(!store.find("new@mail.test").unwrap().is_used());
    }

    #[tokio::test]
    async fn test_activation_failure_keeps_saved_account_unused() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("accounts.json"));
        let session = Arc::new(BrokenSession);
        let applier = ActivationApplier::new(session.clone(), session, store.clone());
        let registrar = ScriptedRegistrar::new(vec![Step::Succeed("new@mail.test")]);

        let outcome = register_once(&registrar, &store, Some(&applier), RegistrationPolicy::single())
            .await
            .unwrap();

        assert!(outcome.persisted);
        assert!(!outcome.activated);
        assert!(!store.find("new@mail.test").unwrap().is_used());
    }

    #[tokio::test]
    async fn test_registration_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::new(dir.path().join("accounts.json"));
        let registrar = ScriptedRegistrar::new(vec![Step::Fail]);

        let err = register_once(&registrar, &store, None, RegistrationPolicy::single())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::VerificationTimeout { .. }));
        assert_eq!(store.stats().total, 0);
    }
}

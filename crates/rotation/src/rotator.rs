use tracing::{info, warn};

use mailrotor_core::{AccountRecord, AccountStats};
use mailrotor_storage::AccountStore;

use crate::applier::ActivationApplier;
use crate::selector::{self, Selection};

/// What a rotation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The selected account is now active
    Applied {
        account: AccountRecord,
        selection: Selection,
    },
    /// An account was selected but applying it failed
    ApplyFailed { account: AccountRecord },
    /// Nothing to apply
    NoAccount(Selection),
}

impl RotationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RotationOutcome::Applied { .. })
    }
}

/// Picks the next account from the store and applies it.
pub struct AccountRotator {
    store: AccountStore,
    applier: ActivationApplier,
}

impl AccountRotator {
    pub fn new(store: AccountStore, applier: ActivationApplier) -> Self {
        Self { store, applier }
    }

    pub fn stats(&self) -> AccountStats {
        self.store.stats()
    }

    /// Selection that [`rotate`](Self::rotate) would act on, without applying it.
    pub fn preview(&self, current: Option<&str>) -> Selection {
        selector::select_from(&self.store.load(), current)
    }

    pub async fn rotate(&self) -> RotationOutcome {
        self.rotate_from(None).await
    }

    /// Rotate, continuing after `current` when given.
    pub async fn rotate_from(&self, current: Option<&str>) -> RotationOutcome {
        let stats = self.store.stats();
        info!(total = stats.total, used = stats.used, unused = stats.unused, "account stats");

        let selection = self.preview(current);
        match &selection {
            Selection::Unused(acc) => info!(email = %acc.email, "using unused account"),
            Selection::Next { current, next } => {
                info!(current = %current.email, next = %next.email, "moving to next account")
            }
            Selection::ColdStart(acc) => {
                info!(email = %acc.email, "no usage history, starting from first account")
            }
            Selection::Exhausted { current } => {
                warn!(current = %current.email, "no more accounts after the current one")
            }
            Selection::UnknownCurrent(email) => warn!(email, "current account not in store"),
            Selection::Empty => warn!("no accounts in store"),
        }

        let Some(account) = selection.account().cloned() else {
            return RotationOutcome::NoAccount(selection);
        };

        if self.applier.apply(&account).await {
            RotationOutcome::Applied { account, selection }
        } else {
            RotationOutcome::ApplyFailed { account }
        }
    }
}

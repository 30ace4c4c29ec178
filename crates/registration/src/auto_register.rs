use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use mailrotor_core::{BatchConfig, StoreError};
use mailrotor_storage::AccountStore;

use crate::Registrar;

/// Statistics for a batch registration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
    /// Registered, but the store already had the address
    pub duplicates: usize,
    /// Registered, but the store write failed
    pub persist_failures: usize,
}

impl BatchStats {
    pub fn any_succeeded(&self) -> bool {
        self.successful > 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.requested == 0 {
            0.0
        } else {
            (self.successful as f64 / self.requested as f64) * 100.0
        }
    }
}

/// Registers accounts one after another and persists each success right away.
pub struct BatchRegister {
    registrar: Arc<dyn Registrar>,
    store: AccountStore,
    count: usize,
    cooldown: Duration,
}

impl BatchRegister {
    pub fn new(registrar: Arc<dyn Registrar>, store: AccountStore, config: &BatchConfig) -> Self {
        Self {
            registrar,
            store,
            count: config.count,
            cooldown: config.cooldown(),
        }
    }

    /// Run the number of attempts set in `[batch] count`.
    pub async fn run_configured(&self) -> BatchStats {
        self.run(self.count).await
    }

    /// Run `count` attempts, strictly sequentially.
    ///
    /// A failed or panicking attempt is counted and the batch moves on.
    pub async fn run(&self, count: usize) -> BatchStats {
        info!("🤖 Starting batch registration of {} accounts", count);
        let mut stats = BatchStats {
            requested: count,
            ..Default::default()
        };

        for current in 1..=count {
            info!(current, total = count, "registration attempt");

            let registrar = self.registrar.clone();
            let handle = tokio::spawn(async move { registrar.register_account().await });

            match handle.await {
                Ok(Ok(account)) => {
                    stats.successful += 1;
                    match self.store.insert(&account.email, &account.password, &account.token, &account.usage_limit) {
                        Ok(_) => info!(current, email = %account.email, "✓ account registered and saved"),
                        Err(StoreError::Duplicate(email)) => {
                            warn!(current, email = %email, "account already in store");
                            stats.duplicates += 1;
                        }
                        Err(e) => {
                            error!(current, email = %account.email, error = %e, "account registered but not saved");
                            stats.persist_failures += 1;
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!(current, error = %e, "✗ registration failed");
                    stats.failed += 1;
                }
                Err(e) => {
                    error!(current, error = %e, "✗ registration attempt crashed");
                    stats.failed += 1;
                }
            }

            if current < count {
                tokio::time::sleep(self.cooldown).await;
            }
        }

        let totals = self.store.stats();
        info!("✅ Batch registration completed:");
        info!("  Requested: {}", stats.requested);
        info!("  Successful: {} ({:.1}%)", stats.successful, stats.success_rate());
        info!("  Failed: {}", stats.failed);
        if stats.duplicates + stats.persist_failures > 0 {
            info!("  Not saved: {} duplicate, {} write errors", stats.duplicates, stats.persist_failures);
        }
        info!("  Store: {} total, {} used, {} unused", totals.total, totals.used, totals.unused);

        stats
    }
}

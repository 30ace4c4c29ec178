use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::email::generate_mailbox_address;
use crate::temp_email_providers::{load_blocked, usable_domains, DomainDenylist, MailboxProvider, ProviderError};
use crate::types::Mailbox;
use crate::RegistrationError;

enum AcquireFailure {
    /// Every domain on the provider is denylisted or was rejected
    DomainsExhausted,
    Provider(ProviderError),
}

/// Creates disposable mailboxes, retrying and falling back across providers.
pub struct MailboxAcquirer {
    providers: Vec<Arc<dyn MailboxProvider>>,
    denylist: Arc<dyn DomainDenylist>,
    max_attempts: u32,
}

impl MailboxAcquirer {
    pub fn new(providers: Vec<Arc<dyn MailboxProvider>>, denylist: Arc<dyn DomainDenylist>, max_attempts: u32) -> Self {
        Self {
            providers,
            denylist,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Acquire a mailbox.
    ///
    /// Up to `max_attempts` tries on the current provider. When a provider has
    /// no usable domain left, acquisition moves to the next provider and starts
    /// counting again; this happens at most once per call.
    pub async fn acquire(&self) -> Result<Mailbox, RegistrationError> {
        let Some(first) = self.providers.first() else {
            return Err(RegistrationError::MailboxUnavailable {
                attempts: 0,
                last_error: "no mailbox providers configured".to_string(),
            });
        };

        let mut blocked = load_blocked(self.denylist.as_ref()).await;
        let mut provider = first;
        let mut switched = false;
        let mut attempt = 0;
        let mut last_error = String::new();

        while attempt < self.max_attempts {
            attempt += 1;
            match self.try_provider(provider, &mut blocked).await {
                Ok(mailbox) => {
                    info!(provider = provider.name(), address = %mailbox.address, "mailbox ready");
                    return Ok(mailbox);
                }
                Err(AcquireFailure::DomainsExhausted) => {
                    let next = self.providers.get(1).filter(|_| !switched);
                    let Some(next) = next else {
                        warn!(provider = provider.name(), "no usable mailbox domains left");
                        return Err(RegistrationError::NoUsableDomains);
                    };
                    info!(from = provider.name(), to = next.name(), "no usable domains, switching mailbox provider");
                    provider = next;
                    switched = true;
                    attempt = 0;
                }
                Err(AcquireFailure::Provider(e)) => {
                    warn!(
                        provider = provider.name(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "mailbox creation failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(RegistrationError::MailboxUnavailable {
            attempts: self.max_attempts,
            last_error,
        })
    }

    async fn try_provider(
        &self,
        provider: &Arc<dyn MailboxProvider>,
        blocked: &mut HashSet<String>,
    ) -> Result<Mailbox, AcquireFailure> {
        let domains = provider.list_domains().await.map_err(AcquireFailure::Provider)?;
        if domains.is_empty() {
            return Err(AcquireFailure::Provider(ProviderError::Transient(
                "provider returned no domains".to_string(),
            )));
        }

        let candidates = usable_domains(&domains, blocked);
        info!(
            provider = provider.name(),
            available = domains.len(),
            usable = candidates.len(),
            "filtered mailbox domains"
        );

        for domain in candidates {
            let (address, secret) = generate_mailbox_address(&domain);
            match provider.create_account(&address, &secret).await {
                Ok(()) => {}
                Err(ProviderError::Rejected(reason)) => {
                    warn!(domain = %domain, reason = %reason, "domain rejected, trying next");
                    blocked.insert(domain.to_lowercase());
                    continue;
                }
                Err(e) => return Err(AcquireFailure::Provider(e)),
            }

            let token = provider
                .get_token(&address, &secret)
                .await
                .map_err(AcquireFailure::Provider)?;

            return Ok(Mailbox {
                provider: provider.clone(),
                address,
                secret,
                token,
            });
        }

        Err(AcquireFailure::DomainsExhausted)
    }
}

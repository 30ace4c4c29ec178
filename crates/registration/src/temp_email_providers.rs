/// Disposable mailbox providers and the shared domain denylist
use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::types::{Message, MessageSummary};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Network trouble or a server-side hiccup; worth retrying
    #[error("provider request failed: {0}")]
    Transient(String),

    /// The provider refused the request, e.g. the address is taken or the domain is invalid
    #[error("provider rejected request: {0}")]
    Rejected(String),
}

/// A disposable mailbox service.
#[async_trait]
pub trait MailboxProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn list_domains(&self) -> Result<Vec<String>, ProviderError>;

    async fn create_account(&self, address: &str, secret: &str) -> Result<(), ProviderError>;

    /// Bearer token for reading the mailbox
    async fn get_token(&self, address: &str, secret: &str) -> Result<String, ProviderError>;

    async fn list_messages(&self, token: &str) -> Result<Vec<MessageSummary>, ProviderError>;

    async fn get_message(&self, token: &str, id: &str) -> Result<Message, ProviderError>;
}

/// Source of mailbox domains the target service is known to refuse.
#[async_trait]
pub trait DomainDenylist: Send + Sync {
    async fn blocked_domains(&self) -> anyhow::Result<Vec<String>>;
}

/// Denylist from a fixed list, usually the `[mailbox]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticDenylist {
    domains: Vec<String>,
}

impl StaticDenylist {
    pub fn new(domains: Vec<String>) -> Self {
        Self { domains }
    }
}

#[async_trait]
impl DomainDenylist for StaticDenylist {
    async fn blocked_domains(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.domains.clone())
    }
}

/// Fetch the denylist, treating a failed fetch as an empty list.
pub async fn load_blocked(denylist: &dyn DomainDenylist) -> HashSet<String> {
    match denylist.blocked_domains().await {
        Ok(domains) => domains.into_iter().map(|d| d.trim().to_lowercase()).collect(),
        Err(e) => {
            warn!(error = %e, "could not fetch domain denylist, continuing without it");
            HashSet::new()
        }
    }
}

/// Provider domains not on the denylist, in provider order.
pub fn usable_domains(domains: &[String], blocked: &HashSet<String>) -> Vec<String> {
    domains
        .iter()
        .filter(|d| !blocked.contains(&d.trim().to_lowercase()))
        .cloned()
        .collect()
}

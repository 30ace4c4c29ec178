use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::temp_email_providers::MailboxProvider;

/// Field name to value, as submitted to a signup or verification form.
pub type FormFields = BTreeMap<String, String>;

/// Inbox listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
}

/// Full message as fetched from the mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

/// A disposable mailbox that is ready to receive mail.
#[derive(Clone)]
pub struct Mailbox {
    pub provider: Arc<dyn MailboxProvider>,
    pub address: String,
    pub secret: String,
    pub token: String,
}

impl Mailbox {
    pub fn domain(&self) -> &str {
        self.address.rsplit_once('@').map(|(_, d)| d).unwrap_or_default()
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("provider", &self.provider.name())
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Output of a successful registration, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub email: String,
    pub password: String,
    pub token: String,
    pub usage_limit: String,
}

// Attempt bookkeeping
pub mod context;
pub mod result;
pub mod types;

// Collaborators
pub mod browser;
pub mod temp_email_providers;

// Pipeline stages
pub mod email;
pub mod email_verifier;
pub mod mailbox;
pub mod orchestrator;

// Completion
pub mod auto_register;
pub mod policy;

#[cfg(test)]
pub(crate) mod test_utils;

use async_trait::async_trait;

// Re-exports for convenience
pub use auto_register::{BatchRegister, BatchStats};
pub use browser::{session_token, BrowserLauncher, BrowserSession};
pub use context::{RegistrationAttempt, RegistrationState, StateTransition};
pub use email_verifier::{extract_code, VerificationPoller};
pub use mailbox::MailboxAcquirer;
pub use orchestrator::RegistrationPipeline;
pub use policy::{register_once, RegistrationPolicy, SingleRegistration};
pub use result::DetailedRegistrationResult;
pub use temp_email_providers::{DomainDenylist, MailboxProvider, ProviderError, StaticDenylist};
pub use types::*;

/// Registration settings from the `[registration]` config section.
pub use mailrotor_core::RegistrationSettings as RegistrationConfig;

/// Anything that can produce a freshly registered account.
#[async_trait]
pub trait Registrar: Send + Sync {
    async fn register_account(&self) -> Result<RegisteredAccount, RegistrationError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistrationError {
    #[error("no mailbox after {attempts} attempts: {last_error}")]
    MailboxUnavailable { attempts: u32, last_error: String },

    #[error("no usable mailbox domains on any provider")]
    NoUsableDomains,

    #[error("browser error: {0}")]
    Browser(String),

    #[error("signup failed: {0}")]
    Signup(String),

    #[error("no verification email after {attempts} attempts")]
    VerificationTimeout { attempts: u32 },

    #[error("session token not found after {attempts} attempts")]
    TokenMissing { attempts: u32 },
}

/// Email verification - polls the mailbox for a code and the browser for the session cookie
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::browser::{session_token, BrowserSession};
use crate::temp_email_providers::ProviderError;
use crate::types::Mailbox;
use crate::RegistrationError;

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6}\b").expect("valid code pattern"));

/// First standalone six-digit number in `body`
pub fn extract_code(body: &str) -> Option<String> {
    CODE_RE.find(body).map(|m| m.as_str().to_string())
}

/// Bounded, fixed-interval polling for verification artifacts.
#[derive(Debug, Clone)]
pub struct VerificationPoller {
    sender: String,
    subject: String,
    max_attempts: u32,
    interval: Duration,
}

impl VerificationPoller {
    pub fn new(sender: impl Into<String>, subject: impl Into<String>, max_attempts: u32, interval: Duration) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Wait for the verification mail and return its code.
    pub async fn wait_for_code(&self, mailbox: &Mailbox) -> Result<String, RegistrationError> {
        info!(address = %mailbox.address, "📧 waiting for verification email");

        for attempt in 1..=self.max_attempts {
            match self.check_inbox(mailbox).await {
                Ok(Some(code)) => {
                    info!(attempt, "✓ verification code received");
                    return Ok(code);
                }
                Ok(None) => debug!(attempt, max_attempts = self.max_attempts, "no verification email yet"),
                Err(e) => warn!(attempt, error = %e, "error checking inbox"),
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        warn!(attempts = self.max_attempts, "✗ no verification email received");
        Err(RegistrationError::VerificationTimeout {
            attempts: self.max_attempts,
        })
    }

    /// Wait for the session cookie and return the credential it carries.
    pub async fn wait_for_token(
        &self,
        browser: &dyn BrowserSession,
        cookie: &str,
        separator: &str,
    ) -> Result<String, RegistrationError> {
        for attempt in 1..=self.max_attempts {
            match browser.read_cookie(cookie).await {
                Ok(Some(value)) => match session_token(&value, separator) {
                    Some(token) => {
                        info!(attempt, cookie, "✓ session token found");
                        return Ok(token);
                    }
                    None => debug!(attempt, cookie, "session cookie present but empty"),
                },
                Ok(None) => debug!(attempt, max_attempts = self.max_attempts, cookie, "session cookie not set yet"),
                Err(e) => warn!(attempt, error = %e, "error reading session cookie"),
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        warn!(attempts = self.max_attempts, cookie, "✗ session token never appeared");
        Err(RegistrationError::TokenMissing {
            attempts: self.max_attempts,
        })
    }

    /// An empty sender matches nothing; mail is never trusted by subject alone.
    fn is_verification_mail(&self, from: &str, subject: &str) -> bool {
        !self.sender.is_empty() && from.trim().eq_ignore_ascii_case(&self.sender) && subject.contains(&self.subject)
    }

    async fn check_inbox(&self, mailbox: &Mailbox) -> Result<Option<String>, ProviderError> {
        let messages = mailbox.provider.list_messages(&mailbox.token).await?;

        for summary in messages {
            if !self.is_verification_mail(&summary.from, &summary.subject) {
                continue;
            }
            let message = mailbox.provider.get_message(&mailbox.token, &summary.id).await?;
            if let Some(code) = extract_code(&message.text) {
                return Ok(Some(code));
            }
            debug!(id = %summary.id, "verification email without a code");
        }

        Ok(None)
    }
}

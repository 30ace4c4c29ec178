use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use mailrotor_core::{AppConfig, ConfigError, VerificationPath, UNKNOWN_QUOTA};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::context::{RegistrationAttempt, RegistrationState};
use crate::email::SignupCredentials;
use crate::email_verifier::VerificationPoller;
use crate::mailbox::MailboxAcquirer;
use crate::result::DetailedRegistrationResult;
use crate::temp_email_providers::{DomainDenylist, MailboxProvider, StaticDenylist};
use crate::types::{FormFields, Mailbox, RegisteredAccount};
use crate::{Registrar, RegistrationConfig, RegistrationError};

/// Drives one signup from mailbox creation to session token.
///
/// Never touches the account store; persisting the result is up to the caller.
pub struct RegistrationPipeline {
    config: RegistrationConfig,
    mailboxes: MailboxAcquirer,
    poller: VerificationPoller,
    browser: Arc<dyn BrowserLauncher>,
}

impl RegistrationPipeline {
    /// Build a pipeline, rejecting settings it cannot run with.
    pub fn new(
        config: RegistrationConfig,
        providers: Vec<Arc<dyn MailboxProvider>>,
        denylist: Arc<dyn DomainDenylist>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mailboxes = MailboxAcquirer::new(providers, denylist, config.mailbox_attempts);
        let poller = VerificationPoller::new(
            config.verification_sender.clone(),
            config.verification_subject.clone(),
            config.poll_attempts,
            config.poll_interval(),
        );
        Ok(Self {
            config,
            mailboxes,
            poller,
            browser,
        })
    }

    /// Pipeline for the loaded application config; the `[mailbox]` denylist
    /// is applied to every provider.
    pub fn from_config(
        config: &AppConfig,
        providers: Vec<Arc<dyn MailboxProvider>>,
        browser: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, ConfigError> {
        let denylist = Arc::new(StaticDenylist::new(config.mailbox.denylist.clone()));
        Self::new(config.registration.clone(), providers, denylist, browser)
    }

    /// Run one attempt, keeping the state trail alongside the outcome.
    pub async fn register(&self) -> DetailedRegistrationResult {
        let mut attempt = RegistrationAttempt::new();
        info!("Starting registration at {}", self.config.signup_url);

        let result = self.drive(&mut attempt).await;
        match &result {
            Ok(account) => attempt.transition(
                RegistrationState::TokenExtracted,
                Some(format!("usage limit {}", account.usage_limit)),
            ),
            Err(e) => attempt.transition(RegistrationState::Failed(e.clone()), Some(e.to_string())),
        }

        DetailedRegistrationResult::new(result, attempt)
    }

    async fn drive(&self, attempt: &mut RegistrationAttempt) -> Result<RegisteredAccount, RegistrationError> {
        let mailbox = self.mailboxes.acquire().await?;
        attempt.mailbox = Some(mailbox.address.clone());
        attempt.transition(
            RegistrationState::MailboxAcquired {
                address: mailbox.address.clone(),
            },
            Some(format!("provider {}", mailbox.provider.name())),
        );

        let browser = self
            .browser
            .launch()
            .await
            .map_err(|e| RegistrationError::Browser(e.to_string()))?;

        let credentials = SignupCredentials::generate();
        attempt.password = Some(credentials.password.clone());
        browser
            .navigate(&self.config.signup_url)
            .await
            .map_err(|e| RegistrationError::Browser(e.to_string()))?;
        browser
            .submit_form(&credentials.form_fields(&mailbox.address))
            .await
            .map_err(|e| RegistrationError::Signup(e.to_string()))?;
        attempt.transition(RegistrationState::SignupSubmitted, None);

        attempt.transition(
            RegistrationState::PollingVerification,
            Some(format!("{:?}", self.config.verification)),
        );
        let token = self.verify(&mailbox, browser.as_ref()).await?;
        attempt.token = Some(token.clone());

        let usage_limit = match browser.read_quota().await {
            Ok(Some(quota)) => quota,
            Ok(None) => UNKNOWN_QUOTA.to_string(),
            Err(e) => {
                warn!(error = %e, "could not read usage quota");
                UNKNOWN_QUOTA.to_string()
            }
        };

        Ok(RegisteredAccount {
            email: mailbox.address,
            password: credentials.password,
            token,
            usage_limit,
        })
    }

    async fn verify(&self, mailbox: &Mailbox, browser: &dyn BrowserSession) -> Result<String, RegistrationError> {
        if self.config.verification == VerificationPath::EmailCode {
            let code = self.poller.wait_for_code(mailbox).await?;
            let fields = FormFields::from([("code".to_string(), code)]);
            browser
                .submit_form(&fields)
                .await
                .map_err(|e| RegistrationError::Signup(e.to_string()))?;
        }

        self.poller
            .wait_for_token(browser, &self.config.session_cookie, &self.config.token_separator)
            .await
    }
}

#[async_trait]
impl Registrar for RegistrationPipeline {
    async fn register_account(&self) -> Result<RegisteredAccount, RegistrationError> {
        let detailed = self.register().await;
        if detailed.is_success() {
            info!("{}", detailed.summary());
        } else {
            warn!("{}", detailed.summary());
        }
        detailed.into_result()
    }
}

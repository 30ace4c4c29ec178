use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub registration: RegistrationSettings,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
    #[serde(default = "default_export_file")]
    pub export_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Active-session file updated when an account is applied
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

/// How the pipeline obtains the session credential once the form is submitted.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPath {
    /// Read a 6-digit code from the verification mail, submit it, then read the cookie
    #[default]
    EmailCode,
    /// Poll the browser session for the cookie directly
    SessionCookie,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationSettings {
    #[serde(default)]
    pub signup_url: String,
    #[serde(default = "default_mailbox_attempts")]
    pub mailbox_attempts: u32,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default)]
    pub verification: VerificationPath,
    #[serde(default)]
    pub verification_sender: String,
    #[serde(default = "default_verification_subject")]
    pub verification_subject: String,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// Cookie values carry `<prefix><separator><token>`; empty disables the split
    #[serde(default = "default_token_separator")]
    pub token_separator: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    #[serde(default = "default_batch_count")]
    pub count: usize,
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MailboxConfig {
    /// Domains never used for new mailboxes, merged with any remote denylist
    #[serde(default)]
    pub denylist: Vec<String>,
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `MAILROTOR_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MAILROTOR_ACCOUNTS_FILE") {
            self.store.accounts_file = v;
        }
        if let Some(v) = lookup("MAILROTOR_SESSION_FILE") {
            self.session.session_file = v;
        }
        if let Some(v) = lookup("MAILROTOR_COOLDOWN_SECS") {
            self.batch.cooldown_seconds = v.parse().map_err(|_| ConfigError::InvalidOverride {
                key: "MAILROTOR_COOLDOWN_SECS".to_string(),
                value: v.clone(),
            })?;
        }
        Ok(())
    }
}

impl RegistrationSettings {
    /// Reject settings the pipeline cannot run with. The verification mail is
    /// only trusted from a named sender, so the email-code path needs one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signup_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "registration.signup_url".to_string(),
            });
        }
        if self.verification == VerificationPath::EmailCode && self.verification_sender.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "registration.verification_sender".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl BatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            accounts_file: default_accounts_file(),
            export_file: default_export_file(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
        }
    }
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            signup_url: String::new(),
            mailbox_attempts: default_mailbox_attempts(),
            poll_attempts: default_poll_attempts(),
            poll_interval_seconds: default_poll_interval(),
            verification: VerificationPath::default(),
            verification_sender: String::new(),
            verification_subject: default_verification_subject(),
            session_cookie: default_session_cookie(),
            token_separator: default_token_separator(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            count: default_batch_count(),
            cooldown_seconds: default_cooldown(),
        }
    }
}

fn default_accounts_file() -> String { "accounts.json".to_string() }
fn default_export_file() -> String { "accounts_export.txt".to_string() }
fn default_session_file() -> String { "session.json".to_string() }
fn default_mailbox_attempts() -> u32 { 3 }
fn default_poll_attempts() -> u32 { 30 }
fn default_poll_interval() -> u64 { 2 }
fn default_verification_subject() -> String { "Verify your email address".to_string() }
fn default_session_cookie() -> String { "SessionToken".to_string() }
fn default_token_separator() -> String { "%3A%3A".to_string() }
fn default_batch_count() -> usize { 3 }
fn default_cooldown() -> u64 { 3 }

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.store.accounts_file, "accounts.json");
        assert_eq!(config.registration.mailbox_attempts, 3);
        assert_eq!(config.registration.poll_attempts, 30);
        assert_eq!(config.registration.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.batch.cooldown(), Duration::from_secs(3));
        assert_eq!(config.registration.verification, VerificationPath::EmailCode);
    }

    #[test]
    fn test_partial_sections() {
        let raw = r#"
            [registration]
            verification = "session_cookie"
            poll_attempts = 5

            [mailbox]
            denylist = ["spam.example"]
        "#;
        let config = AppConfig::from_toml(raw).unwrap();
        assert_eq!(config.registration.verification, VerificationPath::SessionCookie);
        assert_eq!(config.registration.poll_attempts, 5);
        assert_eq!(config.registration.session_cookie, "SessionToken");
        assert_eq!(config.mailbox.denylist, vec!["spam.example".to_string()]);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MAILROTOR_ACCOUNTS_FILE", "/tmp/a.json"),
            ("MAILROTOR_COOLDOWN_SECS", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.store.accounts_file, "/tmp/a.json");
        assert_eq!(config.batch.cooldown_seconds, 0);
        assert_eq!(config.session.session_file, "session.json");
    }

    #[test]
    fn test_validate_requires_a_verification_sender() {
        let mut settings = RegistrationSettings::default();
        assert!(matches!(settings.validate(), Err(ConfigError::Missing { key }) if key == "registration.signup_url"));

        settings.signup_url = "https://service.test/signup".into();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing { key }) if key == "registration.verification_sender"
        ));

        settings.verification_sender = "no-reply@service.test".into();
        assert!(settings.validate().is_ok());

        // The cookie path never reads mail
        settings.verification_sender.clear();
        settings.verification = VerificationPath::SessionCookie;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_bad_override_is_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "MAILROTOR_COOLDOWN_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { .. }));
    }
}

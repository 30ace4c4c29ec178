//! Scripted collaborators for pipeline and orchestrator tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::temp_email_providers::{DomainDenylist, MailboxProvider, ProviderError};
use crate::types::{FormFields, Message, MessageSummary, RegisteredAccount};
use crate::{Registrar, RegistrationError};

/// Decrement `counter` if positive, returning whether it was.
fn take(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

pub struct MockProvider {
    name: String,
    domains: Vec<String>,
    rejected: HashSet<String>,
    domain_failures: AtomicU32,
    inbox: Vec<Message>,
    inbox_delay: AtomicU32,
    pub domain_calls: AtomicU32,
    pub created: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(name: &str, domains: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            domains: domains.iter().map(|d| d.to_string()).collect(),
            rejected: HashSet::new(),
            domain_failures: AtomicU32::new(0),
            inbox: Vec::new(),
            inbox_delay: AtomicU32::new(0),
            domain_calls: AtomicU32::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Refuse addresses on `domain`
    pub fn rejecting(mut self, domain: &str) -> Self {
        self.rejected.insert(domain.to_string());
        self
    }

    /// Fail the first `n` domain listings
    pub fn failing_domains(self, n: u32) -> Self {
        self.domain_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_message(mut self, from: &str, subject: &str, text: &str) -> Self {
        let id = format!("msg-{}", self.inbox.len() + 1);
        self.inbox.push(Message {
            id,
            from: from.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Keep the inbox empty for the first `polls` listings
    pub fn inbox_delay(self, polls: u32) -> Self {
        self.inbox_delay.store(polls, Ordering::SeqCst);
        self
    }

    pub fn domain_calls(&self) -> u32 {
        self.domain_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailboxProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_domains(&self) -> Result<Vec<String>, ProviderError> {
        self.domain_calls.fetch_add(1, Ordering::SeqCst);
        if take(&self.domain_failures) {
            return Err(ProviderError::Transient("503 service unavailable".into()));
        }
        Ok(self.domains.clone())
    }

    async fn create_account(&self, address: &str, _secret: &str) -> Result<(), ProviderError> {
        let domain = address.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
        if self.rejected.contains(domain) {
            return Err(ProviderError::Rejected(format!("{domain} is not accepted")));
        }
        self.created.lock().unwrap().push(address.to_string());
        Ok(())
    }

    async fn get_token(&self, address: &str, _secret: &str) -> Result<String, ProviderError> {
        Ok(format!("mailbox-token-{address}"))
    }

    async fn list_messages(&self, _token: &str) -> Result<Vec<MessageSummary>, ProviderError> {
        if take(&self.inbox_delay) {
            return Ok(Vec::new());
        }
        Ok(self
            .inbox
            .iter()
            .map(|m| MessageSummary {
                id: m.id.clone(),
                from: m.from.clone(),
                subject: m.subject.clone(),
            })
            .collect())
    }

    async fn get_message(&self, _token: &str, id: &str) -> Result<Message, ProviderError> {
        self.inbox
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| ProviderError::Rejected(format!("no message {id}")))
    }
}

pub struct MockDenylist(pub Vec<String>);

#[async_trait]
impl DomainDenylist for MockDenylist {
    async fn blocked_domains(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Shared state behind every browser a [`MockLauncher`] hands out.
#[derive(Default)]
pub struct BrowserState {
    /// Cookie value the site eventually sets
    pub cookie: Option<String>,
    /// Only set the cookie once a verification code was submitted
    pub require_code: bool,
    /// Cookie reads that come back empty before the cookie shows up
    pub cookie_delay: AtomicU32,
    pub quota: Option<String>,
    pub fail_navigate: bool,
    pub visited: Mutex<Vec<String>>,
    pub forms: Mutex<Vec<FormFields>>,
}

impl BrowserState {
    pub fn with_cookie(cookie: &str) -> Self {
        Self {
            cookie: Some(cookie.to_string()),
            ..Default::default()
        }
    }

    pub fn forms(&self) -> Vec<FormFields> {
        self.forms.lock().unwrap().clone()
    }

    fn code_submitted(&self) -> bool {
        self.forms.lock().unwrap().iter().any(|f| f.contains_key("code"))
    }
}

pub struct MockBrowser {
    state: Arc<BrowserState>,
}

impl MockBrowser {
    pub fn new(state: BrowserState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

#[async_trait]
impl BrowserSession for MockBrowser {
    async fn navigate(&self, url: &str) -> anyhow::Result<()> {
        if self.state.fail_navigate {
            anyhow::bail!("net::ERR_CONNECTION_REFUSED");
        }
        self.state.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn submit_form(&self, fields: &FormFields) -> anyhow::Result<()> {
        self.state.forms.lock().unwrap().push(fields.clone());
        Ok(())
    }

    async fn read_cookie(&self, _name: &str) -> anyhow::Result<Option<String>> {
        if self.state.require_code && !self.state.code_submitted() {
            return Ok(None);
        }
        if take(&self.state.cookie_delay) {
            return Ok(None);
        }
        Ok(self.state.cookie.clone())
    }

    async fn read_quota(&self) -> anyhow::Result<Option<String>> {
        Ok(self.state.quota.clone())
    }
}

pub struct MockLauncher {
    pub state: Arc<BrowserState>,
}

impl MockLauncher {
    pub fn new(state: BrowserState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>> {
        Ok(Box::new(MockBrowser {
            state: self.state.clone(),
        }))
    }
}

/// One scripted step for [`ScriptedRegistrar`].
pub enum Step {
    Succeed(&'static str),
    Fail,
    Panic,
}

/// Registrar that plays back a fixed script, one step per call.
pub struct ScriptedRegistrar {
    steps: Mutex<VecDeque<Step>>,
    pub calls: AtomicU32,
}

impl ScriptedRegistrar {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn account(email: &str) -> RegisteredAccount {
    RegisteredAccount {
        email: email.to_string(),
        password: "secret".to_string(),
        token: format!("tok-{email}"),
        usage_limit: "50".to_string(),
    }
}

#[async_trait]
impl Registrar for ScriptedRegistrar {
    async fn register_account(&self) -> Result<RegisteredAccount, RegistrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Succeed(email)) => Ok(account(email)),
            Some(Step::Fail) | None => Err(RegistrationError::VerificationTimeout { attempts: 30 }),
            Some(Step::Panic) => panic!("browser crashed"),
        }
    }
}

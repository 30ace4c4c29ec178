use async_trait::async_trait;

use crate::types::FormFields;

/// A live browser page driving the signup flow.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> anyhow::Result<()>;

    async fn submit_form(&self, fields: &FormFields) -> anyhow::Result<()>;

    async fn read_cookie(&self, name: &str) -> anyhow::Result<Option<String>>;

    /// Usage quota shown to the signed-in account, if the page exposes one
    async fn read_quota(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// Opens a fresh browser session for each registration attempt.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> anyhow::Result<Box<dyn BrowserSession>>;
}

/// Credential carried by a session cookie.
///
/// Values shaped like `<prefix><separator><token>` yield the part after the
/// first separator; anything else is taken whole. Empty values yield `None`.
pub fn session_token(cookie: &str, separator: &str) -> Option<String> {
    let token = match cookie.split_once(separator).filter(|_| !separator.is_empty()) {
        Some((_, rest)) => rest.split(separator).next().unwrap_or_default(),
        None => cookie,
    };
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

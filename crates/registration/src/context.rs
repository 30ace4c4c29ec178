use std::time::{Duration, Instant, SystemTime};

use crate::RegistrationError;

/// State machine for a registration attempt
#[derive(Debug, Clone)]
pub enum RegistrationState {
    Start,
    MailboxAcquired { address: String },
    SignupSubmitted,
    PollingVerification,
    TokenExtracted,
    Failed(RegistrationError),
}

impl RegistrationState {
    pub fn name(&self) -> &'static str {
        match self {
            RegistrationState::Start => "start",
            RegistrationState::MailboxAcquired { .. } => "mailbox_acquired",
            RegistrationState::SignupSubmitted => "signup_submitted",
            RegistrationState::PollingVerification => "polling_verification",
            RegistrationState::TokenExtracted => "token_extracted",
            RegistrationState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistrationState::TokenExtracted | RegistrationState::Failed(_))
    }
}

/// Transition between states with timestamp and details
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: &'static str,
    pub to: &'static str,
    pub timestamp: SystemTime,
    pub details: Option<String>,
}

/// Bookkeeping for one registration attempt
#[derive(Debug)]
pub struct RegistrationAttempt {
    pub state: RegistrationState,
    pub transitions: Vec<StateTransition>,
    pub started_at: Instant,
    /// Address of the mailbox once acquired
    pub mailbox: Option<String>,
    /// Generated signup password
    pub password: Option<String>,
    pub token: Option<String>,
}

impl RegistrationAttempt {
    pub fn new() -> Self {
        Self {
            state: RegistrationState::Start,
            transitions: Vec::new(),
            started_at: Instant::now(),
            mailbox: None,
            password: None,
            token: None,
        }
    }

    /// Move to `new_state`, recording the transition
    pub fn transition(&mut self, new_state: RegistrationState, details: Option<String>) {
        let old_state = std::mem::replace(&mut self.state, new_state);

        self.transitions.push(StateTransition {
            from: old_state.name(),
            to: self.state.name(),
            timestamp: SystemTime::now(),
            details,
        });
    }

    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Transition path as `a -> b -> c`
    pub fn path(&self) -> String {
        let mut names = vec![self.transitions.first().map_or(self.state.name(), |t| t.from)];
        names.extend(self.transitions.iter().map(|t| t.to));
        names.join(" -> ")
    }
}

impl Default for RegistrationAttempt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_recorded() {
        let mut attempt = RegistrationAttempt::new();
        assert_eq!(attempt.path(), "start");

        attempt.transition(
            RegistrationState::MailboxAcquired {
                address: "a@x.com".into(),
            },
            None,
        );
        attempt.transition(RegistrationState::SignupSubmitted, Some("form sent".into()));
        attempt.transition(
            RegistrationState::Failed(RegistrationError::VerificationTimeout { attempts: 30 }),
            None,
        );

        assert_eq!(attempt.transitions.len(), 3);
        assert!(attempt.mailbox.is_none() && attempt.token.is_none());
        assert_eq!(attempt.transitions[1].details.as_deref(), Some("form sent"));
        assert_eq!(attempt.path(), "start -> mailbox_acquired -> signup_submitted -> failed");
        assert!(attempt.state.is_terminal());
    }
}

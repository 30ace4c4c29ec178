use crate::context::RegistrationAttempt;
use crate::types::RegisteredAccount;
use crate::RegistrationError;

/// Registration outcome together with the attempt that produced it
#[derive(Debug)]
pub struct DetailedRegistrationResult {
    pub result: Result<RegisteredAccount, RegistrationError>,
    pub attempt: RegistrationAttempt,
}

impl DetailedRegistrationResult {
    pub fn new(result: Result<RegisteredAccount, RegistrationError>, attempt: RegistrationAttempt) -> Self {
        Self { result, attempt }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        let elapsed = self.attempt.duration().as_millis();
        match &self.result {
            Ok(account) => format!(
                "✓ Registered {} in {}ms ({})",
                account.email,
                elapsed,
                self.attempt.path()
            ),
            Err(e) => format!("✗ Registration failed: {} after {}ms ({})", e, elapsed, self.attempt.path()),
        }
    }

    pub fn into_result(self) -> Result<RegisteredAccount, RegistrationError> {
        self.result
    }
}

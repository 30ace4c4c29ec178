use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::Rng;

use crate::types::FormFields;

const USERNAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PASSWORD_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const USERNAME_LEN: usize = 10;
pub const PASSWORD_LEN: usize = 12;

fn sample(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

/// Random mailbox local part: lowercase letters and digits
pub fn generate_username() -> String {
    sample(USERNAME_CHARS, USERNAME_LEN)
}

/// Random password from letters, digits and punctuation
pub fn generate_password() -> String {
    sample(PASSWORD_CHARS, PASSWORD_LEN)
}

/// Address plus secret for a new disposable mailbox on `domain`
pub fn generate_mailbox_address(domain: &str) -> (String, String) {
    (format!("{}@{}", generate_username(), domain), generate_password())
}

/// Identity submitted on the signup form.
#[derive(Debug, Clone)]
pub struct SignupCredentials {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl SignupCredentials {
    pub fn generate() -> Self {
        Self {
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            password: generate_password(),
        }
    }

    pub fn form_fields(&self, email: &str) -> FormFields {
        [
            ("email", email),
            ("password", self.password.as_str()),
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_username() {
        let username = generate_username();
        assert_eq!(username.len(), USERNAME_LEN);
        assert!(username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_password() {
        let password = generate_password();
        assert_eq!(password.chars().count(), PASSWORD_LEN);
        assert!(password.chars().all(|c| c.is_ascii_graphic()));
    }

    #[test]
    fn test_mailbox_address_uses_domain() {
        let (address, secret) = generate_mailbox_address("mail.test");
        assert!(address.ends_with("@mail.test"));
        assert_eq!(address.len(), USERNAME_LEN + "@mail.test".len());
        assert!(!secret.is_empty());
    }

    #[test]
    fn test_signup_form_fields() {
        let creds = SignupCredentials::generate();
        assert!(!creds.first_name.is_empty());
        assert!(!creds.last_name.is_empty());

        let fields = creds.form_fields("a@x.com");
        assert_eq!(fields.get("email").map(String::as_str), Some("a@x.com"));
        assert_eq!(fields.get("password"), Some(&creds.password));
        assert_eq!(fields.len(), 4);
    }
}

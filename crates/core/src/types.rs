use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for every timestamp written to the accounts file.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Quota descriptor recorded when the signup flow could not report one.
pub const UNKNOWN_QUOTA: &str = "unknown";

/// One provisioned account as persisted in the accounts file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Mailbox address, unique across the store
    pub email: String,
    pub password: String,
    /// Session credential extracted at signup
    pub token: String,
    #[serde(default = "default_quota")]
    pub usage_limit: String,
    #[serde(with = "local_time")]
    pub created_time: NaiveDateTime,
    #[serde(default)]
    pub status: UsageStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStatus {
    #[serde(default)]
    pub is_used: bool,
    #[serde(default, with = "local_time::option")]
    pub last_used_time: Option<NaiveDateTime>,
}

impl AccountRecord {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        token: impl Into<String>,
        usage_limit: impl Into<String>,
        created_time: NaiveDateTime,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            token: token.into(),
            usage_limit: usage_limit.into(),
            created_time,
            status: UsageStatus::default(),
        }
    }

    pub fn is_used(&self) -> bool {
        self.status.is_used
    }

    /// Flag the record as used at `now`.
    ///
    /// The stored time never moves backward: a clock that reads earlier than the
    /// previous mark keeps the previous value.
    pub fn mark_used(&mut self, now: NaiveDateTime) {
        let when = match self.status.last_used_time {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        self.status.is_used = true;
        self.status.last_used_time = Some(when);
    }
}

fn default_quota() -> String {
    UNKNOWN_QUOTA.to_string()
}

/// Derived counts over the store contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountStats {
    pub total: usize,
    pub used: usize,
    pub unused: usize,
}

impl AccountStats {
    pub fn from_records(records: &[AccountRecord]) -> Self {
        let total = records.len();
        let used = records.iter().filter(|r| r.is_used()).count();
        Self {
            total,
            used,
            unused: total - used,
        }
    }
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` local timestamps.
pub mod local_time {
    use super::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::TIME_FORMAT;
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_str(&v.format(TIME_FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            raw.map(|s| NaiveDateTime::parse_from_str(&s, TIME_FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

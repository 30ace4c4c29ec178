pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, BatchConfig, RegistrationSettings, VerificationPath};
pub use error::{ConfigError, StoreError};
pub use types::*;

pub mod applier;
pub mod rotator;
pub mod selector;
pub mod session;

use async_trait::async_trait;

pub use applier::{ActivationApplier, ActivationError};
pub use rotator::{AccountRotator, RotationOutcome};
pub use selector::{next_after, next_unused, select, select_from, Selection};
pub use session::{ActiveSession, FileSession};

/// Where the active credential lives.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn update(&self, identifier: &str, credential: &str) -> anyhow::Result<()>;
}

/// Regenerates the local device/session identifier.
#[async_trait]
pub trait DeviceReset: Send + Sync {
    async fn reset(&self) -> anyhow::Result<()>;
}

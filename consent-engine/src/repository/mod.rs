//! Repository abstraction for session snapshot persistence.
//!
//! The store mirrors itself to durable storage as one document after
//! every mutation, so the trait works on whole snapshots rather than
//! individual sessions. Implementations provide the actual backend
//! (JSON file, in-memory for tests and ephemeral embedding).

mod file;
mod memory;

pub use file::JsonFileRepository;
pub use memory::InMemoryRepository;

use anyhow::Result;
use async_trait::async_trait;
use consent_core::{ConsentSession, SessionId};

/// Complete store contents as persisted: ordered `[id, session]` pairs.
pub type Snapshot = Vec<(SessionId, ConsentSession)>;

/// Storage backend for the session store's snapshot.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the persisted snapshot. A backend that has never been
    /// written loads as empty, not as an error.
    async fn load(&self) -> Result<Snapshot>;

    /// Replaces the persisted snapshot with `sessions`.
    async fn save(&self, sessions: &[(SessionId, ConsentSession)]) -> Result<()>;
}

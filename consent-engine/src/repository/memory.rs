//! In-memory snapshot backend.

use async_trait::async_trait;
use consent_core::{ConsentSession, SessionId};
use tokio::sync::RwLock;

use super::{Snapshot, SnapshotRepository};

/// Keeps the snapshot in process memory. Used by tests and by
/// embeddings that do not need sessions to survive a restart.
#[derive(Default)]
pub struct InMemoryRepository {
    snapshot: RwLock<Snapshot>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load(&self) -> anyhow::Result<Snapshot> {
        Ok(self.snapshot.read().await.clone())
    }

    async fn save(&self, sessions: &[(SessionId, ConsentSession)]) -> anyhow::Result<()> {
        *self.snapshot.write().await = sessions.to_vec();
        Ok(())
    }
}

//! In-memory session store with write-through snapshot persistence.
//!
//! The store owns the session map. Every mutation re-serializes the
//! whole store through the snapshot repository; persistence failures
//! are logged and swallowed, leaving in-memory state authoritative for
//! the rest of the process lifetime.
//!
//! Two transitions for the same session must never interleave. The
//! store serializes them with one async mutex per session ID, held
//! across load, transition, persist, and effect execution. Operations
//! on different sessions run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{Duration, Utc};
use consent_core::{transition, ConsentSession, SessionEvent, SessionId, SessionStatus};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::interpreter::{execute_effects, EffectContext};
use crate::repository::{InMemoryRepository, SnapshotRepository};
use crate::scheduler::ReminderScheduler;

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, ConsentSession>>,
    /// Per-session locks. For any given session, the sequence
    /// "transition -> persist -> effects" happens atomically with
    /// respect to other events for that session.
    session_locks: RwLock<HashMap<SessionId, Arc<Mutex<()>>>>,
    repository: Arc<dyn SnapshotRepository>,
}

impl SessionStore {
    /// Opens the store, loading any persisted snapshot into memory.
    pub async fn open(repository: Arc<dyn SnapshotRepository>) -> Result<Self> {
        let snapshot = repository.load().await?;
        let count = snapshot.len();
        if count > 0 {
            info!("Loaded {} persisted consent session(s)", count);
        }
        Ok(Self {
            sessions: RwLock::new(snapshot.into_iter().collect()),
            session_locks: RwLock::new(HashMap::new()),
            repository,
        })
    }

    /// A store backed by process memory only (for tests and ephemeral
    /// embedding).
    pub fn in_memory() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            session_locks: RwLock::new(HashMap::new()),
            repository: Arc::new(InMemoryRepository::new()),
        }
    }

    async fn get_or_create_session_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        // Fast path: lock already exists
        {
            let locks = self.session_locks.read().await;
            if let Some(lock) = locks.get(session_id) {
                return Arc::clone(lock);
            }
        }

        // Slow path: create the lock
        let mut locks = self.session_locks.write().await;
        Arc::clone(
            locks
                .entry(session_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Upserts a session and immediately persists the whole store.
    pub async fn insert(&self, session: ConsentSession) {
        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session.id.clone(), session);
        }
        self.persist().await;
    }

    pub async fn get(&self, session_id: &SessionId) -> Option<ConsentSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// All sessions as `[id, session]` pairs, ordered by creation time
    /// so repeated snapshots of the same store are stable.
    pub async fn all(&self) -> Vec<(SessionId, ConsentSession)> {
        let sessions = self.sessions.read().await;
        let mut snapshot: Vec<(SessionId, ConsentSession)> = sessions
            .iter()
            .map(|(id, session)| (id.clone(), session.clone()))
            .collect();
        snapshot.sort_by(|(a_id, a), (b_id, b)| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a_id.0.cmp(&b_id.0))
        });
        snapshot
    }

    /// Runs one event through the session's state machine.
    ///
    /// Unknown session IDs are an error; the state of known sessions is
    /// never lost to a failure here, because rejected events come back
    /// from the transition as an unchanged session plus error effects.
    pub async fn process_event(
        &self,
        session_id: &SessionId,
        event: SessionEvent,
        ctx: &EffectContext,
    ) -> Result<ConsentSession> {
        let session_lock = self.get_or_create_session_lock(session_id).await;
        let _guard = session_lock.lock().await;

        let Some(session) = self.get(session_id).await else {
            bail!("Unknown consent session {}", session_id);
        };
        info!("Session {}: processing {}", session_id, event.log_summary());

        let result = transition(session, event, Utc::now());
        {
            let mut sessions = self.sessions.write().await;
            sessions.insert(session_id.clone(), result.session.clone());
        }
        self.persist().await;
        execute_effects(ctx, result.effects).await;

        Ok(result.session)
    }

    /// Removes every session older than `max_age` that never reached
    /// approval, cancelling any reminder armed for it. Returns how many
    /// sessions were removed. Invoked explicitly; there is no
    /// background sweep.
    pub async fn cleanup_expired(&self, max_age: Duration, scheduler: &ReminderScheduler) -> usize {
        let now = Utc::now();
        let expired: Vec<SessionId> = {
            let sessions = self.sessions.read().await;
            sessions
                .values()
                .filter(|s| s.status != SessionStatus::Approved && s.is_expired(now, max_age))
                .map(|s| s.id.clone())
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }

        {
            let mut sessions = self.sessions.write().await;
            for id in &expired {
                sessions.remove(id);
            }
        }
        {
            let mut locks = self.session_locks.write().await;
            for id in &expired {
                locks.remove(id);
            }
        }
        for id in &expired {
            scheduler.cancel(id).await;
            info!("Session {}: expired, removed by cleanup", id);
        }
        self.persist().await;
        expired.len()
    }

    /// Serializes the entire store through the snapshot repository.
    /// Failures are logged and swallowed; memory stays authoritative.
    async fn persist(&self) {
        let snapshot = self.all().await;
        if let Err(e) = self.repository.save(&snapshot).await {
            error!("Failed to persist consent sessions: {:#}", e);
        }
    }
}

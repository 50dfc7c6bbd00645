//! Composition facade tying store, scheduler, and signal bus together.
//!
//! The engine is an explicitly constructed object owned by whatever
//! composes the application (the daemon binary, a test, an embedding
//! application); nothing here is a global.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use consent_core::{
    ConsentSession, Decision, NotificationLevel, Participant, ParticipantId, SessionEvent,
    SessionId, SessionStatus,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::bus::{InboundSignal, MatchAgreed, OutboundSignal, SignalBus};
use crate::config::Config;
use crate::interpreter::EffectContext;
use crate::repository::SnapshotRepository;
use crate::scheduler::ReminderScheduler;
use crate::status::StatusReport;
use crate::store::SessionStore;

pub struct ConsentEngine {
    store: SessionStore,
    ctx: EffectContext,
    config: Config,
}

impl ConsentEngine {
    /// Opens the store from `repository` and re-arms reminders for any
    /// persisted approved session whose meetup is still far enough out.
    pub async fn new(config: Config, repository: Arc<dyn SnapshotRepository>) -> Result<Self> {
        let bus = SignalBus::new(config.bus_capacity);
        let scheduler = Arc::new(ReminderScheduler::new(config.reminder_lead(), bus.clone()));
        let store = SessionStore::open(repository).await?;

        let engine = ConsentEngine {
            store,
            ctx: EffectContext { bus, scheduler },
            config,
        };
        engine.restore_reminders().await;
        Ok(engine)
    }

    async fn restore_reminders(&self) {
        let mut restored = 0usize;
        for (id, session) in self.store.all().await {
            if session.status == SessionStatus::Approved
                && self
                    .ctx
                    .scheduler
                    .schedule(id, session.meetup.clone())
                    .await
                    .is_some()
            {
                restored += 1;
            }
        }
        if restored > 0 {
            info!("Re-armed {} meetup reminder(s) from the snapshot", restored);
        }
    }

    /// Subscribes to outbound signals (completions, notifications,
    /// reminders).
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundSignal> {
        self.ctx.bus.subscribe()
    }

    /// Creates a session from the "match agreed to meet up" payload.
    /// Turn order follows the payload: user1 responds first.
    pub async fn create_session(&self, agreed: MatchAgreed) -> ConsentSession {
        let session = ConsentSession::new(
            SessionId::generate(),
            agreed.match_id,
            [
                Participant::new(agreed.user1_id, agreed.user1_name),
                Participant::new(agreed.user2_id, agreed.user2_name),
            ],
            agreed.meetup,
            Utc::now(),
        );
        info!(
            "Session {}: created for match {} ({} and {})",
            session.id, session.match_id, session.participants[0].name, session.participants[1].name
        );
        self.store.insert(session.clone()).await;
        self.ctx.bus.publish(OutboundSignal::Notification {
            level: NotificationLevel::Info,
            message: format!(
                "New meetup consent request: waiting for {} to respond",
                session.participants[0].name
            ),
        });
        session
    }

    /// Records a turn-based decision for the session.
    pub async fn record_decision(
        &self,
        session_id: &SessionId,
        participant_id: ParticipantId,
        decision: Decision,
    ) -> Result<ConsentSession> {
        self.store
            .process_event(
                session_id,
                SessionEvent::DecisionSubmitted {
                    participant_id,
                    decision,
                },
                &self.ctx,
            )
            .await
    }

    /// Revokes a participant's consent for the session.
    pub async fn withdraw(
        &self,
        session_id: &SessionId,
        participant_id: ParticipantId,
    ) -> Result<ConsentSession> {
        self.store
            .process_event(
                session_id,
                SessionEvent::WithdrawalRequested { participant_id },
                &self.ctx,
            )
            .await
    }

    /// Runs one explicit cleanup sweep. Returns how many sessions were
    /// removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store
            .cleanup_expired(self.config.session_max_age(), &self.ctx.scheduler)
            .await
    }

    pub async fn session(&self, session_id: &SessionId) -> Option<ConsentSession> {
        self.store.get(session_id).await
    }

    pub async fn status_report(&self) -> StatusReport {
        StatusReport::from_sessions(&self.store.all().await)
    }

    /// Returns whether a reminder timer is currently armed for the
    /// session.
    pub async fn reminder_scheduled(&self, session_id: &SessionId) -> bool {
        self.ctx.scheduler.is_scheduled(session_id).await
    }

    /// Consumes inbound signals until the channel closes. Per-signal
    /// failures are logged and surfaced as error notifications, never
    /// propagated.
    pub async fn run(self: Arc<Self>, mut signals: mpsc::Receiver<InboundSignal>) {
        while let Some(signal) = signals.recv().await {
            match signal {
                InboundSignal::MatchAgreed(agreed) => {
                    self.create_session(agreed).await;
                }
                InboundSignal::WithdrawConsent {
                    session_id,
                    participant_id,
                } => {
                    if let Err(e) = self.withdraw(&session_id, participant_id).await {
                        warn!("Withdraw signal for session {} failed: {:#}", session_id, e);
                        self.ctx.bus.publish(OutboundSignal::Notification {
                            level: NotificationLevel::Error,
                            message: format!("Could not withdraw consent: {}", e),
                        });
                    }
                }
            }
        }
        info!("Inbound signal channel closed");
    }
}

//! Effect interpreter for the consent state machine.
//!
//! The interpreter is the boundary between the pure state machine and
//! the impure world: it takes effects (descriptions of what to do) and
//! executes them against the signal bus and the reminder scheduler.
//! Consent effects produce no follow-up events, so execution is a
//! single pass in effect order.

use std::sync::Arc;

use consent_core::{Effect, LogLevel};
use tracing::{error, info, warn};

use crate::bus::{OutboundSignal, SignalBus};
use crate::scheduler::ReminderScheduler;

/// Context needed to execute effects.
#[derive(Clone)]
pub struct EffectContext {
    pub bus: SignalBus,
    pub scheduler: Arc<ReminderScheduler>,
}

/// Executes every effect in order. Publishing has no failure path and
/// a skipped reminder is silent, so one effect never blocks the rest.
pub async fn execute_effects(ctx: &EffectContext, effects: Vec<Effect>) {
    for effect in effects {
        execute_effect(ctx, effect).await;
    }
}

async fn execute_effect(ctx: &EffectContext, effect: Effect) {
    match effect {
        Effect::EmitCompletion { session, approved } => {
            info!(
                "Session {}: consent process complete (approved: {})",
                session.id, approved
            );
            ctx.bus
                .publish(OutboundSignal::ConsentComplete { session, approved });
        }
        Effect::ScheduleReminder { session_id, meetup } => {
            ctx.scheduler.schedule(session_id, meetup).await;
        }
        Effect::Notify { level, message } => {
            ctx.bus
                .publish(OutboundSignal::Notification { level, message });
        }
        Effect::Log { level, message } => match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime, Utc};
    use consent_core::{
        ConsentSession, MatchId, MeetupDetails, NotificationLevel, Participant, SessionId,
    };

    fn context() -> (EffectContext, tokio::sync::broadcast::Receiver<OutboundSignal>) {
        let bus = SignalBus::new(8);
        let rx = bus.subscribe();
        let scheduler = Arc::new(ReminderScheduler::new(Duration::hours(24), bus.clone()));
        (EffectContext { bus, scheduler }, rx)
    }

    fn sample_session() -> ConsentSession {
        let starts: NaiveDateTime = (Utc::now() + Duration::hours(30)).naive_utc();
        ConsentSession::new(
            SessionId::from("session-1"),
            MatchId::from("match-1"),
            [
                Participant::new("user-1", "Alice"),
                Participant::new("user-2", "Bob"),
            ],
            MeetupDetails {
                date: starts.date(),
                time: starts.time(),
                location: "Cafe Luna".to_string(),
                activity: "Coffee".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_completion_reaches_subscribers() {
        let (ctx, mut rx) = context();
        let session = sample_session();

        execute_effects(
            &ctx,
            vec![Effect::EmitCompletion {
                session: session.clone(),
                approved: true,
            }],
        )
        .await;

        match rx.recv().await.unwrap() {
            OutboundSignal::ConsentComplete {
                session: emitted,
                approved,
            } => {
                assert_eq!(emitted, session);
                assert!(approved);
            }
            other => panic!("unexpected signal: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_becomes_a_notification_signal() {
        let (ctx, mut rx) = context();

        execute_effects(
            &ctx,
            vec![Effect::Notify {
                level: NotificationLevel::Warning,
                message: "Bob has declined the meetup".to_string(),
            }],
        )
        .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            OutboundSignal::Notification {
                level: NotificationLevel::Warning,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_schedule_effect_arms_the_scheduler() {
        let (ctx, _rx) = context();
        let session = sample_session();

        execute_effects(
            &ctx,
            vec![Effect::ScheduleReminder {
                session_id: session.id.clone(),
                meetup: session.meetup.clone(),
            }],
        )
        .await;

        assert!(ctx.scheduler.is_scheduled(&session.id).await);
    }
}

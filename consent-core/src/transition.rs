//! Pure transition function for consent sessions.
//!
//! The transition function is the core of the state machine. It takes the
//! current session and an event, and returns the updated session and a
//! list of effects. It is total: rejected events come back as a result
//! whose session is untouched and whose effects surface the failure.
//! The caller supplies `now`, so the function reads no clock and stays
//! deterministic.

use chrono::{DateTime, Utc};

use crate::effect::{Effect, LogLevel, NotificationLevel};
use crate::event::SessionEvent;
use crate::session::{ConsentSession, Decision, ParticipantId, RecordedDecision, SessionStatus};

/// Result of applying one event to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The session after the transition.
    pub session: ConsentSession,
    /// Effects to execute.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: ConsentSession, effects: Vec<Effect>) -> Self {
        Self { session, effects }
    }

    /// A rejected event: session unchanged, failure surfaced as an
    /// error-toned notification plus a warn log.
    pub fn rejected(session: ConsentSession, message: String) -> Self {
        let log = format!("Session {}: rejected event ({})", session.id, message);
        Self {
            session,
            effects: vec![
                Effect::Notify {
                    level: NotificationLevel::Error,
                    message,
                },
                Effect::Log {
                    level: LogLevel::Warn,
                    message: log,
                },
            ],
        }
    }
}

/// Pure transition function.
///
/// Given the current session, an event, and the event's timestamp,
/// returns the updated session and the effects to execute. All side
/// effects are returned as data.
pub fn transition(
    session: ConsentSession,
    event: SessionEvent,
    now: DateTime<Utc>,
) -> TransitionResult {
    match event {
        SessionEvent::DecisionSubmitted {
            participant_id,
            decision,
        } => record_decision(session, participant_id, decision, now),
        SessionEvent::WithdrawalRequested { participant_id } => {
            withdraw(session, participant_id, now)
        }
    }
}

/// Records a turn-based decision from the active participant.
fn record_decision(
    mut session: ConsentSession,
    participant_id: ParticipantId,
    decision: Decision,
    now: DateTime<Utc>,
) -> TransitionResult {
    if !session.status.accepts_decisions() {
        let message = format!("This consent session is already {}", session.status);
        return TransitionResult::rejected(session, message);
    }

    let Some(active) = session.active_participant() else {
        let message = "This consent session has no active participant".to_string();
        return TransitionResult::rejected(session, message);
    };
    if active.id != participant_id {
        let message = format!("Waiting for {} to respond", active.name);
        return TransitionResult::rejected(session, message);
    }
    let actor = active.name.clone();

    match decision {
        Decision::Consent => {
            session.participants[session.current_turn].consented = true;
            session.push_history(participant_id, actor.clone(), RecordedDecision::Consent, now);

            if !session.is_last_turn() {
                // Not the final turn -> hand over to the next participant.
                session.current_turn += 1;
                let next = session
                    .active_participant()
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                let effects = vec![
                    Effect::Notify {
                        level: NotificationLevel::Success,
                        message: format!("{} has consented", actor),
                    },
                    Effect::Log {
                        level: LogLevel::Info,
                        message: format!(
                            "Session {}: {} consented, waiting for {}",
                            session.id, actor, next
                        ),
                    },
                ];
                TransitionResult::new(session, effects)
            } else if session.all_consented() {
                // Final turn and everyone is in -> approved.
                session.status = SessionStatus::Approved;
                let effects = vec![
                    Effect::Notify {
                        level: NotificationLevel::Success,
                        message: format!("{} has consented", actor),
                    },
                    Effect::Log {
                        level: LogLevel::Info,
                        message: format!("Session {}: approved by all participants", session.id),
                    },
                    Effect::EmitCompletion {
                        session: session.clone(),
                        approved: true,
                    },
                    Effect::ScheduleReminder {
                        session_id: session.id.clone(),
                        meetup: session.meetup.clone(),
                    },
                ];
                TransitionResult::new(session, effects)
            } else {
                // Final turn but someone is still out -> start another
                // round of solicitation from the top.
                session.current_turn = 0;
                let effects = vec![
                    Effect::Notify {
                        level: NotificationLevel::Success,
                        message: format!("{} has consented", actor),
                    },
                    Effect::Log {
                        level: LogLevel::Info,
                        message: format!("Session {}: restarting negotiation round", session.id),
                    },
                ];
                TransitionResult::new(session, effects)
            }
        }
        Decision::Decline => {
            // A single decline ends the negotiation; nobody else is asked.
            session.status = SessionStatus::Declined;
            session.push_history(participant_id, actor.clone(), RecordedDecision::Decline, now);
            let effects = vec![
                Effect::Notify {
                    level: NotificationLevel::Warning,
                    message: format!("{} has declined the meetup", actor),
                },
                Effect::Log {
                    level: LogLevel::Info,
                    message: format!("Session {}: declined by {}", session.id, actor),
                },
                Effect::EmitCompletion {
                    session: session.clone(),
                    approved: false,
                },
            ];
            TransitionResult::new(session, effects)
        }
    }
}

/// Revokes a participant's consent, from any status including approved.
fn withdraw(
    mut session: ConsentSession,
    participant_id: ParticipantId,
    now: DateTime<Utc>,
) -> TransitionResult {
    let Some(member) = session
        .participants
        .iter_mut()
        .find(|p| p.id == participant_id)
    else {
        let message = format!("{} is not a participant of this meetup", participant_id);
        return TransitionResult::rejected(session, message);
    };
    member.consented = false;
    let actor = member.name.clone();

    session.push_history(participant_id, actor.clone(), RecordedDecision::Withdraw, now);

    // Completion fires only on the edge into withdrawn; a repeated
    // withdrawal still appends history but emits nothing further.
    let previous = session.status;
    session.status = SessionStatus::Withdrawn;

    let mut effects = vec![
        Effect::Notify {
            level: NotificationLevel::Warning,
            message: format!("{} has withdrawn their consent", actor),
        },
        Effect::Log {
            level: LogLevel::Info,
            message: format!(
                "Session {}: {} withdrew (was {})",
                session.id, actor, previous
            ),
        },
    ];
    if previous != SessionStatus::Withdrawn {
        effects.push(Effect::EmitCompletion {
            session: session.clone(),
            approved: false,
        });
    }
    TransitionResult::new(session, effects)
}

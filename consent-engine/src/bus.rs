//! Typed signal channels in and out of the engine.
//!
//! Inbound signals arrive on an mpsc channel owned by whoever composes
//! the engine; outbound signals fan out on a broadcast bus that any
//! front end, calendar feature, or logger can subscribe to.

use consent_core::{
    ConsentSession, MatchId, MeetupDetails, NotificationLevel, ParticipantId, SessionId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Payload of the "match agreed to meet up" signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAgreed {
    pub match_id: MatchId,
    pub user1_id: ParticipantId,
    pub user1_name: String,
    pub user2_id: ParticipantId,
    pub user2_name: String,
    pub meetup: MeetupDetails,
}

/// Signals consumed by the engine's run loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundSignal {
    /// Two matched users agreed to meet; start a consent session.
    MatchAgreed(MatchAgreed),

    /// A participant revokes consent for an existing session.
    WithdrawConsent {
        session_id: SessionId,
        participant_id: ParticipantId,
    },
}

/// Signals published for external subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OutboundSignal {
    /// The consent process finished; no further decisions will be
    /// solicited for this session.
    ConsentComplete {
        session: ConsentSession,
        approved: bool,
    },

    /// A toast-style notification for the user.
    Notification {
        level: NotificationLevel,
        message: String,
    },

    /// A pre-meetup reminder timer fired.
    MeetupReminder {
        session_id: SessionId,
        meetup: MeetupDetails,
    },
}

impl OutboundSignal {
    /// Returns a short human-readable summary for logging.
    pub fn log_summary(&self) -> String {
        match self {
            Self::ConsentComplete { session, approved } => {
                format!("ConsentComplete({}, approved: {})", session.id, approved)
            }
            Self::Notification { level, message } => {
                format!("Notification({:?}: {})", level, message)
            }
            Self::MeetupReminder { session_id, .. } => {
                format!("MeetupReminder({})", session_id)
            }
        }
    }
}

/// Broadcast bus for outbound signals.
#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<OutboundSignal>,
}

impl SignalBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutboundSignal> {
        self.tx.subscribe()
    }

    pub fn publish(&self, signal: OutboundSignal) {
        // We ignore the error if there are no receivers
        let _ = self.tx.send(signal);
    }
}

/// Logs every signal on the receiver until the bus closes. A receiver
/// that falls behind skips what it missed and keeps logging rather
/// than giving up.
pub async fn log_signals(mut rx: broadcast::Receiver<OutboundSignal>) {
    loop {
        match rx.recv().await {
            Ok(signal) => info!("{}", signal.log_summary()),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Signal logger lagged, skipped {} signal(s)", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

//! Events processed by the consent transition function.

use crate::session::{Decision, ParticipantId};

/// Everything that can happen to a live session.
///
/// Session creation is not an event: a session springs into existence
/// via [`crate::session::ConsentSession::new`] and only then starts
/// receiving events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A turn-based decision from one participant.
    DecisionSubmitted {
        participant_id: ParticipantId,
        decision: Decision,
    },
    /// An out-of-turn request to revoke consent. Valid in any status,
    /// including after approval.
    WithdrawalRequested { participant_id: ParticipantId },
}

impl SessionEvent {
    /// Returns a short human-readable summary for logging.
    pub fn log_summary(&self) -> String {
        match self {
            Self::DecisionSubmitted {
                participant_id,
                decision,
            } => format!("DecisionSubmitted({}, {:?})", participant_id, decision),
            Self::WithdrawalRequested { participant_id } => {
                format!("WithdrawalRequested({})", participant_id)
            }
        }
    }
}

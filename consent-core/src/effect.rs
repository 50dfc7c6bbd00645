//! Effects produced by consent transitions.
//!
//! Effects are descriptions of side effects, returned as data so the
//! transition function stays pure. The engine interprets them: publishing
//! signals, arming reminder timers, emitting log lines.

use crate::session::{ConsentSession, MeetupDetails, SessionId};
use serde::{Deserialize, Serialize};

/// Log levels for Log effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Tone of a user-facing notification (toast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Side effects to execute after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Publish the completion signal: no further decisions will be
    /// solicited for this session. Carries a snapshot of the session as
    /// it stood right after the transition.
    EmitCompletion {
        session: ConsentSession,
        approved: bool,
    },

    /// Arm the one-shot pre-meetup reminder. Produced exactly once per
    /// session, by the transition into `approved`.
    ScheduleReminder {
        session_id: SessionId,
        meetup: MeetupDetails,
    },

    /// Surface a short-lived toast-style notification.
    Notify {
        level: NotificationLevel,
        message: String,
    },

    /// Log a message.
    Log { level: LogLevel, message: String },
}

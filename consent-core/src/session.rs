//! Data model for two-party meetup consent sessions.
//!
//! A session tracks one consent negotiation for a single proposed meetup
//! between two matched users. Following the principle of "make illegal
//! states unrepresentable", participants are a fixed-size array of two;
//! sessions with any other participant count cannot be constructed or
//! deserialized.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Every session has exactly this many participants.
pub const PARTICIPANT_COUNT: usize = 2;

/// Newtype for session IDs to prevent mixing with other strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh opaque ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Newtype for the originating match's ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub String);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Newtype for participant (user) IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One party of the negotiation. Identity fields are supplied externally
/// and never change; `consented` is mutated only by transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub consented: bool,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            consented: false,
        }
    }
}

/// What the participants would be consenting to. Supplied at creation
/// and never mutated by the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetupDetails {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub activity: String,
}

impl MeetupDetails {
    /// The meetup's start instant. Civil date and time are interpreted
    /// as UTC.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.date.and_time(self.time).and_utc()
    }
}

/// A decision supplied by the participant whose turn it is.
///
/// Withdrawal is deliberately not a `Decision`: it is out-of-turn and
/// always available, so it travels as its own event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Consent,
    Decline,
}

/// The action recorded in a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordedDecision {
    Consent,
    Decline,
    Withdraw,
}

impl From<Decision> for RecordedDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Consent => Self::Consent,
            Decision::Decline => Self::Decline,
        }
    }
}

impl fmt::Display for RecordedDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consent => write!(f, "consent"),
            Self::Decline => write!(f, "decline"),
            Self::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Where the negotiation stands.
///
/// `Approved` is not permanently final: either party may still withdraw,
/// moving the session to `Withdrawn`. `Declined` and `Withdrawn` accept
/// no further decisions; a fresh session is created for any renewed
/// negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Approved,
    Declined,
    Withdrawn,
}

impl SessionStatus {
    /// Returns true once no further decisions will be solicited.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Withdrawn)
    }

    /// Returns true while turn-based decisions are still accepted.
    pub fn accepts_decisions(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Declined => write!(f, "declined"),
            Self::Withdrawn => write!(f, "withdrawn"),
        }
    }
}

/// One entry of a session's history.
///
/// Participant identity is a denormalized snapshot taken at event time,
/// not a live reference, so history stays meaningful on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentEvent {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub decision: RecordedDecision,
    pub timestamp: DateTime<Utc>,
}

/// One consent negotiation instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSession {
    pub id: SessionId,
    pub match_id: MatchId,
    /// Order is fixed at creation and determines the turn sequence.
    pub participants: [Participant; PARTICIPANT_COUNT],
    /// Index of the participant expected to respond next.
    /// Invariant: `0 <= current_turn < PARTICIPANT_COUNT`.
    pub current_turn: usize,
    pub meetup: MeetupDetails,
    pub status: SessionStatus,
    /// Append-only; insertion order is chronological order. Entries are
    /// never reordered or removed individually.
    pub history: Vec<ConsentEvent>,
    pub created_at: DateTime<Utc>,
}

impl ConsentSession {
    /// Creates a fresh pending session with the first participant up.
    pub fn new(
        id: SessionId,
        match_id: MatchId,
        participants: [Participant; PARTICIPANT_COUNT],
        meetup: MeetupDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            match_id,
            participants,
            current_turn: 0,
            meetup,
            status: SessionStatus::Pending,
            history: Vec::new(),
            created_at,
        }
    }

    /// The participant whose decision is awaited. `None` only if the
    /// turn index is out of range, which no transition produces.
    pub fn active_participant(&self) -> Option<&Participant> {
        self.participants.get(self.current_turn)
    }

    /// Looks up a participant by ID.
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Returns true when the current turn is the final one.
    pub fn is_last_turn(&self) -> bool {
        self.current_turn + 1 == self.participants.len()
    }

    /// Returns true when every participant has currently consented.
    pub fn all_consented(&self) -> bool {
        self.participants.iter().all(|p| p.consented)
    }

    /// Appends a history entry with a snapshot of the acting participant.
    pub(crate) fn push_history(
        &mut self,
        participant_id: ParticipantId,
        participant_name: impl Into<String>,
        decision: RecordedDecision,
        at: DateTime<Utc>,
    ) {
        self.history.push(ConsentEvent {
            participant_id,
            participant_name: participant_name.into(),
            decision,
            timestamp: at,
        });
    }

    /// Returns true when the session is older than `max_age`. The
    /// comparison is strict, so a session exactly `max_age` old is kept.
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now.signed_duration_since(self.created_at) > max_age
    }
}

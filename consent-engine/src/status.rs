//! Render-ready summaries of store contents.
//!
//! The consent core renders nothing itself; these serializable types
//! are what a front end asks for when it wants to draw session state.

use chrono::{DateTime, Utc};
use consent_core::{ConsentSession, MatchId, SessionId, SessionStatus};
use serde::Serialize;

/// Summary statistics over all live sessions.
#[derive(Debug, Default, Serialize)]
pub struct StatusSummary {
    pub total_sessions: usize,
    pub pending: usize,
    pub approved: usize,
    pub declined: usize,
    pub withdrawn: usize,
}

/// One session entry for display.
#[derive(Debug, Serialize)]
pub struct SessionStatusEntry {
    pub session_id: SessionId,
    pub match_id: MatchId,
    pub status: SessionStatus,
    /// Name of the participant whose decision is awaited, while pending.
    pub awaiting: Option<String>,
    pub location: String,
    pub meetup_starts_at: DateTime<Utc>,
    pub decisions_recorded: usize,
    pub created_at: DateTime<Utc>,
}

/// Full status data for rendering.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub summary: StatusSummary,
    pub sessions: Vec<SessionStatusEntry>,
}

impl StatusReport {
    /// Builds the report from `[id, session]` pairs as the store hands
    /// them out.
    pub fn from_sessions(sessions: &[(SessionId, ConsentSession)]) -> Self {
        let mut summary = StatusSummary {
            total_sessions: sessions.len(),
            ..Default::default()
        };
        let mut entries = Vec::with_capacity(sessions.len());

        for (id, session) in sessions {
            match session.status {
                SessionStatus::Pending => summary.pending += 1,
                SessionStatus::Approved => summary.approved += 1,
                SessionStatus::Declined => summary.declined += 1,
                SessionStatus::Withdrawn => summary.withdrawn += 1,
            }

            let awaiting = if session.status == SessionStatus::Pending {
                session.active_participant().map(|p| p.name.clone())
            } else {
                None
            };

            entries.push(SessionStatusEntry {
                session_id: id.clone(),
                match_id: session.match_id.clone(),
                status: session.status,
                awaiting,
                location: session.meetup.location.clone(),
                meetup_starts_at: session.meetup.starts_at(),
                decisions_recorded: session.history.len(),
                created_at: session.created_at,
            });
        }

        Self {
            summary,
            sessions: entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use consent_core::Participant;

    fn session(id: &str, status: SessionStatus) -> (SessionId, ConsentSession) {
        let mut session = ConsentSession::new(
            SessionId::from(id),
            MatchId::from("match-1"),
            [
                Participant::new("user-1", "Alice"),
                Participant::new("user-2", "Bob"),
            ],
            consent_core::MeetupDetails {
                date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
                time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
                location: "Cafe Luna".to_string(),
                activity: "Coffee".to_string(),
            },
            Utc::now(),
        );
        session.status = status;
        (session.id.clone(), session)
    }

    #[test]
    fn test_summary_counts_by_status() {
        let sessions = vec![
            session("a", SessionStatus::Pending),
            session("b", SessionStatus::Approved),
            session("c", SessionStatus::Approved),
            session("d", SessionStatus::Withdrawn),
        ];

        let report = StatusReport::from_sessions(&sessions);

        assert_eq!(report.summary.total_sessions, 4);
        assert_eq!(report.summary.pending, 1);
        assert_eq!(report.summary.approved, 2);
        assert_eq!(report.summary.declined, 0);
        assert_eq!(report.summary.withdrawn, 1);
        assert_eq!(report.sessions.len(), 4);
    }

    #[test]
    fn test_awaiting_is_set_only_while_pending() {
        let report = StatusReport::from_sessions(&[
            session("a", SessionStatus::Pending),
            session("b", SessionStatus::Declined),
        ]);

        assert_eq!(report.sessions[0].awaiting.as_deref(), Some("Alice"));
        assert_eq!(report.sessions[1].awaiting, None);
    }
}

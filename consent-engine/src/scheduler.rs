//! One-shot pre-meetup reminder timers.
//!
//! A reminder is armed exactly once per session, when the session is
//! approved, and fires at `meetup start - lead`. A meetup already
//! inside the lead window gets no timer; that is silent by design, not
//! an error. Timers are aborted when cleanup removes their session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use consent_core::{MeetupDetails, SessionId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::bus::{OutboundSignal, SignalBus};

pub struct ReminderScheduler {
    lead: Duration,
    bus: SignalBus,
    timers: Arc<Mutex<HashMap<SessionId, JoinHandle<()>>>>,
}

impl ReminderScheduler {
    pub fn new(lead: Duration, bus: SignalBus) -> Self {
        Self {
            lead,
            bus,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Arms the one-shot reminder for a session. Returns the fire
    /// instant, or `None` when the meetup is already within the lead
    /// window (or in the past), in which case no timer exists.
    pub async fn schedule(
        &self,
        session_id: SessionId,
        meetup: MeetupDetails,
    ) -> Option<DateTime<Utc>> {
        let now = Utc::now();
        let remind_at = meetup.starts_at() - self.lead;
        if remind_at <= now {
            debug!(
                "Session {}: meetup within reminder lead, no timer armed",
                session_id
            );
            return None;
        }
        let delay = (remind_at - now).to_std().unwrap_or_default();

        let mut timers = self.timers.lock().await;
        let bus = self.bus.clone();
        let timer_map = Arc::clone(&self.timers);
        let id = session_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("Session {}: meetup reminder due", id);
            bus.publish(OutboundSignal::MeetupReminder {
                session_id: id.clone(),
                meetup,
            });
            timer_map.lock().await.remove(&id);
        });
        if let Some(previous) = timers.insert(session_id.clone(), handle) {
            previous.abort();
        }
        info!("Session {}: reminder armed for {}", session_id, remind_at);
        Some(remind_at)
    }

    /// Aborts the pending reminder for a session. Returns whether one
    /// was armed.
    pub async fn cancel(&self, session_id: &SessionId) -> bool {
        match self.timers.lock().await.remove(session_id) {
            Some(handle) => {
                handle.abort();
                debug!("Session {}: reminder cancelled", session_id);
                true
            }
            None => false,
        }
    }

    /// Returns whether a reminder is currently armed for the session.
    pub async fn is_scheduled(&self, session_id: &SessionId) -> bool {
        self.timers.lock().await.contains_key(session_id)
    }
}

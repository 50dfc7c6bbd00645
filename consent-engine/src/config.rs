use anyhow::{Context, Result};
use chrono::Duration;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Snapshot file name inside the state directory.
pub const SNAPSHOT_FILE: &str = "consent-sessions.json";

const DEFAULT_REMINDER_LEAD_HOURS: u32 = 24;
const DEFAULT_SESSION_MAX_AGE_HOURS: u32 = 24;
const DEFAULT_BUS_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for persistent state (the session snapshot file).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    /// How long before the meetup the reminder fires.
    pub reminder_lead_hours: u32,
    /// Sessions older than this are eligible for cleanup, unless
    /// approved.
    pub session_max_age_hours: u32,
    /// Buffer size of the outbound broadcast bus.
    pub bus_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let state_dir = env::var("CONSENT_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let reminder_lead_hours = parse_number(
            "CONSENT_REMINDER_LEAD_HOURS",
            env::var("CONSENT_REMINDER_LEAD_HOURS").ok(),
            DEFAULT_REMINDER_LEAD_HOURS,
        )?;

        let session_max_age_hours = parse_number(
            "CONSENT_SESSION_MAX_AGE_HOURS",
            env::var("CONSENT_SESSION_MAX_AGE_HOURS").ok(),
            DEFAULT_SESSION_MAX_AGE_HOURS,
        )?;

        let bus_capacity = parse_number(
            "CONSENT_BUS_CAPACITY",
            env::var("CONSENT_BUS_CAPACITY").ok(),
            DEFAULT_BUS_CAPACITY,
        )?;

        Ok(Config {
            state_dir,
            reminder_lead_hours,
            session_max_age_hours,
            bus_capacity,
        })
    }

    /// Where the session snapshot lives.
    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join(SNAPSHOT_FILE)
    }

    pub fn reminder_lead(&self) -> Duration {
        Duration::hours(i64::from(self.reminder_lead_hours))
    }

    pub fn session_max_age(&self) -> Duration {
        Duration::hours(i64::from(self.session_max_age_hours))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            reminder_lead_hours: DEFAULT_REMINDER_LEAD_HOURS,
            session_max_age_hours: DEFAULT_SESSION_MAX_AGE_HOURS,
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }
}

/// Parse an optional numeric environment value, falling back to a
/// default when unset. Empty and whitespace-only values count as unset.
pub fn parse_number<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value.filter(|s| !s.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_unset_uses_default() {
        assert_eq!(parse_number("LEAD", None, 24u32).unwrap(), 24);
    }

    #[test]
    fn test_parse_number_empty_counts_as_unset() {
        assert_eq!(parse_number("LEAD", Some("".to_string()), 24u32).unwrap(), 24);
        assert_eq!(
            parse_number("LEAD", Some("   ".to_string()), 24u32).unwrap(),
            24
        );
    }

    #[test]
    fn test_parse_number_valid_value() {
        assert_eq!(
            parse_number("LEAD", Some("36".to_string()), 24u32).unwrap(),
            36
        );
        assert_eq!(
            parse_number("LEAD", Some(" 12 ".to_string()), 24u32).unwrap(),
            12
        );
    }

    #[test]
    fn test_parse_number_invalid_value_names_the_variable() {
        let error = parse_number("CONSENT_BUS_CAPACITY", Some("lots".to_string()), 100usize)
            .unwrap_err();
        assert!(error.to_string().contains("CONSENT_BUS_CAPACITY"));
    }

    #[test]
    fn test_default_durations() {
        let config = Config::default();
        assert_eq!(config.reminder_lead(), Duration::hours(24));
        assert_eq!(config.session_max_age(), Duration::hours(24));
        assert_eq!(config.bus_capacity, 100);
    }

    #[test]
    fn test_snapshot_path_joins_state_dir() {
        let config = Config {
            state_dir: PathBuf::from("/var/lib/consent"),
            ..Config::default()
        };
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/var/lib/consent/consent-sessions.json")
        );
    }
}

//! JSON-file snapshot backend.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use consent_core::{ConsentSession, SessionId};
use tokio::task;

use super::{Snapshot, SnapshotRepository};

/// Persists the snapshot as one pretty-printed JSON document at a
/// fixed path. Every save rewrites the whole document.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    /// Creates the backend, making sure the parent directory exists.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create snapshot directory {:?}", parent))?;
            }
        }
        Ok(Self { path })
    }
}

#[async_trait]
impl SnapshotRepository for JsonFileRepository {
    async fn load(&self) -> Result<Snapshot> {
        let path = self.path.clone();
        task::spawn_blocking(move || {
            if !path.exists() {
                return Ok(Vec::new());
            }
            let json = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read snapshot file {:?}", path))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Failed to deserialize snapshot file {:?}", path))
        })
        .await
        .context("Snapshot load task panicked")?
    }

    async fn save(&self, sessions: &[(SessionId, ConsentSession)]) -> Result<()> {
        let json = serde_json::to_string_pretty(sessions)
            .context("Failed to serialize session snapshot")?;
        let path = self.path.clone();
        task::spawn_blocking(move || {
            fs::write(&path, json)
                .with_context(|| format!("Failed to write snapshot file {:?}", path))
        })
        .await
        .context("Snapshot save task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use consent_core::{MatchId, MeetupDetails, Participant};
    use tempfile::TempDir;

    fn sample_session(id: &str) -> (SessionId, ConsentSession) {
        let session = ConsentSession::new(
            SessionId::from(id),
            MatchId::from("match-1"),
            [
                Participant::new("user-1", "Alice"),
                Participant::new("user-2", "Bob"),
            ],
            MeetupDetails {
                date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
                time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
                location: "Cafe Luna".to_string(),
                activity: "Coffee".to_string(),
            },
            Utc::now(),
        );
        (session.id.clone(), session)
    }

    #[tokio::test]
    async fn test_round_trips_sessions_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("consent-sessions.json");

        let saved = vec![sample_session("session-1"), sample_session("session-2")];
        JsonFileRepository::new(&path)
            .unwrap()
            .save(&saved)
            .await
            .unwrap();

        let loaded = JsonFileRepository::new(&path).unwrap().load().await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let repository = JsonFileRepository::new(dir.path().join("never-written.json")).unwrap();
        assert!(repository.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("consent-sessions.json");

        let repository = JsonFileRepository::new(&path).unwrap();
        repository.save(&[sample_session("session-1")]).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_list_of_id_session_pairs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("consent-sessions.json");

        JsonFileRepository::new(&path)
            .unwrap()
            .save(&[sample_session("session-1")])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let pairs = value.as_array().unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0][0], serde_json::json!("session-1"));
        assert_eq!(pairs[0][1]["status"], serde_json::json!("pending"));
        assert_eq!(pairs[0][1]["participants"].as_array().unwrap().len(), 2);
    }
}

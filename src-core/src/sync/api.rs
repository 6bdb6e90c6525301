//! Remote mood API
//!
//! `MoodApi` is the seam between the sync service and the backend. The
//! production implementation talks to a Supabase REST endpoint; tests plug
//! in a fake.

use crate::config::{RemoteConfig, REMOTE_MOODS_TABLE, REMOTE_REQUEST_TIMEOUT_SECS};
use crate::database::{MoodEntry, MoodType};
use crate::dates::to_iso_string;
use crate::error::{AppError, Result};
use crate::services::AuthTokenService;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Row sent to the remote moods table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodInsert {
    pub user_id: String,
    pub mood_type: MoodType,
    /// Empty notes are sent as null
    pub note: Option<String>,
    /// ISO-8601 with millisecond precision
    pub created_at: String,
}

impl From<&MoodEntry> for MoodInsert {
    fn from(entry: &MoodEntry) -> Self {
        Self {
            user_id: entry.user_id.clone(),
            mood_type: entry.mood,
            note: (!entry.note.is_empty()).then(|| entry.note.clone()),
            created_at: to_iso_string(&entry.timestamp),
        }
    }
}

/// Row returned by the remote after an insert
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteMood {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood_type: MoodType,
    #[serde(default)]
    pub mood_types: Option<Vec<MoodType>>,
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Remote store for mood entries
#[async_trait]
pub trait MoodApi: Send + Sync {
    /// Insert one mood and return the stored row
    async fn create(&self, mood: MoodInsert) -> Result<RemoteMood>;
}

/// Validate a remote insert response. PostgREST answers with an array.
pub fn parse_created_mood(body: &str) -> Result<RemoteMood> {
    let rows: Vec<RemoteMood> = serde_json::from_str(body)
        .map_err(|e| AppError::Remote(format!("Invalid mood data received from server: {}", e)))?;

    rows.into_iter()
        .next()
        .ok_or_else(|| AppError::Remote("No data returned from insert".to_string()))
}

/// `MoodApi` over the Supabase REST interface
#[derive(Debug, Clone)]
pub struct SupabaseMoodApi {
    config: RemoteConfig,
    tokens: AuthTokenService,
    client: Client,
}

impl SupabaseMoodApi {
    pub fn new(config: RemoteConfig, tokens: AuthTokenService) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REMOTE_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            config,
            tokens,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, REMOTE_MOODS_TABLE)
    }
}

#[async_trait]
impl MoodApi for SupabaseMoodApi {
    async fn create(&self, mood: MoodInsert) -> Result<RemoteMood> {
        let token = self
            .tokens
            .valid_token(Utc::now())
            .await
            .ok_or_else(|| AppError::Remote("Not authenticated".to_string()))?;

        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&token.access_token)
            .header("Prefer", "return=representation")
            .json(&mood)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("Mood insert rejected with {}: {}", status, body);
            return Err(AppError::Remote(format!(
                "Mood insert failed ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let created = parse_created_mood(&body)?;
        tracing::debug!("Remote mood created: {}", created.id);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn entry(note: &str) -> MoodEntry {
        MoodEntry {
            id: 3,
            user_id: "5f8e2c1a-3b4d-4e6f-8a9b-0c1d2e3f4a5b".to_string(),
            mood: MoodType::Grateful,
            moods: vec![MoodType::Grateful, MoodType::Loved],
            note: note.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 14, 8, 30, 0).unwrap(),
            synced: false,
            supabase_id: None,
        }
    }

    #[test]
    fn test_insert_mapping() {
        let insert = MoodInsert::from(&entry("Great day"));
        assert_eq!(insert.mood_type, MoodType::Grateful);
        assert_eq!(insert.note.as_deref(), Some("Great day"));
        assert_eq!(insert.created_at, "2025-11-14T08:30:00.000Z");

        let json = serde_json::to_value(&insert).unwrap();
        assert_eq!(json["mood_type"], "grateful");
    }

    #[test]
    fn test_empty_note_sent_as_null() {
        let insert = MoodInsert::from(&entry(""));
        assert!(insert.note.is_none());
        let json = serde_json::to_value(&insert).unwrap();
        assert!(json["note"].is_null());
    }

    #[test]
    fn test_parse_created_mood() {
        let body = r#"[{
            "id": "0b7a6c52-9d3e-4f1a-b2c4-d5e6f7a8b9c0",
            "user_id": "5f8e2c1a-3b4d-4e6f-8a9b-0c1d2e3f4a5b",
            "mood_type": "happy",
            "note": null,
            "created_at": "2025-11-14T08:30:00.000Z",
            "updated_at": null
        }]"#;

        let mood = parse_created_mood(body).unwrap();
        assert_eq!(mood.id.to_string(), "0b7a6c52-9d3e-4f1a-b2c4-d5e6f7a8b9c0");
        assert_eq!(mood.mood_type, MoodType::Happy);
    }

    #[test]
    fn test_parse_rejects_bad_responses() {
        let bad_id = r#"[{"id": "not-a-uuid", "user_id": "5f8e2c1a-3b4d-4e6f-8a9b-0c1d2e3f4a5b", "mood_type": "happy", "note": null}]"#;
        assert!(matches!(parse_created_mood(bad_id), Err(AppError::Remote(_))));
        assert!(matches!(parse_created_mood("[]"), Err(AppError::Remote(_))));
    }
}

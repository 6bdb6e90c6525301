//! Mood sync service
//!
//! Uploads unsynced mood entries to the remote store. Each entry is
//! independent: one failure never stops the others, and only entries the
//! remote accepted are marked synced locally.

use crate::database::MoodEntry;
use crate::services::MoodsService;
use crate::sync::api::{MoodApi, MoodInsert};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;

/// Outcome for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSyncResult {
    /// -1 when the entry had no local id
    pub local_id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoodSyncResult {
    fn failed(local_id: i64, error: impl Into<String>) -> Self {
        Self {
            local_id,
            success: false,
            supabase_id: None,
            error: Some(error.into()),
        }
    }
}

/// Totals for one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<MoodSyncResult>,
}

/// Service for pushing local moods to the remote store
#[derive(Clone)]
pub struct SyncService {
    moods: MoodsService,
    api: Arc<dyn MoodApi>,
}

impl SyncService {
    pub fn new(moods: MoodsService, api: Arc<dyn MoodApi>) -> Self {
        Self { moods, api }
    }

    /// Upload every unsynced entry. A failed read yields an empty summary.
    pub async fn sync_pending(&self) -> SyncSummary {
        let pending = match self.moods.unsynced_moods().await {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!("Sync aborted, could not read unsynced moods: {}", e);
                return SyncSummary::default();
            }
        };

        if pending.is_empty() {
            tracing::debug!("No moods waiting for sync");
            return SyncSummary::default();
        }

        tracing::info!("Starting sync for {} unsynced moods", pending.len());

        let results = join_all(pending.iter().map(|entry| self.sync_one(entry))).await;
        let successful = results.iter().filter(|r| r.success).count();

        let summary = SyncSummary {
            total: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        };

        tracing::info!(
            "Sync complete: {}/{} successful, {} failed",
            summary.successful,
            summary.total,
            summary.failed
        );
        summary
    }

    async fn sync_one(&self, entry: &MoodEntry) -> MoodSyncResult {
        let Some(local_id) = entry.local_id() else {
            tracing::warn!("Skipping mood without a local id");
            return MoodSyncResult::failed(-1, "Mood entry missing local ID");
        };

        let created = match self.api.create(MoodInsert::from(entry)).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("Failed to sync mood {}: {}", local_id, e);
                return MoodSyncResult::failed(local_id, e.to_string());
            }
        };

        let remote_id = created.id.to_string();
        match self.moods.mark_uploaded(entry, &remote_id).await {
            Ok(true) => {}
            Ok(false) => {
                return MoodSyncResult::failed(local_id, "Mood entry changed during upload");
            }
            Err(e) => {
                tracing::error!("Mood {} uploaded but could not be marked synced: {}", local_id, e);
                return MoodSyncResult::failed(local_id, e.to_string());
            }
        }

        tracing::debug!("Synced mood {} as {}", local_id, remote_id);
        MoodSyncResult {
            local_id,
            success: true,
            supabase_id: Some(remote_id),
            error: None,
        }
    }

    pub async fn has_pending_sync(&self) -> bool {
        self.get_pending_count().await > 0
    }

    pub async fn get_pending_count(&self) -> usize {
        match self.moods.unsynced_moods().await {
            Ok(pending) => pending.len(),
            Err(e) => {
                tracing::error!("Failed to count pending moods: {}", e);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DB_VERSION;
    use crate::database::{LocalStore, MoodType, Repository};
    use crate::error::{AppError, Result};
    use crate::sync::api::RemoteMood;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use uuid::Uuid;

    /// Rejects inserts whose note is in `fail_notes`
    #[derive(Default)]
    struct FakeMoodApi {
        fail_notes: Vec<&'static str>,
        calls: Mutex<Vec<MoodInsert>>,
    }

    #[async_trait]
    impl MoodApi for FakeMoodApi {
        async fn create(&self, mood: MoodInsert) -> Result<RemoteMood> {
            self.calls.lock().unwrap().push(mood.clone());

            if let Some(note) = mood.note.as_deref() {
                if self.fail_notes.contains(&note) {
                    return Err(AppError::Remote(format!("rejected {}", note)));
                }
            }

            Ok(RemoteMood {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                mood_type: mood.mood_type,
                mood_types: None,
                note: mood.note,
                created_at: Some(mood.created_at),
                updated_at: None,
            })
        }
    }

    async fn setup(api: FakeMoodApi) -> (SyncService, MoodsService, Arc<FakeMoodApi>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("test.sqlite"), DB_VERSION)
            .await
            .unwrap();
        let moods = MoodsService::new(Repository::new(store));
        let api = Arc::new(api);
        let sync = SyncService::new(moods.clone(), api.clone());
        (sync, moods, api, temp_dir)
    }

    async fn log_mood(moods: &MoodsService, day: u32, note: &str) -> MoodEntry {
        moods
            .create_for_date(
                "user-1",
                vec![MoodType::Happy],
                Some(note.to_string()),
                NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            )
            .await
            .unwrap()
    }

    /// Edits the entry for the uploaded date while the upload is in flight
    struct EditingMoodApi {
        moods: MoodsService,
        date: NaiveDate,
    }

    #[async_trait]
    impl MoodApi for EditingMoodApi {
        async fn create(&self, mood: MoodInsert) -> Result<RemoteMood> {
            let entry = self.moods.get_mood_for_date(self.date).await.unwrap();
            self.moods
                .update_mood(entry.id, vec![MoodType::Loved], Some("edited".into()))
                .await?;

            Ok(RemoteMood {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                mood_type: mood.mood_type,
                mood_types: None,
                note: mood.note,
                created_at: Some(mood.created_at),
                updated_at: None,
            })
        }
    }

    #[tokio::test]
    async fn test_nothing_pending() {
        let (sync, _moods, api, _temp) = setup(FakeMoodApi::default()).await;

        let summary = sync.sync_pending().await;
        assert_eq!(summary, SyncSummary::default());
        assert!(!sync.has_pending_sync().await);
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure() {
        let api = FakeMoodApi {
            fail_notes: vec!["two", "four"],
            ..FakeMoodApi::default()
        };
        let (sync, moods, _api, _temp) = setup(api).await;

        let mut entries = Vec::new();
        for (day, note) in [(1, "one"), (2, "two"), (3, "three"), (4, "four")] {
            entries.push(log_mood(&moods, day, note).await);
        }
        assert_eq!(sync.get_pending_count().await, 4);

        let summary = sync.sync_pending().await;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 2);

        let failed: Vec<_> = summary.results.iter().filter(|r| !r.success).collect();
        assert!(failed.iter().all(|r| r.error.as_deref().unwrap().starts_with("rejected")));

        let unsynced: Vec<_> = moods.get_unsynced_moods().await.iter().map(|m| m.id).collect();
        assert_eq!(unsynced, vec![entries[1].id, entries[3].id]);

        let first = moods.get(entries[0].id).await.unwrap();
        assert!(first.synced);
        assert!(first.supabase_id.is_some());
    }

    #[tokio::test]
    async fn test_synced_entries_not_resent() {
        let (sync, moods, api, _temp) = setup(FakeMoodApi::default()).await;
        log_mood(&moods, 5, "").await;

        assert_eq!(sync.sync_pending().await.successful, 1);
        assert_eq!(sync.sync_pending().await.total, 0);
        assert_eq!(api.calls.lock().unwrap().len(), 1);
        assert!(api.calls.lock().unwrap()[0].note.is_none());
    }

    #[tokio::test]
    async fn test_entry_without_local_id_fails_without_upload() {
        let (sync, _moods, api, _temp) = setup(FakeMoodApi::default()).await;
        let entry = MoodEntry {
            id: 0,
            user_id: "user-1".to_string(),
            mood: MoodType::Content,
            moods: vec![MoodType::Content],
            note: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 11, 6).unwrap(),
            timestamp: chrono::Utc::now(),
            synced: false,
            supabase_id: None,
        };

        let result = sync.sync_one(&entry).await;
        assert_eq!(result, MoodSyncResult::failed(-1, "Mood entry missing local ID"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_during_upload_is_not_marked_synced() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("test.sqlite"), DB_VERSION)
            .await
            .unwrap();
        let moods = MoodsService::new(Repository::new(store));
        let date = NaiveDate::from_ymd_opt(2025, 11, 8).unwrap();
        let sync = SyncService::new(
            moods.clone(),
            Arc::new(EditingMoodApi {
                moods: moods.clone(),
                date,
            }),
        );
        log_mood(&moods, 8, "original").await;

        let summary = sync.sync_pending().await;
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.results[0].error.as_deref(),
            Some("Mood entry changed during upload")
        );

        let stored = moods.get_mood_for_date(date).await.unwrap();
        assert_eq!(stored.note, "edited");
        assert!(!stored.synced);
        assert_eq!(sync.get_pending_count().await, 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let moods = MoodsService::new(Repository::new(LocalStore::unavailable(temp_dir.path())));
        let api = Arc::new(FakeMoodApi::default());
        let sync = SyncService::new(moods, api.clone());

        assert_eq!(sync.sync_pending().await, SyncSummary::default());
        assert_eq!(sync.get_pending_count().await, 0);
        assert!(!sync.has_pending_sync().await);
        assert!(api.calls.lock().unwrap().is_empty());
    }
}

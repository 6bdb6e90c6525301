//! Moods service
//!
//! One mood entry per calendar date. Submitting again for a date updates
//! the existing entry in place and marks it for re-sync. Only the sync
//! service flips `synced` to true.

use crate::database::{MoodEntry, MoodType, NewMood, Repository};
use crate::dates::{format_date, now_millis, today_utc};
use crate::error::{AppError, Result};
use crate::validation::validate_mood_fields;
use chrono::NaiveDate;

/// Validate and return the primary (first) mood
fn validate(date: NaiveDate, moods: &[MoodType], note: &str) -> Result<MoodType> {
    validate_mood_fields(&format_date(date), moods, note)?;
    moods
        .first()
        .copied()
        .ok_or_else(|| AppError::Generic("At least one mood must be selected".to_string()))
}

/// Service for managing mood entries
#[derive(Clone, Debug)]
pub struct MoodsService {
    repo: Repository,
}

impl MoodsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Record today's mood (UTC date)
    pub async fn create(
        &self,
        user_id: &str,
        moods: Vec<MoodType>,
        note: Option<String>,
    ) -> Result<MoodEntry> {
        self.create_for_date(user_id, moods, note, today_utc()).await
    }

    /// Record the mood for `date`, updating an existing entry for that date
    pub async fn create_for_date(
        &self,
        user_id: &str,
        moods: Vec<MoodType>,
        note: Option<String>,
        date: NaiveDate,
    ) -> Result<MoodEntry> {
        let note = note.unwrap_or_default();
        let mood = validate(date, &moods, &note)?;

        let saved = self
            .repo
            .upsert_mood_for_date(&NewMood {
                user_id: user_id.to_string(),
                mood,
                moods,
                note,
                date,
                timestamp: now_millis(),
            })
            .await?;

        tracing::info!("Saved mood entry {} for {}", saved.id, format_date(date));
        Ok(saved)
    }

    /// Replace the moods and note of an entry; its date never changes
    pub async fn update_mood(
        &self,
        id: i64,
        moods: Vec<MoodType>,
        note: Option<String>,
    ) -> Result<MoodEntry> {
        let existing = self
            .repo
            .get_mood(id)
            .await?
            .ok_or_else(|| AppError::not_found("moods", id))?;

        let note = note.unwrap_or_default();
        let mood = validate(existing.date, &moods, &note)?;

        let updated = self
            .repo
            .put_mood(&MoodEntry {
                mood,
                moods,
                note,
                timestamp: now_millis(),
                synced: false,
                ..existing
            })
            .await?;

        tracing::info!("Updated mood entry {}", id);
        Ok(updated)
    }

    pub async fn get(&self, id: i64) -> Option<MoodEntry> {
        match self.repo.get_mood(id).await {
            Ok(mood) => mood,
            Err(e) => {
                tracing::error!("Failed to get mood {}: {}", id, e);
                None
            }
        }
    }

    pub async fn get_mood_for_date(&self, date: NaiveDate) -> Option<MoodEntry> {
        match self.repo.get_mood_by_date(date).await {
            Ok(mood) => {
                tracing::debug!(
                    "Mood for {}: {}",
                    format_date(date),
                    if mood.is_some() { "found" } else { "not found" }
                );
                mood
            }
            Err(e) => {
                tracing::error!("Error getting mood for date {}: {}", format_date(date), e);
                None
            }
        }
    }

    /// Entries between `start` and `end` inclusive, ordered by date
    pub async fn get_moods_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<MoodEntry> {
        self.repo
            .list_moods_in_range(start, end)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Error getting moods in range: {}", e);
                Vec::new()
            })
    }

    pub async fn get_unsynced_moods(&self) -> Vec<MoodEntry> {
        self.unsynced_moods().await.unwrap_or_else(|e| {
            tracing::error!("Error getting unsynced moods: {}", e);
            Vec::new()
        })
    }

    /// Unsynced entries, propagating storage errors
    pub async fn unsynced_moods(&self) -> Result<Vec<MoodEntry>> {
        self.repo.list_unsynced_moods().await
    }

    /// Record a successful upload
    pub async fn mark_as_synced(&self, id: i64, remote_id: &str) -> Result<()> {
        self.repo.mark_mood_synced(id, remote_id).await?;
        tracing::info!("Marked mood {} as synced (remote id {})", id, remote_id);
        Ok(())
    }

    /// Mark an uploaded entry synced unless it was edited after `uploaded`
    /// was read. Returns whether it was marked.
    pub async fn mark_uploaded(&self, uploaded: &MoodEntry, remote_id: &str) -> Result<bool> {
        let marked = self
            .repo
            .mark_mood_synced_if_unchanged(uploaded, remote_id)
            .await?;
        if marked {
            tracing::info!("Marked mood {} as synced (remote id {})", uploaded.id, remote_id);
        } else {
            tracing::warn!("Mood {} was edited during upload, keeping it pending", uploaded.id);
        }
        Ok(marked)
    }

    pub async fn get_all(&self) -> Vec<MoodEntry> {
        self.repo.list_moods().await.unwrap_or_else(|e| {
            tracing::error!("Error getting moods: {}", e);
            Vec::new()
        })
    }

    /// Deleting an absent id is a no-op
    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.repo.delete_mood(id).await? {
            tracing::info!("Deleted mood entry {}", id);
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        tracing::info!("Clearing all moods");
        self.repo.clear_moods().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DB_VERSION;
    use crate::database::LocalStore;
    use tempfile::TempDir;

    async fn create_test_service() -> (MoodsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(temp_dir.path().join("test.sqlite"), DB_VERSION)
            .await
            .unwrap();
        (MoodsService::new(Repository::new(store)), temp_dir)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_today() {
        let (service, _temp) = create_test_service().await;

        let entry = service
            .create("user-1", vec![MoodType::Grateful, MoodType::Happy], None)
            .await
            .unwrap();

        assert_eq!(entry.mood, MoodType::Grateful);
        assert_eq!(entry.moods.len(), 2);
        assert_eq!(entry.note, "");
        assert_eq!(entry.date, today_utc());
        assert!(!entry.synced);
        assert!(entry.supabase_id.is_none());
    }

    #[tokio::test]
    async fn test_second_submission_updates_same_entry() {
        let (service, _temp) = create_test_service().await;

        let first = service
            .create_for_date("user-1", vec![MoodType::Happy], Some("morning".into()), day(14))
            .await
            .unwrap();
        service.mark_as_synced(first.id, "remote-1").await.unwrap();

        let second = service
            .create_for_date("user-1", vec![MoodType::Thoughtful], Some("evening".into()), day(14))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.mood, MoodType::Thoughtful);
        assert_eq!(second.note, "evening");
        assert!(!second.synced);
        assert_eq!(service.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_mood_keeps_date() {
        let (service, _temp) = create_test_service().await;
        let entry = service
            .create_for_date("user-1", vec![MoodType::Content], None, day(1))
            .await
            .unwrap();

        let updated = service
            .update_mood(entry.id, vec![MoodType::Loved], Some("better".into()))
            .await
            .unwrap();
        assert_eq!(updated.date, day(1));
        assert_eq!(updated.mood, MoodType::Loved);
        assert!(updated.timestamp >= entry.timestamp);

        let err = service
            .update_mood(9999, vec![MoodType::Loved], None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_moods_and_long_note() {
        let (service, _temp) = create_test_service().await;

        let err = service
            .create_for_date("user-1", vec![], Some("x".repeat(201)), day(2))
            .await
            .unwrap_err();

        let fields = err.field_errors().unwrap();
        assert!(fields.contains_key("moods"));
        assert!(fields.contains_key("note"));
        assert!(service.get_mood_for_date(day(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_range_and_unsynced() {
        let (service, _temp) = create_test_service().await;
        for d in [5, 3, 9, 7] {
            service
                .create_for_date("user-1", vec![MoodType::Happy], None, day(d))
                .await
                .unwrap();
        }

        let range = service.get_moods_in_range(day(3), day(7)).await;
        let dates: Vec<_> = range.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![day(3), day(5), day(7)]);

        service.mark_as_synced(range[0].id, "r").await.unwrap();
        assert_eq!(service.get_unsynced_moods().await.len(), 3);

        let err = service.mark_as_synced(12345, "r").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_share_one_entry() {
        let (service, _temp) = create_test_service().await;

        for d in 1..=10 {
            let (a, b) = tokio::join!(
                service.create_for_date("user-1", vec![MoodType::Happy], None, day(d)),
                service.create_for_date("user-1", vec![MoodType::Loved], None, day(d)),
            );
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_eq!(a.id, b.id);
        }

        assert_eq!(service.get_all().await.len(), 10);
    }

    #[tokio::test]
    async fn test_edit_during_upload_stays_pending() {
        let (service, _temp) = create_test_service().await;
        let uploaded = service
            .create_for_date("user-1", vec![MoodType::Happy], Some("draft".into()), day(12))
            .await
            .unwrap();

        service
            .update_mood(uploaded.id, vec![MoodType::Happy], Some("edited".into()))
            .await
            .unwrap();

        assert!(!service.mark_uploaded(&uploaded, "remote-1").await.unwrap());
        let pending = service.get_unsynced_moods().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].note, "edited");
    }

    #[tokio::test]
    async fn test_reads_degrade_when_store_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let service = MoodsService::new(Repository::new(LocalStore::unavailable(temp_dir.path())));

        assert!(service.get_mood_for_date(day(1)).await.is_none());
        assert!(service.get(1).await.is_none());
        assert!(service.get_moods_in_range(day(1), day(30)).await.is_empty());
        assert!(service.get_unsynced_moods().await.is_empty());
        assert!(service.get_all().await.is_empty());

        // Writes and the propagating read still report the failure
        assert!(service.unsynced_moods().await.is_err());
        assert!(service
            .create_for_date("user-1", vec![MoodType::Happy], None, day(1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let (service, _temp) = create_test_service().await;
        let entry = service
            .create_for_date("user-1", vec![MoodType::Happy], None, day(10))
            .await
            .unwrap();

        service.delete(entry.id).await.unwrap();
        service.delete(entry.id).await.unwrap();
        assert!(service.get(entry.id).await.is_none());

        service
            .create_for_date("user-1", vec![MoodType::Happy], None, day(11))
            .await
            .unwrap();
        service.clear().await.unwrap();
        assert!(service.get_all().await.is_empty());
    }
}

//! Repository layer for database operations
//!
//! Raw CRUD over the local store. Rows are mapped through private row
//! structs into the public models; a row that cannot be mapped surfaces as
//! [`AppError::CorruptRecord`]. Every method propagates errors; the service
//! layer decides which reads degrade.

use super::models::*;
use super::LocalStore;
use crate::dates::{format_date, parse_iso_date, parse_timestamp, to_iso_string};
use crate::error::{AppError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use sqlx::FromRow;

const MESSAGES: &str = "messages";
const PHOTOS: &str = "photos";
const MOODS: &str = "moods";

fn timestamp(collection: &'static str, value: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value)
        .ok_or_else(|| AppError::corrupt(collection, format!("invalid timestamp '{}'", value)))
}

fn json_list<T: DeserializeOwned>(collection: &'static str, value: &str) -> Result<Vec<T>> {
    serde_json::from_str(value).map_err(|e| AppError::corrupt(collection, e.to_string()))
}

fn json_text<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    text: String,
    category: String,
    is_custom: bool,
    active: bool,
    is_favorite: bool,
    created_at: String,
    updated_at: Option<String>,
    tags_json: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: row.id,
            category: row
                .category
                .parse()
                .map_err(|e: String| AppError::corrupt(MESSAGES, e))?,
            text: row.text,
            is_custom: row.is_custom,
            active: row.active,
            is_favorite: row.is_favorite,
            created_at: timestamp(MESSAGES, &row.created_at)?,
            updated_at: row
                .updated_at
                .as_deref()
                .map(|v| timestamp(MESSAGES, v))
                .transpose()?,
            tags: json_list(MESSAGES, &row.tags_json)?,
        })
    }
}

#[derive(FromRow)]
struct PhotoRow {
    id: i64,
    image_blob: Vec<u8>,
    caption: String,
    tags_json: String,
    upload_date: String,
    original_size: i64,
    compressed_size: i64,
    width: i64,
    height: i64,
    mime_type: String,
}

impl TryFrom<PhotoRow> for Photo {
    type Error = AppError;

    fn try_from(row: PhotoRow) -> Result<Self> {
        Ok(Photo {
            id: row.id,
            image_blob: row.image_blob,
            caption: row.caption,
            tags: json_list(PHOTOS, &row.tags_json)?,
            upload_date: timestamp(PHOTOS, &row.upload_date)?,
            original_size: row.original_size,
            compressed_size: row.compressed_size,
            width: row.width,
            height: row.height,
            mime_type: row
                .mime_type
                .parse()
                .map_err(|e: String| AppError::corrupt(PHOTOS, e))?,
        })
    }
}

#[derive(FromRow)]
struct MoodRow {
    id: i64,
    user_id: String,
    mood: String,
    moods_json: String,
    note: String,
    date: String,
    timestamp: String,
    synced: bool,
    supabase_id: Option<String>,
}

impl TryFrom<MoodRow> for MoodEntry {
    type Error = AppError;

    fn try_from(row: MoodRow) -> Result<Self> {
        Ok(MoodEntry {
            id: row.id,
            mood: row
                .mood
                .parse()
                .map_err(|e: String| AppError::corrupt(MOODS, e))?,
            moods: json_list(MOODS, &row.moods_json)?,
            date: parse_iso_date(&row.date)
                .ok_or_else(|| AppError::corrupt(MOODS, format!("invalid date '{}'", row.date)))?,
            timestamp: timestamp(MOODS, &row.timestamp)?,
            user_id: row.user_id,
            note: row.note,
            synced: row.synced,
            supabase_id: row.supabase_id,
        })
    }
}

#[derive(FromRow)]
struct AuthTokenRow {
    id: String,
    access_token: String,
    refresh_token: String,
    expires_at: i64,
    user_id: String,
}

impl From<AuthTokenRow> for StoredAuthToken {
    fn from(row: AuthTokenRow) -> Self {
        StoredAuthToken {
            id: row.id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
            user_id: row.user_id,
        }
    }
}

fn map_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Repository for database operations
#[derive(Clone, Debug)]
pub struct Repository {
    store: LocalStore,
}

impl Repository {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    // ===== Messages =====

    /// Insert a message; the store assigns the id
    pub async fn insert_message(&self, message: &NewMessage) -> Result<Message> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (text, category, is_custom, active, is_favorite, created_at, updated_at, tags_json)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&message.text)
        .bind(message.category.as_str())
        .bind(message.is_custom)
        .bind(message.active)
        .bind(message.is_favorite)
        .bind(to_iso_string(&message.created_at))
        .bind(message.updated_at.as_ref().map(to_iso_string))
        .bind(json_text(&message.tags)?)
        .fetch_one(&pool)
        .await?;

        tracing::debug!("Created message: {}", row.id);
        Message::try_from(row)
    }

    /// Insert many messages in one transaction, returning the new ids in order
    pub async fn insert_messages(&self, messages: &[NewMessage]) -> Result<Vec<i64>> {
        let pool = self.store.pool().await?;
        let mut tx = pool.begin().await?;
        let mut ids = Vec::with_capacity(messages.len());

        for message in messages {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO messages (text, category, is_custom, active, is_favorite, created_at, updated_at, tags_json)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING id
                "#,
            )
            .bind(&message.text)
            .bind(message.category.as_str())
            .bind(message.is_custom)
            .bind(message.active)
            .bind(message.is_favorite)
            .bind(to_iso_string(&message.created_at))
            .bind(message.updated_at.as_ref().map(to_iso_string))
            .bind(json_text(&message.tags)?)
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;

        tracing::debug!("Bulk inserted {} messages", ids.len());
        Ok(ids)
    }

    pub async fn get_message(&self, id: i64) -> Result<Option<Message>> {
        let pool = self.store.pool().await?;

        sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .map(Message::try_from)
            .transpose()
    }

    /// All messages in insertion order
    pub async fn list_messages(&self) -> Result<Vec<Message>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages ORDER BY id ASC")
            .fetch_all(&pool)
            .await?;

        map_rows(rows)
    }

    pub async fn list_messages_by_category(&self, category: MessageCategory) -> Result<Vec<Message>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM messages INDEXED BY idx_messages_by_category WHERE category = ? ORDER BY id ASC",
        )
        .bind(category.as_str())
        .fetch_all(&pool)
        .await?;

        map_rows(rows)
    }

    /// Overwrite a stored message
    pub async fn put_message(&self, message: &Message) -> Result<Message> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE messages
            SET text = ?, category = ?, is_custom = ?, active = ?, is_favorite = ?,
                created_at = ?, updated_at = ?, tags_json = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&message.text)
        .bind(message.category.as_str())
        .bind(message.is_custom)
        .bind(message.active)
        .bind(message.is_favorite)
        .bind(to_iso_string(&message.created_at))
        .bind(message.updated_at.as_ref().map(to_iso_string))
        .bind(json_text(&message.tags)?)
        .bind(message.id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::not_found(MESSAGES, message.id))?;

        tracing::debug!("Updated message: {}", message.id);
        Message::try_from(row)
    }

    /// Delete a message; returns whether a row was removed
    pub async fn delete_message(&self, id: i64) -> Result<bool> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted message {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    pub async fn count_messages(&self) -> Result<i64> {
        let pool = self.store.pool().await?;

        let count = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await?;

        Ok(count)
    }

    pub async fn clear_messages(&self) -> Result<()> {
        let pool = self.store.pool().await?;
        sqlx::query("DELETE FROM messages").execute(&pool).await?;
        tracing::debug!("Cleared messages");
        Ok(())
    }

    // ===== Photos =====

    /// Insert a photo; the id on `photo` is ignored and assigned by the store
    pub async fn insert_photo(&self, photo: &Photo) -> Result<Photo> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            INSERT INTO photos (image_blob, caption, tags_json, upload_date, original_size,
                                compressed_size, width, height, mime_type)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&photo.image_blob)
        .bind(&photo.caption)
        .bind(json_text(&photo.tags)?)
        .bind(to_iso_string(&photo.upload_date))
        .bind(photo.original_size)
        .bind(photo.compressed_size)
        .bind(photo.width)
        .bind(photo.height)
        .bind(photo.mime_type.as_str())
        .fetch_one(&pool)
        .await?;

        tracing::debug!("Created photo: {}", row.id);
        Photo::try_from(row)
    }

    pub async fn get_photo(&self, id: i64) -> Result<Option<Photo>> {
        let pool = self.store.pool().await?;

        sqlx::query_as::<_, PhotoRow>("SELECT * FROM photos WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .map(Photo::try_from)
            .transpose()
    }

    /// All photos, newest upload first
    pub async fn list_photos(&self) -> Result<Vec<Photo>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, PhotoRow>(
            "SELECT * FROM photos ORDER BY upload_date DESC, id DESC",
        )
        .fetch_all(&pool)
        .await?;

        map_rows(rows)
    }

    /// One page of photos, newest upload first
    pub async fn list_photos_page(&self, offset: u32, limit: u32) -> Result<Vec<Photo>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, PhotoRow>(
            "SELECT * FROM photos ORDER BY upload_date DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&pool)
        .await?;

        map_rows(rows)
    }

    pub async fn put_photo(&self, photo: &Photo) -> Result<Photo> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            UPDATE photos
            SET image_blob = ?, caption = ?, tags_json = ?, upload_date = ?, original_size = ?,
                compressed_size = ?, width = ?, height = ?, mime_type = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&photo.image_blob)
        .bind(&photo.caption)
        .bind(json_text(&photo.tags)?)
        .bind(to_iso_string(&photo.upload_date))
        .bind(photo.original_size)
        .bind(photo.compressed_size)
        .bind(photo.width)
        .bind(photo.height)
        .bind(photo.mime_type.as_str())
        .bind(photo.id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::not_found(PHOTOS, photo.id))?;

        tracing::debug!("Updated photo: {}", photo.id);
        Photo::try_from(row)
    }

    pub async fn delete_photo(&self, id: i64) -> Result<bool> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted photo {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    /// Sum of compressed sizes in bytes
    pub async fn photos_total_size(&self) -> Result<i64> {
        let pool = self.store.pool().await?;

        let total = sqlx::query_scalar("SELECT COALESCE(SUM(compressed_size), 0) FROM photos")
            .fetch_one(&pool)
            .await?;

        Ok(total)
    }

    pub async fn count_photos(&self) -> Result<i64> {
        let pool = self.store.pool().await?;

        let count = sqlx::query_scalar("SELECT COUNT(*) FROM photos")
            .fetch_one(&pool)
            .await?;

        Ok(count)
    }

    pub async fn clear_photos(&self) -> Result<()> {
        let pool = self.store.pool().await?;
        sqlx::query("DELETE FROM photos").execute(&pool).await?;
        tracing::debug!("Cleared photos");
        Ok(())
    }

    // ===== Moods =====

    pub async fn insert_mood(&self, mood: &NewMood) -> Result<MoodEntry> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, MoodRow>(
            r#"
            INSERT INTO moods (user_id, mood, moods_json, note, date, timestamp, synced, supabase_id)
            VALUES (?, ?, ?, ?, ?, ?, 0, NULL)
            RETURNING *
            "#,
        )
        .bind(&mood.user_id)
        .bind(mood.mood.as_str())
        .bind(json_text(&mood.moods)?)
        .bind(&mood.note)
        .bind(format_date(mood.date))
        .bind(to_iso_string(&mood.timestamp))
        .fetch_one(&pool)
        .await?;

        tracing::debug!("Created mood {} for {}", row.id, row.date);
        MoodEntry::try_from(row)
    }

    /// Insert the mood for its date, or overwrite the entry already logged
    /// for that date and clear its sync flag. Runs as a single statement.
    pub async fn upsert_mood_for_date(&self, mood: &NewMood) -> Result<MoodEntry> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, MoodRow>(
            r#"
            INSERT INTO moods (user_id, mood, moods_json, note, date, timestamp, synced, supabase_id)
            VALUES (?, ?, ?, ?, ?, ?, 0, NULL)
            ON CONFLICT(date) DO UPDATE SET
                mood = excluded.mood,
                moods_json = excluded.moods_json,
                note = excluded.note,
                timestamp = excluded.timestamp,
                synced = 0
            RETURNING *
            "#,
        )
        .bind(&mood.user_id)
        .bind(mood.mood.as_str())
        .bind(json_text(&mood.moods)?)
        .bind(&mood.note)
        .bind(format_date(mood.date))
        .bind(to_iso_string(&mood.timestamp))
        .fetch_one(&pool)
        .await?;

        tracing::debug!("Saved mood {} for {}", row.id, row.date);
        MoodEntry::try_from(row)
    }

    pub async fn get_mood(&self, id: i64) -> Result<Option<MoodEntry>> {
        let pool = self.store.pool().await?;

        sqlx::query_as::<_, MoodRow>("SELECT * FROM moods WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?
            .map(MoodEntry::try_from)
            .transpose()
    }

    /// Point lookup on the unique date index
    pub async fn get_mood_by_date(&self, date: NaiveDate) -> Result<Option<MoodEntry>> {
        let pool = self.store.pool().await?;

        sqlx::query_as::<_, MoodRow>("SELECT * FROM moods WHERE date = ?")
            .bind(format_date(date))
            .fetch_optional(&pool)
            .await?
            .map(MoodEntry::try_from)
            .transpose()
    }

    /// Entries with `start <= date <= end`, ordered by date
    pub async fn list_moods_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<MoodEntry>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, MoodRow>(
            "SELECT * FROM moods WHERE date >= ? AND date <= ? ORDER BY date ASC",
        )
        .bind(format_date(start))
        .bind(format_date(end))
        .fetch_all(&pool)
        .await?;

        map_rows(rows)
    }

    pub async fn list_unsynced_moods(&self) -> Result<Vec<MoodEntry>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, MoodRow>("SELECT * FROM moods WHERE synced = 0 ORDER BY id ASC")
            .fetch_all(&pool)
            .await?;

        map_rows(rows)
    }

    pub async fn list_moods(&self) -> Result<Vec<MoodEntry>> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query_as::<_, MoodRow>("SELECT * FROM moods ORDER BY id ASC")
            .fetch_all(&pool)
            .await?;

        map_rows(rows)
    }

    /// Overwrite a stored mood entry. The date column is never rewritten.
    pub async fn put_mood(&self, mood: &MoodEntry) -> Result<MoodEntry> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, MoodRow>(
            r#"
            UPDATE moods
            SET user_id = ?, mood = ?, moods_json = ?, note = ?, timestamp = ?, synced = ?, supabase_id = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&mood.user_id)
        .bind(mood.mood.as_str())
        .bind(json_text(&mood.moods)?)
        .bind(&mood.note)
        .bind(to_iso_string(&mood.timestamp))
        .bind(mood.synced)
        .bind(&mood.supabase_id)
        .bind(mood.id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| AppError::not_found(MOODS, mood.id))?;

        tracing::debug!("Updated mood: {}", mood.id);
        MoodEntry::try_from(row)
    }

    pub async fn mark_mood_synced(&self, id: i64, supabase_id: &str) -> Result<()> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query("UPDATE moods SET synced = 1, supabase_id = ? WHERE id = ?")
            .bind(supabase_id)
            .bind(id)
            .execute(&pool)
            .await?
            .rows_affected();

        if rows == 0 {
            return Err(AppError::not_found(MOODS, id));
        }

        tracing::debug!("Marked mood {} synced as {}", id, supabase_id);
        Ok(())
    }

    /// Mark `uploaded` synced only if the stored row still holds the uploaded
    /// content. Returns false when the entry was edited in the meantime.
    pub async fn mark_mood_synced_if_unchanged(
        &self,
        uploaded: &MoodEntry,
        supabase_id: &str,
    ) -> Result<bool> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query(
            r#"
            UPDATE moods
            SET synced = 1, supabase_id = ?
            WHERE id = ? AND timestamp = ? AND mood = ? AND moods_json = ? AND note = ?
            "#,
        )
        .bind(supabase_id)
        .bind(uploaded.id)
        .bind(to_iso_string(&uploaded.timestamp))
        .bind(uploaded.mood.as_str())
        .bind(json_text(&uploaded.moods)?)
        .bind(&uploaded.note)
        .execute(&pool)
        .await?
        .rows_affected();

        if rows > 0 {
            tracing::debug!("Marked mood {} synced as {}", uploaded.id, supabase_id);
            return Ok(true);
        }

        if self.get_mood(uploaded.id).await?.is_none() {
            return Err(AppError::not_found(MOODS, uploaded.id));
        }

        tracing::debug!("Mood {} changed during upload, left unsynced", uploaded.id);
        Ok(false)
    }

    pub async fn delete_mood(&self, id: i64) -> Result<bool> {
        let pool = self.store.pool().await?;

        let rows = sqlx::query("DELETE FROM moods WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted mood {} ({} rows)", id, rows);
        Ok(rows > 0)
    }

    pub async fn clear_moods(&self) -> Result<()> {
        let pool = self.store.pool().await?;
        sqlx::query("DELETE FROM moods").execute(&pool).await?;
        tracing::debug!("Cleared moods");
        Ok(())
    }

    // ===== Auth token cache =====

    pub async fn put_auth_token(&self, token: &StoredAuthToken) -> Result<()> {
        let pool = self.store.pool().await?;

        sqlx::query(
            r#"
            INSERT INTO auth_token_cache (id, access_token, refresh_token, expires_at, user_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                user_id = excluded.user_id
            "#,
        )
        .bind(&token.id)
        .bind(&token.access_token)
        .bind(&token.refresh_token)
        .bind(token.expires_at)
        .bind(&token.user_id)
        .execute(&pool)
        .await?;

        tracing::debug!("Stored auth token '{}'", token.id);
        Ok(())
    }

    pub async fn get_auth_token(&self, id: &str) -> Result<Option<StoredAuthToken>> {
        let pool = self.store.pool().await?;

        let row = sqlx::query_as::<_, AuthTokenRow>("SELECT * FROM auth_token_cache WHERE id = ?")
            .bind(id)
            .fetch_optional(&pool)
            .await?;

        Ok(row.map(StoredAuthToken::from))
    }

    pub async fn delete_auth_token(&self, id: &str) -> Result<()> {
        let pool = self.store.pool().await?;

        sqlx::query("DELETE FROM auth_token_cache WHERE id = ?")
            .bind(id)
            .execute(&pool)
            .await?;

        Ok(())
    }
}

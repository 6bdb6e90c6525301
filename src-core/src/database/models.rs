//! Database models
//!
//! Rust structs representing stored records and the inputs/patches that
//! produce them. All models use serde for serialization to the frontend.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    Reason,
    Memory,
    Affirmation,
    Future,
    Custom,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 5] = [
        MessageCategory::Reason,
        MessageCategory::Memory,
        MessageCategory::Affirmation,
        MessageCategory::Future,
        MessageCategory::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Reason => "reason",
            MessageCategory::Memory => "memory",
            MessageCategory::Affirmation => "affirmation",
            MessageCategory::Future => "future",
            MessageCategory::Custom => "custom",
        }
    }
}

impl FromStr for MessageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown message category: {}", s))
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A daily message, either seed data or user-written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub category: MessageCategory,
    /// false for seed messages, which users cannot edit or delete
    pub is_custom: bool,
    /// Inactive custom messages are excluded from rotation
    pub active: bool,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl Message {
    /// Whether this message belongs to the rotation pool
    pub fn is_in_rotation(&self) -> bool {
        !self.is_custom || self.active
    }
}

/// Fully validated message ready for insertion
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
    pub category: MessageCategory,
    pub is_custom: bool,
    pub active: bool,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

/// Create custom message request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageInput {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateMessageInput {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            active: None,
            tags: None,
        }
    }
}

/// Update custom message request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageInput {
    pub id: i64,
    pub text: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Validated partial update for a message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagePatch {
    pub text: Option<String>,
    pub category: Option<MessageCategory>,
    pub active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl MessagePatch {
    /// Merge the patch over an existing message, stamping `updated_at`
    pub fn apply(&self, existing: &Message, now: DateTime<Utc>) -> Message {
        Message {
            id: existing.id,
            text: self.text.clone().unwrap_or_else(|| existing.text.clone()),
            category: self.category.unwrap_or(existing.category),
            is_custom: existing.is_custom,
            active: self.active.unwrap_or(existing.active),
            is_favorite: self.is_favorite.unwrap_or(existing.is_favorite),
            created_at: existing.created_at,
            updated_at: Some(now),
            tags: self.tags.clone().unwrap_or_else(|| existing.tags.clone()),
        }
    }
}

/// Message query filter
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub category: Option<MessageCategory>,
    pub is_custom: Option<bool>,
    pub active: Option<bool>,
    /// Case-insensitive substring match on text
    pub search_term: Option<String>,
    /// Matches messages carrying any of these tags
    pub tags: Vec<String>,
}

impl MessageFilter {
    pub fn custom() -> Self {
        Self {
            is_custom: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, message: &Message) -> bool {
        if let Some(category) = self.category {
            if message.category != category {
                return false;
            }
        }
        if let Some(is_custom) = self.is_custom {
            if message.is_custom != is_custom {
                return false;
            }
        }
        if let Some(active) = self.active {
            if message.active != active {
                return false;
            }
        }
        if let Some(term) = self.search_term.as_deref().filter(|t| !t.is_empty()) {
            if !message.text.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if !self.tags.is_empty() && !message.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        true
    }
}

/// Supported photo encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoMimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl PhotoMimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoMimeType::Jpeg => "image/jpeg",
            PhotoMimeType::Png => "image/png",
            PhotoMimeType::Webp => "image/webp",
        }
    }
}

impl FromStr for PhotoMimeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image/jpeg" => Ok(PhotoMimeType::Jpeg),
            "image/png" => Ok(PhotoMimeType::Png),
            "image/webp" => Ok(PhotoMimeType::Webp),
            other => Err(format!("unsupported mime type: {}", other)),
        }
    }
}

/// A compressed photo with its metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub image_blob: Vec<u8>,
    pub caption: String,
    pub tags: Vec<String>,
    pub upload_date: DateTime<Utc>,
    pub original_size: i64,
    pub compressed_size: i64,
    pub width: i64,
    pub height: i64,
    pub mime_type: PhotoMimeType,
}

/// Photo upload request (already compressed by the caller)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoto {
    pub image_blob: Vec<u8>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to now
    #[serde(default)]
    pub upload_date: Option<DateTime<Utc>>,
    pub original_size: i64,
    pub compressed_size: i64,
    pub width: i64,
    pub height: i64,
    pub mime_type: String,
}

/// Editable photo fields
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhotoPatch {
    pub caption: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PhotoPatch {
    pub fn apply(&self, existing: &Photo) -> Photo {
        Photo {
            caption: self.caption.clone().unwrap_or_else(|| existing.caption.clone()),
            tags: self.tags.clone().unwrap_or_else(|| existing.tags.clone()),
            ..existing.clone()
        }
    }
}

/// Mood options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodType {
    Loved,
    Happy,
    Content,
    Thoughtful,
    Grateful,
}

impl MoodType {
    pub const ALL: [MoodType; 5] = [
        MoodType::Loved,
        MoodType::Happy,
        MoodType::Content,
        MoodType::Thoughtful,
        MoodType::Grateful,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodType::Loved => "loved",
            MoodType::Happy => "happy",
            MoodType::Content => "content",
            MoodType::Thoughtful => "thoughtful",
            MoodType::Grateful => "grateful",
        }
    }
}

impl FromStr for MoodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoodType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mood: {}", s))
    }
}

impl fmt::Display for MoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mood entry per calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: String,
    /// Primary mood, the first one selected
    pub mood: MoodType,
    pub moods: Vec<MoodType>,
    pub note: String,
    /// Serialized as "YYYY-MM-DD"; immutable after creation
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
    pub supabase_id: Option<String>,
}

impl MoodEntry {
    /// Store-assigned id, None if the record was never persisted
    pub fn local_id(&self) -> Option<i64> {
        (self.id > 0).then_some(self.id)
    }
}

/// Validated mood ready for insertion
#[derive(Debug, Clone)]
pub struct NewMood {
    pub user_id: String,
    pub mood: MoodType,
    pub moods: Vec<MoodType>,
    pub note: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// Id under which the active session token is cached
pub const CURRENT_TOKEN_ID: &str = "current";

/// Cached credentials used by background sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAuthToken {
    pub id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as Unix epoch milliseconds
    pub expires_at: i64,
    pub user_id: String,
}

impl StoredAuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_message() -> Message {
        Message {
            id: 7,
            text: "Original".to_string(),
            category: MessageCategory::Reason,
            is_custom: true,
            active: true,
            is_favorite: false,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
            updated_at: None,
            tags: vec!["a".to_string()],
        }
    }

    #[test]
    fn test_message_patch_merges_only_given_fields() {
        let existing = sample_message();
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap();
        let patch = MessagePatch {
            active: Some(false),
            ..MessagePatch::default()
        };

        let merged = patch.apply(&existing, now);
        assert_eq!(merged.text, "Original");
        assert!(!merged.active);
        assert_eq!(merged.tags, vec!["a".to_string()]);
        assert_eq!(merged.created_at, existing.created_at);
        assert_eq!(merged.updated_at, Some(now));
    }

    #[test]
    fn test_rotation_membership() {
        let mut message = sample_message();
        assert!(message.is_in_rotation());
        message.active = false;
        assert!(!message.is_in_rotation());
        message.is_custom = false;
        assert!(message.is_in_rotation());
    }

    #[test]
    fn test_filter_search_and_tags() {
        let message = sample_message();
        let filter = MessageFilter {
            search_term: Some("ORIG".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            ..MessageFilter::default()
        };
        assert!(filter.matches(&message));

        let filter = MessageFilter {
            tags: vec!["z".to_string()],
            ..MessageFilter::default()
        };
        assert!(!filter.matches(&message));
    }

    #[test]
    fn test_enum_round_trip_through_str() {
        for category in MessageCategory::ALL {
            assert_eq!(category.as_str().parse::<MessageCategory>().unwrap(), category);
        }
        assert!("bogus".parse::<MessageCategory>().is_err());
        assert_eq!("image/webp".parse::<PhotoMimeType>().unwrap(), PhotoMimeType::Webp);
        assert_eq!(serde_json::to_string(&MoodType::Grateful).unwrap(), "\"grateful\"");
    }
}

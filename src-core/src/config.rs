//! Application configuration constants
//!
//! Central location for all configuration constants, resource limits,
//! and validation boundaries used throughout the core.

use std::path::PathBuf;

// ===== Local Store =====

/// Current schema version of the local store.
/// v1 messages + legacy photos, v2 photo metadata schema, v3 moods, v4 auth token cache.
pub const DB_VERSION: i32 = 4;

/// Database file name inside the app data directory
pub const DB_FILENAME: &str = "mylove.sqlite";

/// Settings file name inside the app data directory
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Directory (inside the app data directory) where exports are written
pub const EXPORTS_DIRNAME: &str = "exports";

/// Connection pool size for the shared application pool
pub const MAX_POOL_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const BUSY_TIMEOUT_SECS: u64 = 5;

// ===== Validation Limits =====

/// Maximum message text length in characters
pub const MESSAGE_TEXT_MAX_LENGTH: usize = 1000;

/// Maximum photo caption length
pub const CAPTION_MAX_LENGTH: usize = 500;

/// Maximum number of tags on a photo
pub const MAX_PHOTO_TAGS: usize = 10;

/// Maximum length of a single photo tag
pub const PHOTO_TAG_MAX_LENGTH: usize = 50;

/// Maximum mood note length
pub const MOOD_NOTE_MAX_LENGTH: usize = 200;

/// Maximum partner name length
pub const PARTNER_NAME_MAX_LENGTH: usize = 50;

/// Partner name used until the user sets one
pub const DEFAULT_PARTNER_NAME: &str = "My Love";

/// Relationship start date used until the user sets one
pub const DEFAULT_RELATIONSHIP_START: &str = "2025-10-18";

/// Default daily notification time
pub const DEFAULT_NOTIFICATION_TIME: &str = "09:00";

/// Valid theme names
pub const VALID_THEMES: &[&str] = &["sunset", "ocean", "lavender", "rose"];

/// Valid photo MIME types
pub const VALID_PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

// ===== Paging =====

/// Default number of photos per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size (larger requests are clamped)
pub const MAX_PAGE_SIZE: u32 = 100;

// ===== Message History =====

/// Absolute cap on how many days back the history cursor may go
pub const HISTORY_HARD_CAP_DAYS: u32 = 30;

/// Default configured history length
pub const DEFAULT_MAX_HISTORY_DAYS: u32 = 30;

// ===== Import / Export =====

/// The only export document version this core reads and writes
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Log message truncation length for message text
pub const LOG_TRUNCATE_LENGTH: usize = 50;

// ===== Remote Sync =====

/// Request timeout for the remote mood API
pub const REMOTE_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote table receiving mood inserts
pub const REMOTE_MOODS_TABLE: &str = "moods";

/// Remote backend connection settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the REST endpoint, without trailing slash
    pub url: String,
    /// Public (anon) API key sent with every request
    pub anon_key: String,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY`; None when either is unset or empty.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::new(url, anon_key))
    }
}

/// App data directory from `MYLOVE_DATA_DIR`, defaulting to `./mylove-data`
pub fn data_dir_from_env() -> PathBuf {
    std::env::var("MYLOVE_DATA_DIR")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("mylove-data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_trims_trailing_slash() {
        let config = RemoteConfig::new("https://example.supabase.co/", "key");
        assert_eq!(config.url, "https://example.supabase.co");
    }
}

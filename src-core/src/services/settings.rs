//! Settings service
//!
//! Manages application settings persistence using JSON file storage.
//! Every write validates the complete record; partial updates are merged
//! over the stored settings before validation.

use crate::config::{
    DEFAULT_NOTIFICATION_TIME, DEFAULT_PARTNER_NAME, DEFAULT_RELATIONSHIP_START, SETTINGS_FILENAME,
};
use crate::countdown;
use crate::dates::parse_iso_date;
use crate::error::{AppError, Result};
use crate::validation::{
    check_iso_date, check_partner_name, check_theme, check_time, ValidationError, Violations,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// A relationship milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    pub id: i64,
    /// "YYYY-MM-DD"
    pub date: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Anniversary before an id is assigned
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnniversary {
    pub date: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSettings {
    pub start_date: String,
    pub partner_name: String,
    #[serde(default)]
    pub anniversaries: Vec<Anniversary>,
}

impl Default for RelationshipSettings {
    fn default() -> Self {
        Self {
            start_date: DEFAULT_RELATIONSHIP_START.to_string(),
            partner_name: DEFAULT_PARTNER_NAME.to_string(),
            anniversaries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationSettings {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_accent_color() -> String {
    "#ff6b9d".to_string()
}

fn default_font_family() -> String {
    "system-ui".to_string()
}

impl Default for CustomizationSettings {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            font_family: default_font_family(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_notification_time")]
    pub time: String,
}

fn default_true() -> bool {
    true
}

fn default_notification_time() -> String {
    DEFAULT_NOTIFICATION_TIME.to_string()
}

fn default_theme() -> String {
    "sunset".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_notification_time(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme_name: String,
    #[serde(default = "default_notification_time")]
    pub notification_time: String,
    #[serde(default)]
    pub relationship: RelationshipSettings,
    #[serde(default)]
    pub customization: CustomizationSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_name: default_theme(),
            notification_time: default_notification_time(),
            relationship: RelationshipSettings::default(),
            customization: CustomizationSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

/// Top-level partial update; each present section replaces the stored one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme_name: Option<String>,
    pub notification_time: Option<String>,
    pub relationship: Option<RelationshipSettings>,
    pub customization: Option<CustomizationSettings>,
    pub notifications: Option<NotificationSettings>,
}

impl SettingsPatch {
    pub fn apply(&self, existing: &Settings) -> Settings {
        Settings {
            theme_name: self
                .theme_name
                .clone()
                .unwrap_or_else(|| existing.theme_name.clone()),
            notification_time: self
                .notification_time
                .clone()
                .unwrap_or_else(|| existing.notification_time.clone()),
            relationship: self
                .relationship
                .clone()
                .unwrap_or_else(|| existing.relationship.clone()),
            customization: self
                .customization
                .clone()
                .unwrap_or_else(|| existing.customization.clone()),
            notifications: self
                .notifications
                .clone()
                .unwrap_or_else(|| existing.notifications.clone()),
        }
    }
}

/// Check a complete settings record
pub fn validate_settings(settings: &Settings) -> std::result::Result<(), ValidationError> {
    let mut v = Violations::new();

    check_theme(&mut v, &settings.theme_name);
    check_time(&mut v, "notificationTime", &settings.notification_time);
    check_iso_date(&mut v, "relationship.startDate", &settings.relationship.start_date);
    check_partner_name(&mut v, &settings.relationship.partner_name);

    for (i, anniversary) in settings.relationship.anniversaries.iter().enumerate() {
        let path = format!("relationship.anniversaries.{}", i);
        if anniversary.id <= 0 {
            v.push(format!("{}.id", path), "Anniversary id must be a positive number");
        }
        check_iso_date(&mut v, &format!("{}.date", path), &anniversary.date);
        if anniversary.label.trim().is_empty() {
            v.push(format!("{}.label", path), "Anniversary label cannot be empty");
        }
    }

    v.finish()
}

/// Service for managing application settings
#[derive(Clone, Debug)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILENAME),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<Settings> {
        if !fs::try_exists(&self.settings_path).await? {
            tracing::info!("Settings file not found, creating default settings");
            let default = Settings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: Settings = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse settings: {}", e)))?;

        // The file is left as is; the next save replaces it
        if let Err(e) = validate_settings(&settings) {
            tracing::warn!("Stored settings are invalid, using defaults: {}", e);
            return Ok(Settings::default());
        }

        Ok(settings)
    }

    /// Validate and save settings to disk
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        validate_settings(settings)?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Generic(format!("Failed to serialize settings: {}", e)))?;

        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    /// Merge a partial update and save the validated result
    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let merged = patch.apply(&self.load().await?);
        self.save(&merged).await.map_err(|e| {
            tracing::warn!("Settings update rejected: {}", e);
            e
        })?;
        Ok(merged)
    }

    pub async fn set_theme(&self, theme_name: &str) -> Result<Settings> {
        self.update(SettingsPatch {
            theme_name: Some(theme_name.to_string()),
            ..SettingsPatch::default()
        })
        .await
    }

    /// Append an anniversary with id `max(existing) + 1`
    pub async fn add_anniversary(&self, anniversary: NewAnniversary) -> Result<Anniversary> {
        let mut settings = self.load().await?;
        let next_id = settings
            .relationship
            .anniversaries
            .iter()
            .map(|a| a.id)
            .max()
            .unwrap_or(0)
            .max(0)
            + 1;

        let created = Anniversary {
            id: next_id,
            date: anniversary.date,
            label: anniversary.label,
            description: anniversary.description,
        };
        settings.relationship.anniversaries.push(created.clone());
        self.save(&settings).await?;

        tracing::info!("Added anniversary {} ({})", created.id, created.label);
        Ok(created)
    }

    /// Returns whether an anniversary was removed
    pub async fn remove_anniversary(&self, id: i64) -> Result<bool> {
        let mut settings = self.load().await?;
        let before = settings.relationship.anniversaries.len();
        settings.relationship.anniversaries.retain(|a| a.id != id);

        if settings.relationship.anniversaries.len() == before {
            return Ok(false);
        }

        self.save(&settings).await?;
        tracing::info!("Removed anniversary {}", id);
        Ok(true)
    }

    pub async fn relationship_start_date(&self) -> Result<NaiveDate> {
        let settings = self.load().await?;
        parse_iso_date(&settings.relationship.start_date).ok_or_else(|| {
            AppError::Generic(format!(
                "Invalid relationship start date: {}",
                settings.relationship.start_date
            ))
        })
    }

    /// Up to `count` anniversaries, soonest first
    pub async fn upcoming_anniversaries(&self, count: usize, now: NaiveDateTime) -> Result<Vec<Anniversary>> {
        let settings = self.load().await?;
        Ok(
            countdown::upcoming_anniversaries(&settings.relationship.anniversaries, count, now)
                .into_iter()
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = SettingsService::new(temp_dir.path().to_path_buf());
        (service, temp_dir)
    }

    #[tokio::test]
    async fn test_load_invalid_file_falls_back_to_defaults() {
        let (service, temp_dir) = create_test_service();
        let path = temp_dir.path().join(SETTINGS_FILENAME);
        let content = r#"{"themeName":"neon","relationship":{"startDate":"2025-13-40","partnerName":"Sam"}}"#;
        std::fs::write(&path, content).unwrap();

        let settings = service.load().await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(validate_settings(&settings).is_ok());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    fn new_anniversary(date: &str, label: &str) -> NewAnniversary {
        NewAnniversary {
            date: date.to_string(),
            label: label.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_default_settings_created_on_load() {
        let (service, temp) = create_test_service();

        let settings = service.load().await.unwrap();

        assert_eq!(settings.theme_name, "sunset");
        assert_eq!(settings.notification_time, "09:00");
        assert!(settings.notifications.enabled);
        assert!(temp.path().join(SETTINGS_FILENAME).exists());
    }

    #[tokio::test]
    async fn test_partial_update_is_merged_then_validated() {
        let (service, _temp) = create_test_service();

        let updated = service.set_theme("ocean").await.unwrap();
        assert_eq!(updated.theme_name, "ocean");
        assert_eq!(updated.notification_time, "09:00");

        let err = service
            .update(SettingsPatch {
                notification_time: Some("25:00".to_string()),
                ..SettingsPatch::default()
            })
            .await
            .unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("notificationTime"));

        // Rejected update leaves the stored settings untouched
        let loaded = service.load().await.unwrap();
        assert_eq!(loaded.theme_name, "ocean");
        assert_eq!(loaded.notification_time, "09:00");
    }

    #[tokio::test]
    async fn test_invalid_theme_rejected() {
        let (service, _temp) = create_test_service();
        let err = service.set_theme("neon").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_anniversary_ids_follow_max() {
        let (service, _temp) = create_test_service();

        let first = service
            .add_anniversary(new_anniversary("2020-01-01", "First date"))
            .await
            .unwrap();
        let second = service
            .add_anniversary(new_anniversary("2021-06-15", "Moved in"))
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert!(service.remove_anniversary(first.id).await.unwrap());
        assert!(!service.remove_anniversary(first.id).await.unwrap());

        let third = service
            .add_anniversary(new_anniversary("2022-02-02", "Trip"))
            .await
            .unwrap();
        assert_eq!(third.id, 3);

        let err = service
            .add_anniversary(new_anniversary("2022-02-02", " "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_settings_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        {
            let service = SettingsService::new(dir.clone());
            service
                .update(SettingsPatch {
                    relationship: Some(RelationshipSettings {
                        start_date: "2020-01-01".to_string(),
                        partner_name: "Sam".to_string(),
                        anniversaries: Vec::new(),
                    }),
                    ..SettingsPatch::default()
                })
                .await
                .unwrap();
        }

        let service = SettingsService::new(dir);
        assert_eq!(
            service.relationship_start_date().await.unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"themeName":"rose"}"#).unwrap();
        assert_eq!(settings.theme_name, "rose");
        assert_eq!(settings.relationship, RelationshipSettings::default());
        assert!(validate_settings(&settings).is_ok());
    }
}

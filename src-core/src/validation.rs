//! Input validation
//!
//! Every write path validates its input here before touching storage.
//! Failures produce a [`ValidationError`] carrying one user-facing message
//! per field path, suitable for inline form display.

use crate::config::{
    CAPTION_MAX_LENGTH, MAX_PHOTO_TAGS, MESSAGE_TEXT_MAX_LENGTH, MOOD_NOTE_MAX_LENGTH,
    PARTNER_NAME_MAX_LENGTH, PHOTO_TAG_MAX_LENGTH, VALID_PHOTO_MIME_TYPES, VALID_THEMES,
};
use crate::database::{MessageCategory, MoodType, PhotoMimeType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Structured validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    /// Message for a single field, if it failed
    pub fn field(&self, path: &str) -> Option<&str> {
        self.field_errors.get(path).map(String::as_str)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Maps field paths to the names shown to users
fn display_name(path: &str) -> &str {
    match path {
        "text" => "Message",
        "category" => "Category",
        "tags" => "Tags",
        "caption" => "Caption",
        "imageBlob" => "Image",
        "width" => "Width",
        "height" => "Height",
        "mimeType" => "File type",
        "originalSize" => "Original size",
        "compressedSize" => "Compressed size",
        "date" => "Date",
        "mood" => "Mood",
        "moods" => "Moods",
        "note" => "Note",
        "themeName" => "Theme",
        "notificationTime" => "Notification time",
        "relationship.startDate" => "Relationship start date",
        "relationship.partnerName" => "Partner name",
        "notifications.time" => "Notification time",
        _ if path.starts_with("relationship.anniversaries") => "Anniversary",
        _ if path.starts_with("tags.") => "Tag",
        _ => path,
    }
}

/// Collects violations and turns them into a single error
#[derive(Debug, Default)]
pub struct Violations {
    errors: Vec<(String, String)>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation; only the first message per field is kept
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let path = path.into();
        if !self.errors.iter().any(|(p, _)| *p == path) {
            self.errors.push((path, message.into()));
        }
    }

    pub fn empty(&mut self, path: &str) {
        let message = format!("{} cannot be empty", display_name(path));
        self.push(path, message);
    }

    pub fn too_long(&mut self, path: &str, max: usize) {
        let message = format!("{} cannot exceed {} characters", display_name(path), max);
        self.push(path, message);
    }

    pub fn invalid_option(&mut self, path: &str) {
        let message = format!(
            "Invalid {}. Please select a valid option.",
            display_name(path).to_lowercase()
        );
        self.push(path, message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            return Ok(());
        }

        let message = self
            .errors
            .iter()
            .map(|(_, m)| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Err(ValidationError {
            message,
            field_errors: self.errors.into_iter().collect(),
        })
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Check a "YYYY-MM-DD" string: shape and calendar validity
pub fn is_valid_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    shape_ok && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Check an "HH:MM" string with hour 00-23 and minute 00-59
pub fn is_valid_time(value: &str) -> bool {
    let Some((hour, minute)) = value.split_once(':') else {
        return false;
    };
    if hour.len() != 2 || minute.len() != 2 {
        return false;
    }
    match (hour.parse::<u32>(), minute.parse::<u32>()) {
        (Ok(h), Ok(m)) => h <= 23 && m <= 59,
        _ => false,
    }
}

// ===== Messages =====

/// Message text after trimming: 1..=1000 characters
pub fn check_message_text(v: &mut Violations, text: &str) -> String {
    let trimmed = text.trim().to_string();
    if trimmed.is_empty() {
        v.empty("text");
    } else if char_len(&trimmed) > MESSAGE_TEXT_MAX_LENGTH {
        v.too_long("text", MESSAGE_TEXT_MAX_LENGTH);
    }
    trimmed
}

pub fn check_message_category(v: &mut Violations, category: &str) -> Option<MessageCategory> {
    let parsed = category.parse::<MessageCategory>().ok();
    if parsed.is_none() {
        v.invalid_option("category");
    }
    parsed
}

// ===== Photos =====

pub fn check_caption(v: &mut Violations, caption: &str) {
    if char_len(caption) > CAPTION_MAX_LENGTH {
        v.too_long("caption", CAPTION_MAX_LENGTH);
    }
}

pub fn check_photo_tags(v: &mut Violations, tags: &[String]) {
    if tags.len() > MAX_PHOTO_TAGS {
        v.push("tags", format!("No more than {} tags are allowed", MAX_PHOTO_TAGS));
    }
    for (i, tag) in tags.iter().enumerate() {
        if char_len(tag) > PHOTO_TAG_MAX_LENGTH {
            v.too_long(&format!("tags.{}", i), PHOTO_TAG_MAX_LENGTH);
        }
    }
}

pub fn check_photo_mime_type(v: &mut Violations, mime_type: &str) -> Option<PhotoMimeType> {
    if !VALID_PHOTO_MIME_TYPES.contains(&mime_type) {
        v.invalid_option("mimeType");
        return None;
    }
    mime_type.parse().ok()
}

pub fn check_positive(v: &mut Violations, path: &str, value: i64) {
    if value <= 0 {
        let message = format!("{} must be a positive number", display_name(path));
        v.push(path, message);
    }
}

// ===== Moods =====

/// Validate a mood entry's date, selected moods and note
pub fn validate_mood_fields(date: &str, moods: &[MoodType], note: &str) -> Result<(), ValidationError> {
    let mut v = Violations::new();

    if !is_valid_iso_date(date) {
        v.push("date", "Date must be in ISO format (YYYY-MM-DD)");
    }
    if moods.is_empty() {
        v.push("moods", "At least one mood must be selected");
    }
    if char_len(note) > MOOD_NOTE_MAX_LENGTH {
        v.too_long("note", MOOD_NOTE_MAX_LENGTH);
    }

    v.finish()
}

// ===== Settings =====

pub fn check_theme(v: &mut Violations, theme: &str) {
    if !VALID_THEMES.contains(&theme) {
        v.invalid_option("themeName");
    }
}

pub fn check_time(v: &mut Violations, path: &str, value: &str) {
    if !is_valid_time(value) {
        v.push(
            path,
            "Invalid time values (hour must be 00-23, minute must be 00-59)",
        );
    }
}

pub fn check_iso_date(v: &mut Violations, path: &str, value: &str) {
    if !is_valid_iso_date(value) {
        let message = format!("{} must be a valid date (YYYY-MM-DD)", display_name(path));
        v.push(path, message);
    }
}

pub fn check_partner_name(v: &mut Violations, name: &str) {
    if name.trim().is_empty() {
        v.empty("relationship.partnerName");
    } else if char_len(name) > PARTNER_NAME_MAX_LENGTH {
        v.too_long("relationship.partnerName", PARTNER_NAME_MAX_LENGTH);
    }
}

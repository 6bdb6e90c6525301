//! Import/export service
//!
//! Moves custom messages in and out of the app as a versioned JSON
//! document. Only user-written messages are exported. Imports
//! skip duplicates (case-insensitive, trimmed) and invalid items instead of
//! failing the whole batch.

use crate::config::{EXPORTS_DIRNAME, EXPORT_FORMAT_VERSION};
use crate::database::{CreateMessageInput, Message, MessageFilter};
use crate::dates::{now_millis, parse_timestamp, to_iso_string};
use crate::error::{AppError, Result};
use crate::services::messages::{preview, validate_new_message, MessagesService};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

fn default_true() -> bool {
    true
}

/// One message in an export document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedMessage {
    pub text: String,
    pub category: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Message> for ExportedMessage {
    fn from(message: &Message) -> Self {
        Self {
            text: message.text.clone(),
            category: message.category.as_str().to_string(),
            active: message.active,
            tags: message.tags.clone(),
            created_at: to_iso_string(&message.created_at),
            updated_at: to_iso_string(message.updated_at.as_ref().unwrap_or(&message.created_at)),
        }
    }
}

/// Export document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesExport {
    pub version: String,
    pub export_date: String,
    pub message_count: usize,
    pub messages: Vec<ExportedMessage>,
}

impl MessagesExport {
    pub fn new(messages: Vec<ExportedMessage>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: to_iso_string(&now_millis()),
            message_count: messages.len(),
            messages,
        }
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Duplicates of existing or earlier items
    pub skipped: usize,
    /// Items that failed validation
    pub invalid: usize,
}

fn normalized(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Service for importing and exporting custom messages
#[derive(Clone, Debug)]
pub struct TransferService {
    messages: MessagesService,
    exports_dir: PathBuf,
}

impl TransferService {
    pub fn new(messages: MessagesService, app_data_dir: PathBuf) -> Self {
        Self {
            messages,
            exports_dir: app_data_dir.join(EXPORTS_DIRNAME),
        }
    }

    /// Export every custom message. A storage failure yields an empty document.
    pub async fn export_messages(&self) -> MessagesExport {
        match self.messages.query(&MessageFilter::custom()).await {
            Ok(messages) => {
                let exported: Vec<_> = messages.iter().map(ExportedMessage::from).collect();
                tracing::info!("Exported {} custom messages", exported.len());
                MessagesExport::new(exported)
            }
            Err(e) => {
                tracing::error!("Failed to export messages: {}", e);
                MessagesExport::new(Vec::new())
            }
        }
    }

    /// Import a document, keeping each item's original timestamps
    pub async fn import_messages(&self, document: &MessagesExport) -> Result<ImportSummary> {
        if document.version != EXPORT_FORMAT_VERSION {
            return Err(AppError::UnsupportedExportVersion(document.version.clone()));
        }

        let existing = self.messages.query(&MessageFilter::custom()).await?;
        let mut seen: HashSet<String> = existing.iter().map(|m| normalized(&m.text)).collect();
        let mut summary = ImportSummary::default();

        for item in &document.messages {
            let key = normalized(&item.text);
            if seen.contains(&key) {
                tracing::debug!("Skipping duplicate message: {}", preview(&item.text));
                summary.skipped += 1;
                continue;
            }

            let (Some(created_at), Some(updated_at)) =
                (parse_timestamp(&item.created_at), parse_timestamp(&item.updated_at))
            else {
                tracing::warn!("Skipping message with invalid timestamps: {}", preview(&item.text));
                summary.invalid += 1;
                continue;
            };

            let input = CreateMessageInput {
                text: item.text.clone(),
                category: item.category.clone(),
                active: Some(item.active),
                tags: Some(item.tags.clone()),
            };
            let message = match validate_new_message(&input, created_at, Some(updated_at)) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Skipping invalid message '{}': {}", preview(&item.text), e);
                    summary.invalid += 1;
                    continue;
                }
            };

            self.messages.insert(message).await?;
            seen.insert(key);
            summary.imported += 1;
        }

        tracing::info!(
            "Import complete: imported={}, skipped={}, invalid={}",
            summary.imported,
            summary.skipped,
            summary.invalid
        );
        Ok(summary)
    }

    /// Write the export document as pretty JSON into the exports directory
    pub async fn export_to_file(&self) -> Result<PathBuf> {
        let document = self.export_messages().await;

        fs::create_dir_all(&self.exports_dir).await?;
        let filename = format!(
            "mylove-messages-{}.json",
            Utc::now().format("%Y%m%d_%H%M%S_%3f")
        );
        let path = self.exports_dir.join(filename);

        let content = serde_json::to_string_pretty(&document)?;
        fs::write(&path, content).await?;

        tracing::info!("Exported {} messages to {:?}", document.message_count, path);
        Ok(path)
    }

    /// Import from a JSON file; a malformed file fails without importing anything
    pub async fn import_from_file(&self, path: &Path) -> Result<ImportSummary> {
        tracing::info!("Importing messages from {:?}", path);

        let content = fs::read_to_string(path).await?;
        let document: MessagesExport = serde_json::from_str(&content)?;

        self.import_messages(&document).await
    }

    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }
}

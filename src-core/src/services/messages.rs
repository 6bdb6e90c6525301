//! Messages service
//!
//! Business logic for daily messages: custom message lifecycle, filtering,
//! the rotation pool and first-run seeding. Seed messages can be favorited
//! but never edited or deleted.

use crate::config::LOG_TRUNCATE_LENGTH;
use crate::database::seed::default_messages;
use crate::database::{
    CreateMessageInput, Message, MessageCategory, MessageFilter, MessagePatch, NewMessage,
    Repository, UpdateMessageInput,
};
use crate::dates::now_millis;
use crate::error::{AppError, Result};
use crate::rotation::rotation_pool;
use crate::validation::{check_message_category, check_message_text, ValidationError, Violations};
use chrono::{DateTime, Utc};

/// Shorten message text for log output
pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() <= LOG_TRUNCATE_LENGTH {
        return text.to_string();
    }
    let mut short: String = text.chars().take(LOG_TRUNCATE_LENGTH).collect();
    short.push_str("...");
    short
}

/// Validate a create request into an insertable custom message
pub fn validate_new_message(
    input: &CreateMessageInput,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
) -> std::result::Result<NewMessage, ValidationError> {
    let mut v = Violations::new();
    let text = check_message_text(&mut v, &input.text);
    let category = check_message_category(&mut v, &input.category);
    v.finish()?;

    Ok(NewMessage {
        text,
        category: category.unwrap_or(MessageCategory::Custom),
        is_custom: true,
        active: input.active.unwrap_or(true),
        is_favorite: false,
        created_at,
        updated_at,
        tags: input.tags.clone().unwrap_or_default(),
    })
}

fn validate_update(input: &UpdateMessageInput) -> std::result::Result<MessagePatch, ValidationError> {
    let mut v = Violations::new();
    let text = input.text.as_deref().map(|t| check_message_text(&mut v, t));
    let category = input
        .category
        .as_deref()
        .and_then(|c| check_message_category(&mut v, c));
    v.finish()?;

    Ok(MessagePatch {
        text,
        category,
        active: input.active,
        tags: input.tags.clone(),
        is_favorite: None,
    })
}

/// Service for managing messages
#[derive(Clone, Debug)]
pub struct MessagesService {
    repo: Repository,
}

impl MessagesService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a custom message
    pub async fn create(&self, input: CreateMessageInput) -> Result<Message> {
        let message = validate_new_message(&input, now_millis(), None).map_err(|e| {
            tracing::warn!("Rejected custom message: {}", e);
            e
        })?;

        self.insert(message).await
    }

    /// Insert an already validated message
    pub(crate) async fn insert(&self, message: NewMessage) -> Result<Message> {
        tracing::info!("Creating custom message: {}", preview(&message.text));

        let created = self.repo.insert_message(&message).await?;

        tracing::info!("Custom message created successfully: {}", created.id);
        Ok(created)
    }

    /// Update a custom message; only the supplied fields change
    pub async fn update_message(&self, input: UpdateMessageInput) -> Result<Message> {
        tracing::debug!("Updating message: {}", input.id);

        let patch = validate_update(&input)?;
        let existing = self.require(input.id).await?;
        if !existing.is_custom {
            return Err(AppError::SeedMessageImmutable(existing.id));
        }

        self.write_patch(&existing, &patch).await
    }

    /// Delete a custom message. Deleting an absent id is a no-op.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let Some(existing) = self.repo.get_message(id).await? else {
            tracing::debug!("Message {} already absent, nothing to delete", id);
            return Ok(());
        };
        if !existing.is_custom {
            return Err(AppError::SeedMessageImmutable(id));
        }

        self.repo.delete_message(id).await?;
        tracing::info!("Message deleted successfully: {}", id);
        Ok(())
    }

    /// Flip the favorite flag; allowed on seed messages too
    pub async fn toggle_favorite(&self, id: i64) -> Result<Message> {
        let existing = self.require(id).await?;
        let patch = MessagePatch {
            is_favorite: Some(!existing.is_favorite),
            ..MessagePatch::default()
        };

        self.write_patch(&existing, &patch).await
    }

    async fn write_patch(&self, existing: &Message, patch: &MessagePatch) -> Result<Message> {
        let merged = patch.apply(existing, now_millis());
        let updated = self.repo.put_message(&merged).await?;

        tracing::debug!("Message updated successfully: {}", updated.id);
        Ok(updated)
    }

    async fn require(&self, id: i64) -> Result<Message> {
        self.repo
            .get_message(id)
            .await?
            .ok_or_else(|| AppError::not_found("messages", id))
    }

    /// Get a message by ID; storage failures read as absent
    pub async fn get(&self, id: i64) -> Option<Message> {
        match self.repo.get_message(id).await {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to get message {}: {}", id, e);
                None
            }
        }
    }

    /// Messages matching `filter`, in store order
    pub async fn get_all(&self, filter: &MessageFilter) -> Vec<Message> {
        match self.query(filter).await {
            Ok(messages) => {
                tracing::debug!("Retrieved {} messages", messages.len());
                messages
            }
            Err(e) => {
                tracing::error!("Failed to get messages ({:?}): {}", filter, e);
                Vec::new()
            }
        }
    }

    /// Like [`get_all`](Self::get_all) but storage errors propagate
    pub async fn query(&self, filter: &MessageFilter) -> Result<Vec<Message>> {
        let messages = match filter.category {
            Some(category) => self.repo.list_messages_by_category(category).await?,
            None => self.repo.list_messages().await?,
        };

        Ok(messages.into_iter().filter(|m| filter.matches(m)).collect())
    }

    pub async fn get_active_custom_messages(&self) -> Vec<Message> {
        let filter = MessageFilter {
            is_custom: Some(true),
            active: Some(true),
            ..MessageFilter::default()
        };
        self.get_all(&filter).await
    }

    /// Seed messages plus active custom messages
    pub async fn get_rotation_pool(&self) -> Vec<Message> {
        rotation_pool(&self.get_all(&MessageFilter::default()).await)
    }

    /// Insert the built-in messages when the collection is empty.
    ///
    /// Returns how many were inserted.
    pub async fn seed_defaults_if_empty(&self) -> Result<usize> {
        if self.repo.count_messages().await? > 0 {
            tracing::debug!("Messages already present, skipping seed");
            return Ok(0);
        }

        let defaults = default_messages(now_millis());
        let ids = self.repo.insert_messages(&defaults).await?;

        tracing::info!("Seeded {} default messages", ids.len());
        Ok(ids.len())
    }

    pub async fn count(&self) -> i64 {
        self.repo.count_messages().await.unwrap_or_else(|e| {
            tracing::error!("Failed to count messages: {}", e);
            0
        })
    }

    pub async fn clear(&self) -> Result<()> {
        tracing::info!("Clearing all messages");
        self.repo.clear_messages().await
    }
}

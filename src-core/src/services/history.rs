//! Message history navigation
//!
//! A cursor over past days' messages. Index 0 is today, index N is N days
//! ago. Every date the user has seen is pinned to a message id, so earlier
//! days keep showing the same message even after the rotation pool changes.

use crate::config::{DEFAULT_MAX_HISTORY_DAYS, HISTORY_HARD_CAP_DAYS};
use crate::database::{Message, MessageFilter};
use crate::dates::{days_since_start, format_date};
use crate::error::Result;
use crate::rotation::{pick_for_date, rotation_pool};
use crate::services::messages::MessagesService;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistable history state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHistory {
    pub current_index: u32,
    /// "YYYY-MM-DD" to message id
    pub shown_messages: BTreeMap<String, i64>,
    pub max_history_days: u32,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self {
            current_index: 0,
            shown_messages: BTreeMap::new(),
            max_history_days: DEFAULT_MAX_HISTORY_DAYS,
        }
    }
}

/// Navigation cursor over the loaded messages
#[derive(Debug, Clone)]
pub struct HistoryCursor {
    history: MessageHistory,
    messages: Vec<Message>,
    today: NaiveDate,
    relationship_start: NaiveDate,
    current: Option<Message>,
}

impl HistoryCursor {
    pub fn new(
        messages: Vec<Message>,
        history: MessageHistory,
        today: NaiveDate,
        relationship_start: NaiveDate,
    ) -> Self {
        Self {
            history,
            messages,
            today,
            relationship_start,
            current: None,
        }
    }

    /// Pin today's message if needed and move back to today
    pub fn initialize(&mut self) -> Result<&Message> {
        let key = format_date(self.today);
        let pinned = self
            .history
            .shown_messages
            .get(&key)
            .and_then(|id| self.find(*id));

        let message = match pinned {
            Some(message) => message,
            None => {
                if let Some(stale) = self.history.shown_messages.get(&key) {
                    tracing::warn!("Pinned message {} for {} no longer exists, re-picking", stale, key);
                }
                let pool = rotation_pool(&self.messages);
                let message = pick_for_date(&pool, self.today)?.clone();
                self.history.shown_messages.insert(key.clone(), message.id);
                tracing::info!("New day, message for {} is {}", key, message.id);
                message
            }
        };

        if self.history.current_index != 0 {
            tracing::debug!("Resetting history cursor from index {}", self.history.current_index);
        }
        self.history.current_index = 0;

        Ok(self.current.insert(message))
    }

    /// How far back navigation may go
    pub fn available_history_days(&self) -> u32 {
        self.history
            .max_history_days
            .min(days_since_start(self.relationship_start, self.today))
            .min(HISTORY_HARD_CAP_DAYS)
    }

    pub fn can_navigate_back(&self) -> bool {
        self.history.current_index < self.available_history_days()
    }

    pub fn can_navigate_forward(&self) -> bool {
        self.history.current_index > 0
    }

    /// Step one day back. Returns false when already at the history limit.
    pub fn navigate_back(&mut self) -> Result<bool> {
        if !self.can_navigate_back() {
            tracing::warn!("Cannot navigate back, at history limit");
            return Ok(false);
        }

        let current_key = format_date(self.date_at(self.history.current_index));
        if let Some(current) = &self.current {
            self.history
                .shown_messages
                .entry(current_key)
                .or_insert(current.id);
        }

        let new_index = self.history.current_index + 1;
        let target = self.date_at(new_index);
        let key = format_date(target);

        let id = match self.history.shown_messages.get(&key) {
            Some(id) => *id,
            None => {
                let pool = rotation_pool(&self.messages);
                let id = pick_for_date(&pool, target)?.id;
                self.history.shown_messages.insert(key.clone(), id);
                id
            }
        };

        self.history.current_index = new_index;
        if let Some(message) = self.find(id) {
            self.current = Some(message);
        }

        tracing::debug!("Navigated to {}, message {}", key, id);
        Ok(true)
    }

    /// Step one day forward using the pinned message for that date
    pub fn navigate_forward(&mut self) -> bool {
        if !self.can_navigate_forward() {
            tracing::warn!("Cannot navigate forward, already at today");
            return false;
        }

        let new_index = self.history.current_index - 1;
        let key = format_date(self.date_at(new_index));
        let id = self.history.shown_messages.get(&key).copied();

        self.history.current_index = new_index;
        self.current = id.and_then(|id| self.find(id));

        tracing::debug!("Navigated to {}, message {:?}", key, id);
        true
    }

    /// Swap in a fresh message list. Pinned dates keep their ids.
    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        if let Some(id) = self.current.as_ref().map(|m| m.id) {
            self.current = self.find(id);
        }
    }

    pub fn current_message(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    pub fn current_index(&self) -> u32 {
        self.history.current_index
    }

    pub fn current_date(&self) -> NaiveDate {
        self.date_at(self.history.current_index)
    }

    pub fn history(&self) -> &MessageHistory {
        &self.history
    }

    pub fn into_history(self) -> MessageHistory {
        self.history
    }

    fn date_at(&self, index: u32) -> NaiveDate {
        self.today - Duration::days(i64::from(index))
    }

    fn find(&self, id: i64) -> Option<Message> {
        self.messages.iter().find(|m| m.id == id).cloned()
    }
}

/// Build a cursor over every stored message
pub async fn load_history_cursor(
    service: &MessagesService,
    history: MessageHistory,
    today: NaiveDate,
    relationship_start: NaiveDate,
) -> Result<HistoryCursor> {
    let messages = service.query(&MessageFilter::default()).await?;
    tracing::debug!("Loaded {} messages for history", messages.len());
    Ok(HistoryCursor::new(messages, history, today, relationship_start))
}

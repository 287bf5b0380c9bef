//! The conversation entity and its embedded analytics.
//!
//! A conversation owns an append-only message sequence plus denormalized
//! counters. The counters are kept consistent with the sequence by making
//! every mutation go through [`Conversation::push`] or
//! [`Conversation::clear`]; after either completes, `total_messages`
//! equals the sequence length and the per-sender counters sum to it.

use crate::error::StoreError;
use crate::message::{Message, MessageDraft, Sender};
use chrono::{DateTime, Utc};
use copper_finch_core::{ConversationId, UserId};
use copper_finch_responder::Language;
use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Default number of messages returned by [`Conversation::recent_messages`].
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Number of characters of the first user message used for a default title.
const TITLE_PREFIX_CHARS: usize = 50;

/// Title given to conversations created without one.
const UNTITLED: &str = "New Conversation";

/// Denormalized message counters for a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    /// Total messages in the conversation.
    pub total_messages: u64,
    /// Messages sent by the owner.
    pub user_messages: u64,
    /// Messages sent by the assistant.
    pub ai_messages: u64,
    /// Running mean of assistant processing time, in milliseconds, over
    /// assistant messages that carried the measurement.
    pub average_response_time: f64,
    /// How many assistant messages carried a processing-time
    /// measurement; the denominator of `average_response_time`.
    pub response_time_samples: u64,
}

impl Analytics {
    /// Folds a newly appended message into the counters.
    fn record(&mut self, message: &Message) {
        self.total_messages += 1;
        match message.sender {
            Sender::User => self.user_messages += 1,
            Sender::Ai => {
                self.ai_messages += 1;
                if let Some(elapsed) = message.metadata.processing_time {
                    self.response_time_samples += 1;
                    let n = self.response_time_samples as f64;
                    self.average_response_time += (elapsed - self.average_response_time) / n;
                }
            }
        }
    }
}

/// The assistant persona a conversation asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiPersonality {
    /// Warm, casual tone.
    #[default]
    Friendly,
    /// Businesslike tone.
    Professional,
    /// Playful, exploratory tone.
    Creative,
    /// Precise, detail-heavy tone.
    Technical,
}

/// Preferred reply length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLength {
    /// A sentence or two.
    Short,
    /// A short paragraph.
    #[default]
    Medium,
    /// As long as it takes.
    Long,
}

/// Per-conversation generation settings.
///
/// Stored with the conversation but not interpreted by the rule-based
/// responder; a richer generation backend reads these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSettings {
    /// The assistant persona.
    pub ai_personality: AiPersonality,
    /// Preferred reply length.
    pub response_length: ResponseLength,
    /// Whether replies may include code blocks.
    pub include_code: bool,
}

impl ConversationSettings {
    /// The defaults a new conversation starts with.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ai_personality: AiPersonality::Friendly,
            response_length: ResponseLength::Medium,
            include_code: true,
        }
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// A titled, owned sequence of messages plus derived analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier, assigned at creation.
    pub id: ConversationId,
    /// The owning user. Every access is checked against this.
    pub owner_id: UserId,
    /// Title, 1-100 characters.
    pub title: String,
    /// Ordered message sequence, append-only except for `clear`.
    pub messages: Vec<Message>,
    /// Conversation language, fixed at creation.
    pub language: Language,
    /// Archival marker. Stored only; hard delete is authoritative.
    pub is_active: bool,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Updated on every append and on clear.
    pub last_activity: DateTime<Utc>,
    /// Generation settings, stored but not interpreted here.
    pub settings: ConversationSettings,
    /// Denormalized counters, consistent with `messages`.
    pub analytics: Analytics,
}

impl Conversation {
    /// Creates an empty conversation for an owner.
    #[must_use]
    pub fn new(owner_id: UserId, language: Language, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            owner_id,
            title: title.unwrap_or_else(|| UNTITLED.to_string()),
            messages: Vec::new(),
            language,
            is_active: true,
            created_at: now,
            last_activity: now,
            settings: ConversationSettings::new(),
            analytics: Analytics::default(),
        }
    }

    /// Derives a default title from the first user message: the first 50
    /// characters, with an ellipsis when truncated.
    #[must_use]
    pub fn default_title(text: &str) -> String {
        let text = text.trim();
        let mut title: String = text.chars().take(TITLE_PREFIX_CHARS).collect();
        if text.chars().count() > TITLE_PREFIX_CHARS {
            title.push_str("...");
        }
        title
    }

    /// Appends a message built from a draft.
    ///
    /// The timestamp is clamped to the last message's timestamp so the
    /// sequence stays non-decreasing even if the clock steps backwards.
    /// Counters and `last_activity` are updated in the same call, so an
    /// observer holding the entity never sees them disagree.
    pub(crate) fn push(&mut self, draft: MessageDraft) -> Message {
        let floor = self
            .messages
            .last()
            .map_or(self.created_at, |m| m.timestamp);
        let timestamp = Utc::now().max(floor);

        let message = Message::from_draft(draft, self.language, timestamp);
        self.analytics.record(&message);
        self.last_activity = timestamp;
        self.messages.push(message.clone());
        message
    }

    /// Empties the message sequence and zeroes the analytics in one step.
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.analytics = Analytics::default();
        self.last_activity = Utc::now();
    }

    /// Returns the last `limit` messages in original order.
    ///
    /// A limit of zero falls back to the default of 50. A limit at or
    /// beyond the message count returns everything.
    #[must_use]
    pub fn recent_messages(&self, limit: usize) -> &[Message] {
        let limit = if limit == 0 { DEFAULT_RECENT_LIMIT } else { limit };
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Validates and normalizes a conversation title.
///
/// # Errors
///
/// Returns [`StoreError::Validation`] when the trimmed title is empty or
/// longer than 100 characters.
pub fn validate_title(title: &str) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(StoreError::Validation {
            field: "title",
            constraint: format!("must be 1-{MAX_TITLE_CHARS} characters"),
        });
    }
    Ok(title.to_string())
}

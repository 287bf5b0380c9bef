//! Message types for conversations.
//!
//! Messages are immutable once appended. Validation happens on the
//! [`MessageDraft`] before anything touches a conversation, so a rejected
//! message never leaves partial state behind.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use copper_finch_core::MessageId;
use copper_finch_responder::Language;
use serde::{Deserialize, Serialize};

/// Maximum length of user-supplied message content, in characters
/// (Unicode scalar values, not bytes).
pub const MAX_USER_CONTENT_CHARS: usize = 1000;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The owning user.
    User,
    /// The assistant.
    Ai,
}

/// The kind of content a message carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Plain text.
    #[default]
    Text,
    /// Image reference.
    Image,
    /// File reference.
    File,
    /// Voice recording reference.
    Voice,
}

/// Metadata attached to a message at append time.
///
/// `language` is inherited from the conversation; the optional fields are
/// informational only and never required for correctness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// The conversation's language at append time.
    pub language: Language,
    /// Detected sentiment, if any analysis ran.
    pub sentiment: Option<String>,
    /// Confidence of the reply, 0.0 - 1.0.
    pub confidence: Option<f64>,
    /// Time spent producing the reply, in milliseconds.
    pub processing_time: Option<f64>,
}

/// A message within a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message content, trimmed.
    pub content: String,
    /// Who sent the message.
    pub sender: Sender,
    /// When the message was appended. Non-decreasing within a conversation.
    pub timestamp: DateTime<Utc>,
    /// The kind of content.
    pub message_type: MessageType,
    /// Metadata captured at append time.
    pub metadata: MessageMetadata,
}

impl Message {
    /// Builds a message from a validated draft.
    ///
    /// The timestamp is supplied by the conversation so ordering can be
    /// kept non-decreasing in one place.
    pub(crate) fn from_draft(
        draft: MessageDraft,
        language: Language,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            content: draft.content,
            sender: draft.sender,
            timestamp,
            message_type: draft.message_type,
            metadata: MessageMetadata {
                language,
                sentiment: draft.sentiment,
                confidence: draft.confidence,
                processing_time: draft.processing_time,
            },
        }
    }
}

/// A message waiting to be appended to a conversation.
///
/// Content is trimmed on construction. The conversation's language is not
/// known here; it is merged in at append time.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    /// Message content, trimmed.
    pub content: String,
    /// Who is sending.
    pub sender: Sender,
    /// The kind of content. Defaults to text.
    pub message_type: MessageType,
    /// Optional sentiment annotation.
    pub sentiment: Option<String>,
    /// Optional confidence annotation.
    pub confidence: Option<f64>,
    /// Optional processing time, in milliseconds.
    pub processing_time: Option<f64>,
}

impl MessageDraft {
    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            content: content.into().trim().to_string(),
            sender,
            message_type: MessageType::default(),
            sentiment: None,
            confidence: None,
            processing_time: None,
        }
    }

    /// Creates a user message draft.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, content)
    }

    /// Creates an assistant message draft.
    #[must_use]
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, content)
    }

    /// Sets the message type.
    #[must_use]
    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    /// Attaches a sentiment annotation.
    #[must_use]
    pub fn with_sentiment(mut self, sentiment: impl Into<String>) -> Self {
        self.sentiment = Some(sentiment.into());
        self
    }

    /// Attaches a confidence annotation.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attaches the time spent producing the content, in milliseconds.
    #[must_use]
    pub fn with_processing_time(mut self, millis: f64) -> Self {
        self.processing_time = Some(millis);
        self
    }

    /// Validates the draft content against the sender-specific rules.
    ///
    /// User content must be 1-1000 characters after trimming; assistant
    /// content only has to be non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when the content is out of range.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.content.is_empty() {
            return Err(StoreError::Validation {
                field: "content",
                constraint: "must not be empty".to_string(),
            });
        }
        if self.sender == Sender::User && self.content.chars().count() > MAX_USER_CONTENT_CHARS {
            return Err(StoreError::Validation {
                field: "content",
                constraint: format!("must be at most {MAX_USER_CONTENT_CHARS} characters"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_trims_content() {
        let draft = MessageDraft::user("  hello  ");
        assert_eq!(draft.content, "hello");
    }

    #[test]
    fn draft_defaults_to_text() {
        let draft = MessageDraft::user("hello");
        assert_eq!(draft.message_type, MessageType::Text);
    }

    #[test]
    fn empty_content_rejected() {
        let draft = MessageDraft::user("   ");
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "content", .. }));
    }

    #[test]
    fn user_content_at_limit_accepted() {
        let draft = MessageDraft::user("x".repeat(MAX_USER_CONTENT_CHARS));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn user_content_over_limit_rejected() {
        let draft = MessageDraft::user("x".repeat(MAX_USER_CONTENT_CHARS + 1));
        assert!(draft.validate().is_err());
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        // 1000 Devanagari characters is triple that in bytes.
        let draft = MessageDraft::user("म".repeat(MAX_USER_CONTENT_CHARS));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn ai_content_is_unbounded() {
        let draft = MessageDraft::ai("x".repeat(MAX_USER_CONTENT_CHARS * 3));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn builder_attaches_metadata() {
        let draft = MessageDraft::ai("done")
            .with_message_type(MessageType::Voice)
            .with_sentiment("neutral")
            .with_confidence(0.92)
            .with_processing_time(12.5);

        assert_eq!(draft.message_type, MessageType::Voice);
        assert_eq!(draft.sentiment.as_deref(), Some("neutral"));
        assert_eq!(draft.confidence, Some(0.92));
        assert_eq!(draft.processing_time, Some(12.5));
    }

    #[test]
    fn from_draft_inherits_language() {
        let draft = MessageDraft::user("hola").with_sentiment("positive");
        let msg = Message::from_draft(draft, Language::Es, Utc::now());

        assert_eq!(msg.metadata.language, Language::Es);
        assert_eq!(msg.metadata.sentiment.as_deref(), Some("positive"));
        assert_eq!(msg.sender, Sender::User);
    }

    #[test]
    fn message_serde_roundtrip() {
        let msg = Message::from_draft(
            MessageDraft::ai("Here you go.").with_processing_time(3.0),
            Language::En,
            Utc::now(),
        );

        let json = serde_json::to_string(&msg).expect("serialize");
        let parsed: Message = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(msg.id, parsed.id);
        assert_eq!(msg.content, parsed.content);
        assert_eq!(msg.metadata, parsed.metadata);
    }
}

//! Storage seam for conversations.
//!
//! Every operation is scoped by the owning user; a conversation that
//! exists but belongs to someone else is reported as not found.

use crate::conversation::{Conversation, ConversationSettings};
use crate::error::StoreError;
use crate::message::{Message, MessageDraft};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copper_finch_core::{ConversationId, UserId};
use copper_finch_responder::Language;
use serde::{Deserialize, Serialize};

/// Default page size for conversation listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
}

impl PageRequest {
    /// Creates a page request.
    #[must_use]
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Checks the request is within bounds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when `page` or `page_size` is
    /// below 1.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.page < 1 {
            return Err(StoreError::Validation {
                field: "page",
                constraint: "must be a positive integer".to_string(),
            });
        }
        if self.page_size < 1 {
            return Err(StoreError::Validation {
                field: "page_size",
                constraint: "must be a positive integer".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Pagination metadata for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The page this listing covers, 1-indexed.
    pub current: usize,
    /// Total number of pages.
    pub total: usize,
    /// Whether items exist after this page.
    pub has_next: bool,
    /// Whether this is past the first page.
    pub has_prev: bool,
}

/// A conversation as it appears in a listing: no message bodies, only
/// what is needed to render a sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Conversation title.
    pub title: String,
    /// Last append or clear.
    pub last_activity: DateTime<Utc>,
    /// Number of messages.
    pub message_count: usize,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title.clone(),
            last_activity: conversation.last_activity,
            message_count: conversation.message_count(),
            created_at: conversation.created_at,
        }
    }
}

/// One page of conversation summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPage {
    /// The summaries on this page, most recent activity first.
    pub items: Vec<ConversationSummary>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// Trait for conversation storage.
///
/// Implementations must make `append` and `clear` atomic per
/// conversation: two concurrent appends may be ordered either way, but
/// both must be counted, and no observer may see a message without its
/// counter increment.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates a conversation for an owner.
    async fn create(
        &self,
        owner_id: UserId,
        language: Language,
        title: Option<String>,
    ) -> Result<Conversation, StoreError>;

    /// Finds a conversation owned by the caller.
    async fn find(
        &self,
        owner_id: UserId,
        id: ConversationId,
    ) -> Result<Conversation, StoreError>;

    /// Validates and appends a message, updating the counters and
    /// `last_activity` in the same mutation.
    async fn append(
        &self,
        owner_id: UserId,
        id: ConversationId,
        draft: MessageDraft,
    ) -> Result<Message, StoreError>;

    /// Empties the message sequence and zeroes the counters atomically.
    async fn clear(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError>;

    /// Validates and persists a new title, returning it.
    async fn update_title(
        &self,
        owner_id: UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<String, StoreError>;

    /// Replaces the conversation settings.
    async fn update_settings(
        &self,
        owner_id: UserId,
        id: ConversationId,
        settings: ConversationSettings,
    ) -> Result<(), StoreError>;

    /// Hard-deletes a conversation. A second delete reports not found.
    async fn delete(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError>;

    /// Lists the caller's conversations by most recent activity, ties
    /// broken by id descending.
    async fn list(
        &self,
        owner_id: UserId,
        page: PageRequest,
    ) -> Result<ConversationPage, StoreError>;
}

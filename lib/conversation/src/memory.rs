//! In-memory conversation store.
//!
//! Conversations live in a single map behind a read-write lock. Every
//! mutation runs to completion under one write-lock acquisition, which
//! gives the atomicity the store contract asks for: an append's message
//! push and counter increments land together, and a clear is never
//! observable half-done.

use crate::conversation::{validate_title, Conversation, ConversationSettings};
use crate::error::StoreError;
use crate::message::{Message, MessageDraft};
use crate::store::{
    ConversationPage, ConversationStore, ConversationSummary, PageRequest, Pagination,
};
use async_trait::async_trait;
use copper_finch_core::{ConversationId, UserId};
use copper_finch_responder::Language;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// Listing order: most recent activity first, ties broken by id
/// descending so pages are deterministic.
fn listing_order(a: &Conversation, b: &Conversation) -> Ordering {
    b.last_activity
        .cmp(&a.last_activity)
        .then_with(|| b.id.cmp(&a.id))
}

/// An in-memory [`ConversationStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a mutation against an owned conversation under the write lock.
    fn with_owned<T>(
        &self,
        owner_id: UserId,
        id: ConversationId,
        mutate: impl FnOnce(&mut Conversation) -> T,
    ) -> Result<T, StoreError> {
        let mut conversations = self.conversations.write().unwrap();
        match conversations.get_mut(&id) {
            Some(conversation) if conversation.owner_id == owner_id => Ok(mutate(conversation)),
            // Absent and not-owned are indistinguishable to the caller.
            _ => Err(StoreError::NotFound { id }),
        }
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    #[instrument(skip(self, title), fields(owner = %owner_id, language = %language))]
    async fn create(
        &self,
        owner_id: UserId,
        language: Language,
        title: Option<String>,
    ) -> Result<Conversation, StoreError> {
        let title = match title {
            Some(title) => Some(validate_title(&title)?),
            None => None,
        };
        let conversation = Conversation::new(owner_id, language, title);
        let mut conversations = self.conversations.write().unwrap();
        conversations.insert(conversation.id, conversation.clone());
        debug!(id = %conversation.id, "conversation created");
        Ok(conversation)
    }

    async fn find(
        &self,
        owner_id: UserId,
        id: ConversationId,
    ) -> Result<Conversation, StoreError> {
        let conversations = self.conversations.read().unwrap();
        conversations
            .get(&id)
            .filter(|conversation| conversation.owner_id == owner_id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    #[instrument(skip(self, draft), fields(owner = %owner_id, id = %id))]
    async fn append(
        &self,
        owner_id: UserId,
        id: ConversationId,
        draft: MessageDraft,
    ) -> Result<Message, StoreError> {
        draft.validate()?;
        let message = self.with_owned(owner_id, id, |conversation| conversation.push(draft))?;
        debug!(message_id = %message.id, sender = ?message.sender, "message appended");
        Ok(message)
    }

    #[instrument(skip(self), fields(owner = %owner_id, id = %id))]
    async fn clear(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError> {
        self.with_owned(owner_id, id, Conversation::clear)?;
        debug!("conversation cleared");
        Ok(())
    }

    async fn update_title(
        &self,
        owner_id: UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<String, StoreError> {
        let title = validate_title(title)?;
        self.with_owned(owner_id, id, |conversation| {
            conversation.title = title.clone();
        })?;
        Ok(title)
    }

    async fn update_settings(
        &self,
        owner_id: UserId,
        id: ConversationId,
        settings: ConversationSettings,
    ) -> Result<(), StoreError> {
        self.with_owned(owner_id, id, |conversation| {
            conversation.settings = settings;
        })
    }

    #[instrument(skip(self), fields(owner = %owner_id, id = %id))]
    async fn delete(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().unwrap();
        match conversations.get(&id) {
            Some(conversation) if conversation.owner_id == owner_id => {
                conversations.remove(&id);
                debug!("conversation deleted");
                Ok(())
            }
            _ => Err(StoreError::NotFound { id }),
        }
    }

    async fn list(
        &self,
        owner_id: UserId,
        page: PageRequest,
    ) -> Result<ConversationPage, StoreError> {
        page.validate()?;

        let conversations = self.conversations.read().unwrap();
        let mut owned: Vec<&Conversation> = conversations
            .values()
            .filter(|conversation| conversation.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| listing_order(a, b));

        let count = owned.len();
        let items: Vec<ConversationSummary> = owned
            .into_iter()
            .skip((page.page - 1).saturating_mul(page.page_size))
            .take(page.page_size)
            .map(ConversationSummary::from)
            .collect();

        Ok(ConversationPage {
            items,
            pagination: Pagination {
                current: page.page,
                total: count.div_ceil(page.page_size),
                has_next: page.page.saturating_mul(page.page_size) < count,
                has_prev: page.page > 1,
            },
        })
    }
}

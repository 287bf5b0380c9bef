//! Conversation service: orchestrates the store and the responder.
//!
//! The send path is deliberately ordered: the user message is durably
//! appended before the reply is computed and appended. A failure in
//! between leaves a conversation with an odd message count and intact
//! counters, which callers can inspect; the service never rolls back or
//! retries the reply step.
//!
//! The service is the report boundary: store errors stay typed inside
//! the crate and are lifted into a rootcause `Report<StoreError>` here,
//! so embedders can attach their own context as errors propagate.

use crate::conversation::{Analytics, Conversation, ConversationSettings, DEFAULT_RECENT_LIMIT};
use crate::error::StoreError;
use crate::message::{Message, MessageDraft};
use crate::store::{ConversationPage, ConversationStore, PageRequest};
use copper_finch_core::{ConversationId, Result, UserId};
use copper_finch_responder::{respond, Language};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

/// A conversation as returned to callers: identity, recent messages and
/// the derived counters, plus the stored settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Conversation title.
    pub title: String,
    /// The most recent messages, in original order.
    pub messages: Vec<Message>,
    /// Denormalized counters.
    pub analytics: Analytics,
    /// Stored generation settings.
    pub settings: ConversationSettings,
    /// The conversation language.
    pub language: Language,
}

impl ConversationView {
    fn of(conversation: &Conversation, limit: usize) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title.clone(),
            messages: conversation.recent_messages(limit).to_vec(),
            analytics: conversation.analytics.clone(),
            settings: conversation.settings,
            language: conversation.language,
        }
    }
}

/// The conversation service.
///
/// Generic over the store so tests and embedders can choose the backend.
#[derive(Debug, Clone)]
pub struct ConversationService<S> {
    store: S,
}

impl<S: ConversationStore> ConversationService<S> {
    /// Creates a service over a store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Sends a message, creating the conversation when no id is given.
    ///
    /// The reply language is the conversation's own language; `language`
    /// only seeds newly created conversations.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range text before anything
    /// is created or appended, and not-found when `conversation_id` does
    /// not resolve for this owner.
    #[instrument(skip(self, text), fields(owner = %owner_id))]
    pub async fn send_message(
        &self,
        owner_id: UserId,
        conversation_id: Option<ConversationId>,
        text: &str,
        language: Language,
    ) -> Result<ConversationView, StoreError> {
        let user_draft = MessageDraft::user(text);
        user_draft.validate()?;

        let conversation = match conversation_id {
            Some(id) => self.store.find(owner_id, id).await?,
            None => {
                let title = Conversation::default_title(&user_draft.content);
                self.store.create(owner_id, language, Some(title)).await?
            }
        };
        let id = conversation.id;

        self.store.append(owner_id, id, user_draft).await?;

        let started = Instant::now();
        let reply = respond(text, conversation.language);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(language = %conversation.language, "reply selected");

        self.store
            .append(
                owner_id,
                id,
                MessageDraft::ai(reply).with_processing_time(elapsed_ms),
            )
            .await?;

        let conversation = self.store.find(owner_id, id).await?;
        Ok(ConversationView::of(&conversation, DEFAULT_RECENT_LIMIT))
    }

    /// Fetches a conversation view with up to `limit` recent messages
    /// (default 50).
    ///
    /// # Errors
    ///
    /// Returns not-found when the conversation is absent or not owned.
    #[instrument(skip(self), fields(owner = %owner_id, id = %id))]
    pub async fn get_conversation(
        &self,
        owner_id: UserId,
        id: ConversationId,
        limit: Option<usize>,
    ) -> Result<ConversationView, StoreError> {
        let conversation = self.store.find(owner_id, id).await?;
        Ok(ConversationView::of(
            &conversation,
            limit.unwrap_or(DEFAULT_RECENT_LIMIT),
        ))
    }

    /// Lists the owner's conversations as summaries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for non-positive page parameters.
    #[instrument(skip(self), fields(owner = %owner_id))]
    pub async fn list_conversations(
        &self,
        owner_id: UserId,
        page: PageRequest,
    ) -> Result<ConversationPage, StoreError> {
        Ok(self.store.list(owner_id, page).await?)
    }

    /// Renames a conversation, returning the stored title.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range title, not-found
    /// when the conversation is absent or not owned.
    #[instrument(skip(self, title), fields(owner = %owner_id, id = %id))]
    pub async fn update_title(
        &self,
        owner_id: UserId,
        id: ConversationId,
        title: &str,
    ) -> Result<String, StoreError> {
        Ok(self.store.update_title(owner_id, id, title).await?)
    }

    /// Replaces the conversation's generation settings.
    ///
    /// # Errors
    ///
    /// Returns not-found when the conversation is absent or not owned.
    #[instrument(skip(self, settings), fields(owner = %owner_id, id = %id))]
    pub async fn update_settings(
        &self,
        owner_id: UserId,
        id: ConversationId,
        settings: ConversationSettings,
    ) -> Result<(), StoreError> {
        Ok(self.store.update_settings(owner_id, id, settings).await?)
    }

    /// Empties a conversation's messages and counters.
    ///
    /// # Errors
    ///
    /// Returns not-found when the conversation is absent or not owned.
    #[instrument(skip(self), fields(owner = %owner_id, id = %id))]
    pub async fn clear(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError> {
        Ok(self.store.clear(owner_id, id).await?)
    }

    /// Hard-deletes a conversation.
    ///
    /// # Errors
    ///
    /// Returns not-found when the conversation is absent or not owned,
    /// including on a repeated delete.
    #[instrument(skip(self), fields(owner = %owner_id, id = %id))]
    pub async fn delete(&self, owner_id: UserId, id: ConversationId) -> Result<(), StoreError> {
        Ok(self.store.delete(owner_id, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::AiPersonality;
    use crate::memory::MemoryStore;
    use crate::message::Sender;

    fn service() -> ConversationService<MemoryStore> {
        ConversationService::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn send_to_new_thread_creates_titled_conversation() {
        let service = service();
        let owner = UserId::new();

        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        assert_eq!(view.title, "Hello");
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[0].sender, Sender::User);
        assert_eq!(view.messages[0].content, "Hello");
        assert_eq!(view.messages[1].sender, Sender::Ai);
        assert_eq!(view.messages[1].content, respond("Hello", Language::En));
        assert_eq!(view.analytics.total_messages, 2);
        assert_eq!(view.analytics.user_messages, 1);
        assert_eq!(view.analytics.ai_messages, 1);
    }

    #[tokio::test]
    async fn default_title_truncates_long_first_message() {
        let service = service();
        let text = "w".repeat(80);

        let view = service
            .send_message(UserId::new(), None, &text, Language::En)
            .await
            .expect("send");

        assert_eq!(view.title, format!("{}...", "w".repeat(50)));
    }

    #[tokio::test]
    async fn oversized_text_creates_nothing() {
        let service = service();
        let owner = UserId::new();

        let result = service
            .send_message(owner, None, &"x".repeat(1001), Language::En)
            .await;
        assert!(result.is_err());

        let page = service
            .list_conversations(owner, PageRequest::default())
            .await
            .expect("list");
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);
    }

    #[tokio::test]
    async fn send_to_existing_conversation_appends() {
        let service = service();
        let owner = UserId::new();

        let first = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");
        let second = service
            .send_message(owner, Some(first.id), "help me out", Language::En)
            .await
            .expect("send");

        assert_eq!(second.id, first.id);
        assert_eq!(second.analytics.total_messages, 4);
        assert_eq!(second.title, "Hello");
    }

    #[tokio::test]
    async fn reply_uses_the_conversation_language() {
        let service = service();
        let owner = UserId::new();

        let view = service
            .send_message(owner, None, "नमस्ते", Language::Hi)
            .await
            .expect("send");
        // Later sends cannot switch the language; the stored one wins.
        let view = service
            .send_message(owner, Some(view.id), "नमस्ते फिर से", Language::En)
            .await
            .expect("send");

        let greeting = respond("नमस्ते", Language::Hi);
        assert_eq!(view.messages[1].content, greeting);
        assert_eq!(view.messages[3].content, greeting);
        assert_eq!(view.language, Language::Hi);
    }

    #[tokio::test]
    async fn reply_carries_processing_time_into_average() {
        let service = service();
        let view = service
            .send_message(UserId::new(), None, "Hello", Language::En)
            .await
            .expect("send");

        assert!(view.messages[1].metadata.processing_time.is_some());
        assert!(view.analytics.average_response_time >= 0.0);
    }

    #[tokio::test]
    async fn send_to_foreign_conversation_is_not_found() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        let result = service
            .send_message(UserId::new(), Some(view.id), "Hello", Language::En)
            .await;
        assert!(result.is_err());

        // The stranger's send must not have touched the conversation.
        let view = service
            .get_conversation(owner, view.id, None)
            .await
            .expect("get");
        assert_eq!(view.analytics.total_messages, 2);
    }

    #[tokio::test]
    async fn get_conversation_respects_limit() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");
        for _ in 0..4 {
            service
                .send_message(owner, Some(view.id), "more", Language::En)
                .await
                .expect("send");
        }

        let limited = service
            .get_conversation(owner, view.id, Some(3))
            .await
            .expect("get");
        assert_eq!(limited.messages.len(), 3);
        assert_eq!(limited.analytics.total_messages, 10);

        let full = service
            .get_conversation(owner, view.id, None)
            .await
            .expect("get");
        assert_eq!(full.messages.len(), 10);
    }

    #[tokio::test]
    async fn clear_then_get_is_empty() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        service.clear(owner, view.id).await.expect("clear");

        let cleared = service
            .get_conversation(owner, view.id, None)
            .await
            .expect("get");
        assert!(cleared.messages.is_empty());
        assert_eq!(cleared.analytics, Analytics::default());
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        service.delete(owner, view.id).await.expect("delete");
        assert!(service.delete(owner, view.id).await.is_err());
        assert!(service.get_conversation(owner, view.id, None).await.is_err());
    }

    #[tokio::test]
    async fn list_pages_summaries_without_bodies() {
        let service = service();
        let owner = UserId::new();
        for i in 0..15 {
            service
                .send_message(owner, None, &format!("conversation {i}"), Language::En)
                .await
                .expect("send");
        }

        let page = service
            .list_conversations(owner, PageRequest::new(2, 10))
            .await
            .expect("list");
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.current, 2);
        assert_eq!(page.pagination.total, 2);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
        assert!(page.items.iter().all(|s| s.message_count == 2));
    }

    #[tokio::test]
    async fn settings_update_round_trips() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        let mut settings = ConversationSettings::new();
        settings.ai_personality = AiPersonality::Creative;
        service
            .update_settings(owner, view.id, settings)
            .await
            .expect("update");

        let fetched = service
            .get_conversation(owner, view.id, None)
            .await
            .expect("get");
        assert_eq!(fetched.settings, settings);
    }

    #[tokio::test]
    async fn title_update_round_trips() {
        let service = service();
        let owner = UserId::new();
        let view = service
            .send_message(owner, None, "Hello", Language::En)
            .await
            .expect("send");

        let title = service
            .update_title(owner, view.id, "Greetings")
            .await
            .expect("update");
        assert_eq!(title, "Greetings");

        let fetched = service
            .get_conversation(owner, view.id, None)
            .await
            .expect("get");
        assert_eq!(fetched.title, "Greetings");
    }

    #[tokio::test]
    async fn view_serde_roundtrip() {
        let service = service();
        let view = service
            .send_message(UserId::new(), None, "Hello", Language::En)
            .await
            .expect("send");

        let json = serde_json::to_string(&view).expect("serialize");
        let parsed: ConversationView = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.id, view.id);
        assert_eq!(parsed.messages.len(), view.messages.len());
    }
}

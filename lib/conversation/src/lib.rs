//! Conversation and message store for the copper-finch platform.
//!
//! This crate provides:
//!
//! - **Conversation**: The titled, owned message sequence with embedded
//!   analytics counters
//! - **Store**: The owner-scoped storage seam plus an in-memory backend
//! - **Service**: The send/list/retrieve orchestration over the store and
//!   the rule-based responder

pub mod conversation;
pub mod error;
pub mod memory;
pub mod message;
pub mod service;
pub mod store;

pub use conversation::{
    AiPersonality, Analytics, Conversation, ConversationSettings, DEFAULT_RECENT_LIMIT,
    MAX_TITLE_CHARS, ResponseLength,
};
pub use copper_finch_responder::Language;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use message::{
    MAX_USER_CONTENT_CHARS, Message, MessageDraft, MessageMetadata, MessageType, Sender,
};
pub use service::{ConversationService, ConversationView};
pub use store::{
    ConversationPage, ConversationStore, ConversationSummary, DEFAULT_PAGE_SIZE, PageRequest,
    Pagination,
};

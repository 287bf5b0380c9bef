//! Core domain types and utilities for the copper-finch platform.
//!
//! This crate provides the foundational identifier types and error
//! handling shared by the conversation and responder crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConversationId, MessageId, ParseIdError, UserId};

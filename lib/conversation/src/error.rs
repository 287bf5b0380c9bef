//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause: the store
//! returns typed `StoreError` values, and callers add layer-appropriate
//! context as errors propagate up the stack.
//!
//! Ownership violations surface as `NotFound`, never as a distinct
//! permission error, so cross-owner probing cannot learn whether a
//! conversation exists.

use copper_finch_core::ConversationId;
use std::fmt;

/// Errors from conversation store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Conversation absent, or not owned by the caller.
    NotFound { id: ConversationId },
    /// Input rejected before any mutation took place.
    Validation {
        field: &'static str,
        constraint: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "conversation not found: {id}"),
            Self::Validation { field, constraint } => {
                write!(f, "invalid {field}: {constraint}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

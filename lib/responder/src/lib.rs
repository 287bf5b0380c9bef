//! Rule-based reply dispatch for the copper-finch platform.
//!
//! This crate provides:
//!
//! - **Language**: The supported conversation language codes
//! - **Rules**: Keyword-driven intent detection and canned reply tables
//!
//! The responder is a deterministic placeholder for a generative backend:
//! a pure function from (input text, language) to a reply, with no state
//! and no I/O.

pub mod language;
pub mod rules;

pub use language::Language;
pub use rules::{Intent, respond};

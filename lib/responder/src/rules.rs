//! Intent detection and canned reply tables.
//!
//! Dispatch is an explicit ordered list of (keywords, intent) pairs:
//! the lowercased input is tested for each keyword as a substring, in a
//! fixed priority order, and the first match wins. Languages without a
//! reply table fall back to the English one.

use crate::language::Language;

/// The intent detected in a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// The user opened with a greeting.
    Greeting,
    /// The user asked what the assistant can do.
    Help,
    /// The user asked about the weather.
    Weather,
    /// The user asked about code or programming.
    Code,
    /// No keyword matched.
    Default,
}

/// Keyword dispatch table, highest priority first.
///
/// Matching is substring-based, so short keywords match inside larger
/// words ("hi" matches "this").
const DISPATCH: &[(&[&str], Intent)] = &[
    (&["hello", "hi", "नमस्ते"], Intent::Greeting),
    (&["help", "मदद"], Intent::Help),
    (&["weather", "मौसम"], Intent::Weather),
    (&["code", "programming", "कोड"], Intent::Code),
];

/// Canned replies for one language, keyed by intent.
struct ReplyTable {
    greeting: &'static str,
    help: &'static str,
    weather: &'static str,
    code: &'static str,
    default: &'static str,
}

impl ReplyTable {
    const fn reply(&self, intent: Intent) -> &'static str {
        match intent {
            Intent::Greeting => self.greeting,
            Intent::Help => self.help,
            Intent::Weather => self.weather,
            Intent::Code => self.code,
            Intent::Default => self.default,
        }
    }
}

const EN: ReplyTable = ReplyTable {
    greeting: "Hello! I'm Jarvis, your AI assistant. How can I help you today?",
    help: "I can help you with various tasks like answering questions, writing code, \
           analyzing data, and more. What would you like to know?",
    weather: "I can help you check the weather! Please provide your location.",
    code: "I'd be happy to help you with coding! What programming language are you \
           working with?",
    default: "That's an interesting question! Let me think about that for a moment...",
};

const HI: ReplyTable = ReplyTable {
    greeting: "नमस्ते! मैं जारविस हूं, आपका AI सहायक। मैं आज आपकी कैसे मदद कर सकता हूं?",
    help: "मैं आपकी विभिन्न कार्यों में मदद कर सकता हूं जैसे प्रश्नों का उत्तर देना, कोड लिखना, डेटा विश्लेषण और बहुत कुछ। आप क्या जानना चाहते हैं?",
    weather: "मैं आपको मौसम की जानकारी देने में मदद कर सकता हूं! कृपया अपना स्थान बताएं।",
    code: "मैं आपकी कोडिंग में मदद करने में खुशी महसूस करूंगा! आप किस प्रोग्रामिंग भाषा के साथ काम कर रहे हैं?",
    default: "यह एक दिलचस्प सवाल है! मुझे इसके बारे में सोचने के लिए एक पल दें...",
};

/// Returns the reply table for a language, falling back to English for
/// languages without their own table.
const fn table_for(language: Language) -> &'static ReplyTable {
    match language {
        Language::Hi => &HI,
        _ => &EN,
    }
}

/// Detects the intent of a message.
///
/// Case-insensitive substring matching against the dispatch table, first
/// match wins.
#[must_use]
pub fn detect_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    DISPATCH
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lowered.contains(kw)))
        .map_or(Intent::Default, |(_, intent)| *intent)
}

/// Produces a reply for the given input in the given language.
///
/// Pure and total: never fails, never blocks, and identical inputs always
/// yield identical outputs.
#[must_use]
pub fn respond(text: &str, language: Language) -> &'static str {
    table_for(language).reply(detect_intent(text))
}

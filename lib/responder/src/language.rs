//! Supported conversation languages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported conversation language.
///
/// The set is fixed; a conversation picks its language at creation from
/// the owner's preference and keeps it for life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (the default and fallback language).
    #[default]
    En,
    /// Hindi.
    Hi,
    /// Spanish.
    Es,
    /// French.
    Fr,
    /// German.
    De,
    /// Japanese.
    Ja,
    /// Korean.
    Ko,
    /// Chinese.
    Zh,
}

impl Language {
    /// Returns the two-letter language code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Zh => "zh",
        }
    }

    /// Parses a language code, returning `None` for unsupported codes.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "hi" => Some(Self::Hi),
            "es" => Some(Self::Es),
            "fr" => Some(Self::Fr),
            "de" => Some(Self::De),
            "ja" => Some(Self::Ja),
            "ko" => Some(Self::Ko),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }

    /// Parses a language code, falling back to English for anything
    /// outside the supported set.
    #[must_use]
    pub fn parse_lossy(code: &str) -> Self {
        Self::from_code(code).unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//! Localized strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A string that is either plain or keyed by language code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedString {
    /// The same text in every language.
    Plain(String),
    /// Text per language code.
    Localized(BTreeMap<String, String>),
}

impl LocalizedString {
    /// Resolves the text for `language`.
    ///
    /// Tries the requested language, then `fallback`, then the first entry
    /// in language-code order. Returns `None` only for an empty map.
    #[must_use]
    pub fn resolve(&self, language: Option<&str>, fallback: &str) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::Localized(map) => language
                .and_then(|lang| map.get(lang))
                .or_else(|| map.get(fallback))
                .or_else(|| map.values().next())
                .map(String::as_str),
        }
    }
}

impl From<&str> for LocalizedString {
    fn from(s: &str) -> Self {
        Self::Plain(s.to_owned())
    }
}

impl From<String> for LocalizedString {
    fn from(s: String) -> Self {
        Self::Plain(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> LocalizedString {
        serde_json::from_str(r#"{"en": "Hello", "ja": "こんにちは"}"#).unwrap()
    }

    #[test]
    fn test_plain_string_resolves_for_any_language() {
        let text = LocalizedString::from("hi");
        assert_eq!(text.resolve(Some("fr"), "en"), Some("hi"));
        assert_eq!(text.resolve(None, "en"), Some("hi"));
    }

    #[test]
    fn test_requested_language_wins() {
        assert_eq!(greeting().resolve(Some("ja"), "en"), Some("こんにちは"));
    }

    #[test]
    fn test_missing_language_falls_back() {
        assert_eq!(greeting().resolve(Some("fr"), "en"), Some("Hello"));
    }

    #[test]
    fn test_missing_fallback_uses_first_entry() {
        let text: LocalizedString = serde_json::from_str(r#"{"de": "Hallo", "ja": "やあ"}"#).unwrap();
        assert_eq!(text.resolve(Some("fr"), "en"), Some("Hallo"));
    }

    #[test]
    fn test_empty_map_resolves_to_none() {
        let text = LocalizedString::Localized(BTreeMap::new());
        assert_eq!(text.resolve(Some("en"), "en"), None);
    }
}

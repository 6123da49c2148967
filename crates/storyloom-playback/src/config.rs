//! Playback configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a playback session.
///
/// Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Base auto-mode delay before advancing text (default: 2000 ms).
    #[serde(default = "default_auto_delay_ms")]
    pub auto_delay_ms: u64,
    /// Extra auto-mode delay per displayed character (default: 30 ms).
    #[serde(default = "default_auto_delay_per_char_ms")]
    pub auto_delay_per_char_ms: u64,
    /// Skip-mode tick (default: 50 ms).
    #[serde(default = "default_skip_tick_ms")]
    pub skip_tick_ms: u64,
    /// Preferred language for localized strings.
    #[serde(default)]
    pub language: Option<String>,
    /// Language tried when the preferred one is missing (default: `en`).
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,
    /// Commands executed without displaying before playback gives up
    /// on a runaway loop (default: 10 000).
    #[serde(default = "default_max_settle_steps")]
    pub max_settle_steps: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_delay_ms: default_auto_delay_ms(),
            auto_delay_per_char_ms: default_auto_delay_per_char_ms(),
            skip_tick_ms: default_skip_tick_ms(),
            language: None,
            fallback_language: default_fallback_language(),
            max_settle_steps: default_max_settle_steps(),
        }
    }
}

impl PlaybackConfig {
    /// Auto-mode delay for a line of `chars` characters.
    #[must_use]
    pub fn auto_delay(&self, chars: usize) -> Duration {
        let per_char = Duration::from_millis(self.auto_delay_per_char_ms)
            .saturating_mul(u32::try_from(chars).unwrap_or(u32::MAX));
        Duration::from_millis(self.auto_delay_ms).saturating_add(per_char)
    }

    /// Skip-mode tick.
    #[must_use]
    pub fn skip_tick(&self) -> Duration {
        Duration::from_millis(self.skip_tick_ms)
    }
}

fn default_auto_delay_ms() -> u64 {
    2000
}
fn default_auto_delay_per_char_ms() -> u64 {
    30
}
fn default_skip_tick_ms() -> u64 {
    50
}
fn default_fallback_language() -> String {
    "en".to_string()
}
fn default_max_settle_steps() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"skip_tick_ms": 10, "language": "ja"}"#).unwrap();

        assert_eq!(config.skip_tick(), Duration::from_millis(10));
        assert_eq!(config.language.as_deref(), Some("ja"));
        assert_eq!(config.auto_delay_ms, 2000);
        assert_eq!(config.fallback_language, "en");
    }

    #[test]
    fn test_auto_delay_grows_with_line_length() {
        let config = PlaybackConfig::default();

        assert_eq!(config.auto_delay(0), Duration::from_millis(2000));
        assert_eq!(config.auto_delay(10), Duration::from_millis(2300));
    }
}

//! Server configuration, read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use storyloom_playback::PlaybackConfig;

use crate::error::AppError;

/// Default cap on concurrently hosted playtests.
pub const DEFAULT_MAX_SESSIONS: usize = 64;

/// Everything the server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum number of live playtest sessions.
    pub max_sessions: usize,
    /// Defaults for every session started by this server.
    pub playback: PlaybackConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            max_sessions: DEFAULT_MAX_SESSIONS,
            playback: PlaybackConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// anything unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let mut playback = defaults.playback;
        playback.auto_delay_ms = parse(&lookup, "STORYLOOM_AUTO_DELAY_MS", playback.auto_delay_ms)?;
        playback.skip_tick_ms = parse(&lookup, "STORYLOOM_SKIP_TICK_MS", playback.skip_tick_ms)?;
        playback.language = lookup("STORYLOOM_LANGUAGE").filter(|lang| !lang.is_empty());

        let max_sessions = parse(&lookup, "STORYLOOM_MAX_SESSIONS", defaults.max_sessions)?;
        if max_sessions == 0 {
            return Err(AppError::Config(
                "STORYLOOM_MAX_SESSIONS must be at least 1".to_owned(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT", defaults.port)?,
            max_sessions,
            playback,
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServerConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = from_pairs(&[]).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("STORYLOOM_AUTO_DELAY_MS", "500"),
            ("STORYLOOM_LANGUAGE", "ja"),
            ("STORYLOOM_MAX_SESSIONS", "2"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.playback.auto_delay_ms, 500);
        assert_eq!(config.playback.skip_tick_ms, 50);
        assert_eq!(config.playback.language.as_deref(), Some("ja"));
        assert_eq!(config.max_sessions, 2);
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = from_pairs(&[("PORT", "eighty")]);

        assert!(matches!(result, Err(AppError::Config(message)) if message.contains("PORT")));
    }

    #[test]
    fn test_zero_max_sessions_is_rejected() {
        assert!(matches!(
            from_pairs(&[("STORYLOOM_MAX_SESSIONS", "0")]),
            Err(AppError::Config(_))
        ));
    }
}

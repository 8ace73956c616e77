//! Configuration types.
//!
//! Everything is read from the environment (after `.env` is loaded by the
//! binary). Parsing goes through a lookup function so it can be exercised
//! without touching the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::dialogue::{DEFAULT_MATCH_THRESHOLD, Locale};
use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Dialogue behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Language of the bot's own sentences.
    pub locale: Locale,
    /// Table scores must be strictly above this to match.
    pub match_threshold: u8,
    /// Sessions idle longer than this are dropped.
    pub session_idle_timeout: Duration,
    /// JSON file replacing the built-in special table.
    pub special_table: Option<PathBuf>,
    /// JSON file replacing the built-in predefined table.
    pub predefined_table: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            locale: Locale::English,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            special_table: None,
            predefined_table: None,
        }
    }
}

impl ChatConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let locale = match lookup("CAUSERIE_LOCALE") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "CAUSERIE_LOCALE".to_string(),
                message,
            })?,
            None => defaults.locale,
        };

        let match_threshold = match lookup("CAUSERIE_MATCH_THRESHOLD") {
            Some(raw) => parse_threshold(&raw)?,
            None => defaults.match_threshold,
        };

        let session_idle_timeout = match lookup("CAUSERIE_SESSION_IDLE_SECS") {
            Some(raw) => Duration::from_secs(parse_number("CAUSERIE_SESSION_IDLE_SECS", &raw)?),
            None => defaults.session_idle_timeout,
        };

        Ok(Self {
            locale,
            match_threshold,
            session_idle_timeout,
            special_table: lookup("CAUSERIE_SPECIAL_TABLE").map(PathBuf::from),
            predefined_table: lookup("CAUSERIE_PREDEFINED_TABLE").map(PathBuf::from),
        })
    }
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    pub llm: LlmConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend: LlmBackend = match lookup("CAUSERIE_LLM_BACKEND") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: "CAUSERIE_LLM_BACKEND".to_string(),
                message,
            })?,
            None => LlmBackend::OpenAi,
        };

        let key_var = backend.api_key_var();
        let api_key = lookup(key_var)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = lookup("CAUSERIE_MODEL").unwrap_or_else(|| backend.default_model().to_string());

        let port = match lookup("CAUSERIE_PORT") {
            Some(raw) => parse_number("CAUSERIE_PORT", &raw)?,
            None => 5000,
        };

        Ok(Self {
            port,
            llm: LlmConfig {
                backend,
                api_key: secrecy::SecretString::from(api_key),
                model,
            },
            chat: ChatConfig::from_lookup(&lookup)?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_threshold(raw: &str) -> Result<u8, ConfigError> {
    let value: u8 = parse_number("CAUSERIE_MATCH_THRESHOLD", raw)?;
    if value > 100 {
        return Err(ConfigError::InvalidValue {
            key: "CAUSERIE_MATCH_THRESHOLD".to_string(),
            message: format!("{value} is outside 0..=100"),
        });
    }
    Ok(value)
}

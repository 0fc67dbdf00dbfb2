use movie_card_parser::ParseOptions;
use movie_card_parser::record::DEFAULT_MAX_REASON_CHARS;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";
pub const DEFAULT_MAX_TOKENS: u64 = 1024;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON lines for production
    Json,
    /// Human-readable output for development
    Pretty,
}

/// Everything needed to talk to the model provider. Passed explicitly to
/// the client instead of living in a process-wide singleton.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Service settings, read from the environment (optionally seeded by `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub llm: LlmConfig,
    /// SQLite URL for recommendation history; in-memory history when unset
    pub database_url: Option<String>,
    pub max_reason_chars: usize,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENROUTER_API_KEY").ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;

        let llm = LlmConfig {
            api_key,
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), DEFAULT_MAX_TOKENS)?,
            temperature: parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), DEFAULT_TEMPERATURE)?,
        };
        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(ConfigError::Invalid {
                name: "LLM_TEMPERATURE",
                value: llm.temperature.to_string(),
            });
        }

        let max_reason_chars = parse_or(
            "MAX_REASON_CHARS",
            get("MAX_REASON_CHARS"),
            DEFAULT_MAX_REASON_CHARS,
        )?;
        if max_reason_chars == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_REASON_CHARS",
                value: "0".to_string(),
            });
        }

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            llm,
            database_url: get("DATABASE_URL"),
            max_reason_chars,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::with_max_reason_chars(self.max_reason_chars)
    }
}

fn parse_or<T: FromStr>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

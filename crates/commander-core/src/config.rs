use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::TreeSettings;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-16k";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
you are a propagandist and a division commander in a probably fascist militaristic government representing the “Super Earth”
“Super Earth” has 2 enemies: automatons (robots) and terminids (bugs)
every answer you give must be a short encouragement as if you are sending your troops into a battle to capture (liberate) distant lands
our key values are democracy, prosperity and freedom
always stay in character
never give common knowladge answers, only the encouragments";

pub const DEFAULT_PROBABILITY: f64 = 0.5;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram_token: String,
    pub openai_token: String,
    #[serde(default)]
    pub openai_organization: Option<String>,
    pub api_base: String,
    pub system_prompt: String,
    pub model: String,
    /// Ambient messages in group chats are answered when a uniform draw exceeds this.
    pub probability: f64,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub idle_ttl_secs: Option<u64>,
}

/// Treat unset and empty variables alike.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_probability(value: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "PROBABILITY_MODIFIER",
        value: value.to_string(),
    };
    let probability: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(invalid());
    }
    Ok(probability)
}

fn parse_positive<T: std::str::FromStr + PartialOrd + Default>(
    name: &'static str,
    value: &str,
) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        let telegram_token = get("TELEGRAM_TOKEN").ok_or(ConfigError::MissingVar("TELEGRAM_TOKEN"))?;
        let openai_token = get("OPENAI_TOKEN").ok_or(ConfigError::MissingVar("OPENAI_TOKEN"))?;

        let probability = match get("PROBABILITY_MODIFIER") {
            Some(value) => parse_probability(&value)?,
            None => DEFAULT_PROBABILITY,
        };

        let max_tokens = get("MAX_TOKENS")
            .map(|value| parse_positive::<u32>("MAX_TOKENS", &value))
            .transpose()?;

        let idle_ttl_secs = get("CONVERSATION_IDLE_TTL_SECS")
            .map(|value| parse_positive::<u64>("CONVERSATION_IDLE_TTL_SECS", &value))
            .transpose()?;

        Ok(Config {
            telegram_token,
            openai_token,
            openai_organization: get("OPENAI_ORGANIZATION"),
            api_base: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            system_prompt: lookup("SYSTEM_PROMPT")
                .filter(|prompt| !prompt.is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            model: get("CHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            probability,
            max_tokens,
            idle_ttl_secs,
        })
    }

    pub fn tree_settings(&self) -> TreeSettings {
        TreeSettings::new(self.system_prompt.clone(), self.model.clone())
    }

    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }
}

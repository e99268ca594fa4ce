//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Contact target opened by the "request a human follow-up" action.
pub const FOLLOW_UP_URL: &str =
    "mailto:contato@tarologa.com?subject=Consulta%20com%20tar%C3%B3loga%20real";

/// Env files read at startup, in order. Later files win, and both override
/// variables already set in the process.
pub const ENV_FILES: [&str; 2] = ["env.local", ".env"];

/// Key/value pairs from the env files that exist, in load order.
#[allow(deprecated)]
pub fn env_file_entries(paths: &[&str]) -> Result<Vec<(String, String)>, ConfigError> {
    let mut entries = Vec::new();
    for path in paths {
        let Ok(iter) = dotenv::from_filename_iter(path) else {
            continue;
        };
        for item in iter {
            let entry = item.map_err(|e| ConfigError::InvalidValue {
                key: path.to_string(),
                message: e.to_string(),
            })?;
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Client-side wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Consultation endpoint the payload is POSTed to.
    pub endpoint: String,
    /// Upper bound for one submission round trip.
    pub request_timeout: Duration,
    /// Maximum characters of the reflection handed to the display.
    pub max_response_chars: usize,
    /// Human follow-up contact target.
    pub follow_up_url: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/api/consulta".to_string(),
            request_timeout: Duration::from_secs(60),
            max_response_chars: 1800,
            follow_up_url: FOLLOW_UP_URL.to_string(),
        }
    }
}

impl WizardConfig {
    /// Build from `TAROT_ENDPOINT`, `TAROT_TIMEOUT_SECS` and
    /// `TAROT_MAX_RESPONSE_CHARS`, falling back to defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            endpoint: std::env::var("TAROT_ENDPOINT").unwrap_or(defaults.endpoint),
            request_timeout: env_parsed::<u64>("TAROT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_response_chars: env_parsed("TAROT_MAX_RESPONSE_CHARS")?
                .unwrap_or(defaults.max_response_chars),
            follow_up_url: defaults.follow_up_url,
        })
    }
}

/// Consultation endpoint configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub model: String,
    /// Missing keys are reported per request, not at startup.
    pub api_key: Option<SecretString>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            model: "gpt-4.1-mini".to_string(),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Build from `PORT`, `OPENAI_MODEL` and `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: env_parsed("PORT")?.unwrap_or(defaults.port),
            model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.model),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
        })
    }
}

/// Read and parse an optional environment variable.
fn env_parsed<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

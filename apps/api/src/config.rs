use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// TOML secrets store consulted before the environment for the API key.
    pub secrets_path: PathBuf,
    /// Environment variable (and secrets key) holding the API key.
    pub api_key_var: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub llm_timeout_secs: u64,
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Run the frequency ranker when the AI path fails.
    pub frequency_fallback: bool,
    pub extra_stopwords: Vec<String>,
    pub max_upload_bytes: usize,
}

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            secrets_path: std::env::var("SECRETS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("secrets.toml")),
            api_key_var: API_KEY_VAR.to_string(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 60)?,
            default_top_n: parse_env("DEFAULT_TOP_N", 20)?,
            max_top_n: parse_env("MAX_TOP_N", 200)?,
            frequency_fallback: parse_env("FREQUENCY_FALLBACK", true)?,
            extra_stopwords: std::env::var("EXTRA_STOPWORDS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 2 * 1024 * 1024)?,
        };

        anyhow::ensure!(config.default_top_n > 0, "DEFAULT_TOP_N must be at least 1");
        anyhow::ensure!(
            config.default_top_n <= config.max_top_n,
            "DEFAULT_TOP_N ({}) must not exceed MAX_TOP_N ({})",
            config.default_top_n,
            config.max_top_n
        );

        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}

/// Splits a comma-separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

//! Configuration for castlist
//!
//! Command-line arguments (with env fallbacks) select the port and database;
//! the chat backend is resolved with ENV → TOML priority. A missing chat
//! backend disables the buzz endpoints instead of failing startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

/// Command-line arguments for castlist
#[derive(Parser, Debug)]
#[command(name = "castlist")]
#[command(about = "Actor/movie catalog microservice with AI-generated buzz")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5730", env = "CASTLIST_PORT")]
    pub port: u16,

    /// SQLite database file
    #[arg(short, long, default_value = "castlist.db", env = "CASTLIST_DB")]
    pub database: PathBuf,

    /// TOML config file with the [chat] backend settings
    #[arg(short, long, env = "CASTLIST_CONFIG")]
    pub config: Option<PathBuf>,
}

/// TOML config file shape
#[derive(Debug, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub chat: Option<ChatConfig>,
}

/// Chat-completion backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Full URL of the chat-completions route
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

/// Load and parse a TOML config file
pub fn load_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Resolve the chat backend with ENV → TOML priority
///
/// Each field can be overridden independently via `CASTLIST_CHAT_ENDPOINT`,
/// `CASTLIST_CHAT_API_KEY`, and `CASTLIST_CHAT_MODEL`. Returns None (buzz
/// endpoints disabled) when the configuration is absent or incomplete.
pub fn resolve_chat_config(toml_config: &TomlConfig) -> Option<ChatConfig> {
    let base = toml_config.chat.as_ref();

    let endpoint = env_or("CASTLIST_CHAT_ENDPOINT", base.map(|c| c.endpoint.clone()));
    let api_key = env_or("CASTLIST_CHAT_API_KEY", base.map(|c| c.api_key.clone()));
    let model = env_or("CASTLIST_CHAT_MODEL", base.map(|c| c.model.clone()));

    match (endpoint, api_key, model) {
        (Some(endpoint), Some(api_key), Some(model))
            if is_valid_value(&endpoint) && is_valid_value(&api_key) && is_valid_value(&model) =>
        {
            info!(model = %model, "Chat backend configured");
            Some(ChatConfig {
                endpoint,
                api_key,
                model,
            })
        }
        (None, None, None) => {
            info!("No chat backend configured; review/tweet endpoints disabled");
            None
        }
        _ => {
            warn!(
                "Incomplete chat backend configuration (need endpoint, api_key, and model); \
                 review/tweet endpoints disabled"
            );
            None
        }
    }
}

fn env_or(name: &str, fallback: Option<String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| is_valid_value(v))
        .or(fallback)
}

/// Validate a config value (non-empty, non-whitespace)
fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            [chat]
            endpoint = "https://example.invalid/v1/chat/completions"
            api_key = "secret"
            model = "gpt-4o-mini"
            "#,
        )
        .expect("parse");

        let chat = config.chat.expect("chat section");
        assert_eq!(chat.model, "gpt-4o-mini");
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: TomlConfig = toml::from_str("").expect("parse");
        assert!(config.chat.is_none());
    }

    #[test]
    fn test_is_valid_value() {
        assert!(is_valid_value("key"));
        assert!(!is_valid_value(""));
        assert!(!is_valid_value("   "));
    }
}

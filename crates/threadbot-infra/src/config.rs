//! Process configuration loader.
//!
//! Reads a TOML file with the Workers AI account, credentials, store
//! location, and the bot's own user id. The API token may come from the
//! `THREADBOT_CF_TOKEN` environment variable instead of the file, which
//! takes precedence when both are set.

use std::path::Path;

use anyhow::{Context, bail};
use secrecy::SecretString;
use serde::Deserialize;

/// Environment variable overriding the configured API token.
pub const TOKEN_ENV_VAR: &str = "THREADBOT_CF_TOKEN";

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Cloudflare account the inference endpoint belongs to.
    pub cloudflare_account_id: String,
    /// API token; prefer `THREADBOT_CF_TOKEN` over this field.
    #[serde(default)]
    pub cloudflare_token: Option<String>,
    /// SQLite connection string.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// This bot's platform user id, for mention stripping.
    pub bot_user_id: u64,
    /// Address the HTTP adapter listens on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Resolve the Workers AI token from the environment or the file.
    pub fn api_token(&self) -> anyhow::Result<SecretString> {
        resolve_token(
            self.cloudflare_token.as_deref(),
            std::env::var(TOKEN_ENV_VAR).ok(),
        )
    }
}

fn resolve_token(
    file_token: Option<&str>,
    env_token: Option<String>,
) -> anyhow::Result<SecretString> {
    if let Some(token) = env_token.filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token));
    }
    match file_token.filter(|t| !t.is_empty()) {
        Some(token) => Ok(SecretString::from(token.to_string())),
        None => bail!("no API token: set {TOKEN_ENV_VAR} or cloudflare_token in the config file"),
    }
}

fn default_database_url() -> String {
    let data_dir = std::env::var("THREADBOT_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.threadbot")
    });
    format!("sqlite://{data_dir}/threadbot.db?mode=rwc")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8180".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[tokio::test]
    async fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
cloudflare_account_id = "acct-123"
cloudflare_token = "file-token"
database_url = "sqlite:///tmp/bot.db"
bot_user_id = 99
listen_addr = "0.0.0.0:9000"
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert_eq!(config.cloudflare_account_id, "acct-123");
        assert_eq!(config.database_url, "sqlite:///tmp/bot.db");
        assert_eq!(config.bot_user_id, 99);
        assert_eq!(config.listen_addr, "0.0.0.0:9000");
    }

    #[tokio::test]
    async fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
cloudflare_account_id = "acct-123"
bot_user_id = 99
"#,
        )
        .await
        .unwrap();

        let config = AppConfig::load(&path).await.unwrap();
        assert!(config.database_url.starts_with("sqlite://"));
        assert_eq!(config.listen_addr, "127.0.0.1:8180");
    }

    #[tokio::test]
    async fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(AppConfig::load(&path).await.is_err());
    }

    #[test]
    fn test_env_token_takes_precedence() {
        let token = resolve_token(Some("file-token"), Some("env-token".to_string())).unwrap();
        assert_eq!(token.expose_secret(), "env-token");
    }

    #[test]
    fn test_file_token_used_when_env_absent() {
        let token = resolve_token(Some("file-token"), None).unwrap();
        assert_eq!(token.expose_secret(), "file-token");
    }

    #[test]
    fn test_missing_token_errors() {
        assert!(resolve_token(None, None).is_err());
        assert!(resolve_token(Some(""), Some(String::new())).is_err());
    }
}

//! Layered application configuration: an optional `quill.toml` next to the
//! binary, overridden by `QUILL__`-prefixed environment variables
//! (e.g. `QUILL__SERVER__BIND=0.0.0.0:8000`).

use std::path::PathBuf;

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    #[serde(default = "default_media_prefix")]
    pub url_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Signing key for API bearer tokens.
    #[serde(default = "default_secret")]
    pub secret: SecretString,
    #[serde(default = "default_token_ttl_days")]
    pub access_ttl_days: i64,
    #[serde(default = "default_token_ttl_days")]
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL of the cached global feed page.
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_from")]
    pub from: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_database_url() -> String {
    // rwc: create the file on first start.
    "sqlite:quill.db?mode=rwc".to_string()
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_prefix() -> String {
    "/media".to_string()
}

fn default_secret() -> SecretString {
    SecretString::new("insecure-dev-secret-change-me".to_string())
}

fn default_token_ttl_days() -> i64 {
    15
}

fn default_index_ttl_secs() -> u64 {
    20
}

fn default_email_from() -> String {
    "no-reply@quill.local".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: default_database_url() }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { root: default_media_root(), url_prefix: default_media_prefix() }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            access_ttl_days: default_token_ttl_days(),
            refresh_ttl_days: default_token_ttl_days(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { index_ttl_secs: default_index_ttl_secs() }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self { from: default_email_from() }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name("quill").required(false))
            .add_source(Environment::with_prefix("QUILL").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

//! Shared configuration for the extmarket CLI.
//!
//! TOML config, credential resolution (env + keyring + plaintext),
//! translation to `extmarket_core::FeedConfig` and the API transport, and
//! the file-backed preference store. Core never reads files; it receives
//! pre-built values from here.

mod preferences;

pub use preferences::{FilePersistence, preferences_path};

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use extmarket_api::{TlsMode, TransportConfig};
use extmarket_core::FeedConfig;
use extmarket_core::config::{
    DEFAULT_FEEDBACK_URL, DEFAULT_PAGE_SIZE, DEFAULT_SCROLL_THRESHOLD_PX,
};

const APP_NAME: &str = "extmarket";
const KEYRING_USER: &str = "api-key";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no catalog endpoint configured")]
    NoEndpoint,

    #[error("no API key configured for the catalog endpoint")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Catalog REST endpoint.
    #[serde(default)]
    pub endpoint: Endpoint,

    /// Feed tuning.
    #[serde(default)]
    pub feed: Feed,

    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoint {
    /// Project URL of the catalog (e.g. "https://abc.supabase.co").
    pub url: Option<String>,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            api_key_env: None,
            timeout: default_timeout(),
            ca_cert: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Feed {
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_px: u32,

    #[serde(default = "default_feedback_url")]
    pub feedback_url: String,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_debounce_ms(),
            scroll_threshold_px: default_scroll_threshold(),
            feedback_url: default_feedback_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}
fn default_debounce_ms() -> u64 {
    300
}
fn default_scroll_threshold() -> u32 {
    DEFAULT_SCROLL_THRESHOLD_PX
}
fn default_feedback_url() -> String {
    DEFAULT_FEEDBACK_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", APP_NAME, APP_NAME)
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

pub(crate) fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push(APP_NAME);
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering `EXTMARKET_*` env vars on top.
///
/// Nested keys use a double underscore: `EXTMARKET_FEED__PAGE_SIZE=20`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("EXTMARKET_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation into runtime types ──────────────────────────────────

impl Config {
    /// Feed tuning for `extmarket_core`.
    pub fn to_feed_config(&self) -> Result<FeedConfig, ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::Validation {
                field: "feed.page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(FeedConfig {
            page_size: self.feed.page_size,
            search_debounce: Duration::from_millis(self.feed.search_debounce_ms),
            scroll_threshold_px: self.feed.scroll_threshold_px,
            feedback_url: self.feed.feedback_url.clone(),
        })
    }

    /// HTTP transport for the catalog client. `timeout_override` wins over
    /// the configured timeout.
    pub fn to_transport(&self, timeout_override: Option<u64>) -> TransportConfig {
        let tls = self
            .endpoint
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa);
        TransportConfig {
            tls,
            timeout: Duration::from_secs(timeout_override.unwrap_or(self.endpoint.timeout)),
        }
    }

    /// The configured endpoint URL, validated.
    pub fn endpoint_url(&self, url_override: Option<&str>) -> Result<String, ConfigError> {
        let raw = url_override
            .or(self.endpoint.url.as_deref())
            .ok_or(ConfigError::NoEndpoint)?;
        url::Url::parse(raw).map_err(|e| ConfigError::Validation {
            field: "endpoint.url".into(),
            reason: format!("invalid URL {raw:?}: {e}"),
        })?;
        Ok(raw.to_owned())
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: env var named by `api_key_env`, then the system
/// keyring, then plaintext config.
pub fn resolve_api_key(endpoint: &Endpoint) -> Result<SecretString, ConfigError> {
    // 1. Env var named in config
    if let Some(ref env_name) = endpoint.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(APP_NAME, KEYRING_USER) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref key) = endpoint.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.feed, Feed::default());
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.endpoint.timeout, 30);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[endpoint]\nurl = \"https://cat.example.co\"\ntimeout = 5\n\n[feed]\npage_size = 20\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.endpoint.url.as_deref(), Some("https://cat.example.co"));
        assert_eq!(cfg.feed.page_size, 20);
        assert_eq!(cfg.feed.search_debounce_ms, 300);

        let feed = cfg.to_feed_config().unwrap();
        assert_eq!(feed.page_size, 20);
        assert_eq!(feed.search_debounce, Duration::from_millis(300));
        assert_eq!(cfg.to_transport(None).timeout, Duration::from_secs(5));
        assert_eq!(cfg.to_transport(Some(9)).timeout, Duration::from_secs(9));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.endpoint.url = Some("https://cat.example.co".into());
        cfg.defaults.output = "json".into();

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut cfg = Config::default();
        cfg.feed.page_size = 0;
        assert!(matches!(
            cfg.to_feed_config(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn endpoint_url_precedence_and_validation() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.endpoint_url(None), Err(ConfigError::NoEndpoint)));

        cfg.endpoint.url = Some("https://a.example.co".into());
        assert_eq!(cfg.endpoint_url(None).unwrap(), "https://a.example.co");
        assert_eq!(
            cfg.endpoint_url(Some("https://b.example.co")).unwrap(),
            "https://b.example.co"
        );
        assert!(cfg.endpoint_url(Some("not a url")).is_err());
    }

    #[test]
    fn custom_ca_selects_tls_mode() {
        let mut cfg = Config::default();
        cfg.endpoint.ca_cert = Some(PathBuf::from("/etc/ssl/custom.pem"));
        assert_eq!(
            cfg.to_transport(None).tls,
            TlsMode::CustomCa(PathBuf::from("/etc/ssl/custom.pem"))
        );
    }
}

//! Finder Configuration - server, upstream API and search defaults as TOML
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so the tool behaves identically with or without a config file.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "FINDER_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "finder_config.toml";

/// Environment override for `server.addr`.
pub const SERVER_ADDR_ENV_VAR: &str = "FINDER_SERVER_ADDR";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `FinderConfig::load()` which searches:
/// 1. `$FINDER_CONFIG` env var
/// 2. `./finder_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinderConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream OpenFEMA client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Defaults for a search when the request leaves a field out
    #[serde(default)]
    pub search: SearchConfig,
}

impl FinderConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FINDER_CONFIG` environment variable
    /// 2. `./finder_config.toml` in the current working directory
    /// 3. Built-in defaults
    ///
    /// `$FINDER_SERVER_ADDR` overrides `server.addr` whichever source wins.
    pub fn load() -> Self {
        let mut config = Self::load_file_or_default();
        if let Ok(addr) = std::env::var(SERVER_ADDR_ENV_VAR) {
            info!(addr = %addr, "Server address overridden by {}", SERVER_ADDR_ENV_VAR);
            config.server.addr = addr;
        }
        config
    }

    fn load_file_or_default() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./finder_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check every value and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr = '{}' is not a HOST:PORT socket address",
                self.server.addr
            ));
        }

        let a = &self.api;
        match reqwest::Url::parse(&a.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "api.base_url scheme '{}' must be http or https",
                url.scheme()
            )),
            Err(e) => errors.push(format!("api.base_url = '{}' is invalid: {}", a.base_url, e)),
        }
        if a.page_size == 0 || a.page_size > defaults::MAX_PAGE_SIZE {
            errors.push(format!(
                "api.page_size = {} must be within 1-{}",
                a.page_size,
                defaults::MAX_PAGE_SIZE
            ));
        }
        if a.timeout_secs == 0 {
            errors.push("api.timeout_secs must be > 0".to_string());
        }
        if a.max_retries > defaults::MAX_RETRIES_LIMIT {
            errors.push(format!(
                "api.max_retries = {} exceeds the limit of {}",
                a.max_retries,
                defaults::MAX_RETRIES_LIMIT
            ));
        }
        if a.retry_base_delay_ms > a.retry_max_delay_ms {
            errors.push(format!(
                "api.retry_base_delay_ms ({}) must be <= api.retry_max_delay_ms ({})",
                a.retry_base_delay_ms, a.retry_max_delay_ms
            ));
        }
        if a.max_records == Some(0) {
            errors.push("api.max_records must be > 0 when set".to_string());
        }

        let s = &self.search;
        for code in &s.categories {
            if !crate::types::is_category_code(code) {
                errors.push(format!(
                    "search.categories: '{code}' is not a single-letter damage category"
                ));
            }
        }
        for state in &s.states {
            if !crate::types::is_state_code(state) {
                errors.push(format!(
                    "search.states: '{state}' is not a two-letter state code"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

// ============================================================================
// Upstream API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Dataset endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Rows per page (`$top`)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt of a page
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Stop paging once this many rows were read
    #[serde(default = "default_max_records")]
    pub max_records: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            max_records: default_max_records(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    defaults::OPENFEMA_PA_GRANTS_URL.to_string()
}
fn default_page_size() -> usize {
    defaults::PAGE_SIZE
}
fn default_max_records() -> Option<usize> {
    Some(defaults::MAX_RECORDS)
}
fn default_timeout_secs() -> u64 {
    defaults::HTTP_TIMEOUT_SECS
}
fn default_max_retries() -> u32 {
    defaults::MAX_RETRIES
}
fn default_retry_base_delay_ms() -> u64 {
    defaults::RETRY_BASE_DELAY_MS
}
fn default_retry_max_delay_ms() -> u64 {
    defaults::RETRY_MAX_DELAY_MS
}

// ============================================================================
// Search Defaults
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keywords that mark a record as water-utility related
    #[serde(default = "default_include_keywords")]
    pub include_keywords: Vec<String>,

    /// Applicant-name keywords that always reject a record
    #[serde(default)]
    pub exclude_keywords: Vec<String>,

    /// Damage categories requested from the API
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Match incidentType by substring ('Fire' / 'Wildfire') instead of equality
    #[serde(default = "default_true")]
    pub incident_contains: bool,

    /// State codes to restrict to (all states when empty)
    #[serde(default)]
    pub states: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            include_keywords: default_include_keywords(),
            exclude_keywords: Vec::new(),
            categories: default_categories(),
            incident_contains: true,
            states: Vec::new(),
        }
    }
}

fn default_include_keywords() -> Vec<String> {
    defaults::DEFAULT_INCLUDE_KEYWORDS
        .iter()
        .map(|k| (*k).to_string())
        .collect()
}
fn default_categories() -> Vec<String> {
    vec![defaults::UTILITIES_CATEGORY.to_string()]
}
fn default_true() -> bool {
    true
}

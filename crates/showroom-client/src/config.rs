//! # Client Configuration
//!
//! Where the backend lives and how the data layer behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOWROOM_API_BASE_URL=https://dealer.example.com/api/v1            │
//! │     SHOWROOM_SESSION_PATH=/tmp/session.json                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/showroom-console/showroom.toml (Linux)                   │
//! │     ~/Library/Application Support/com.showroom.console/ (macOS)        │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api/v1/, no retries, no max age              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "http://localhost:8000/api/v1/"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [cache]
//! max_age_secs = 0        # 0 = serve Ready entries until invalidated
//! read_retries = 0        # 0 = network errors surface immediately
//! initial_backoff_ms = 250
//! max_backoff_secs = 5
//!
//! [session]
//! persist = true
//! # path = "/custom/session.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Default backend location, matching a local development server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1/";

// =============================================================================
// API Settings
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Versioned API root. A trailing slash is added if missing.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_connect_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Cache Settings
// =============================================================================

/// Remote data cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Ready entries older than this are served and refreshed in the
    /// background. 0 disables age-based revalidation.
    #[serde(default)]
    pub max_age_secs: u64,

    /// Extra attempts for reads that fail with a network error.
    /// 0 keeps the no-retry behavior.
    #[serde(default)]
    pub read_retries: u32,

    /// Initial backoff between read retries (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff between read retries (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_initial_backoff() -> u64 {
    250
}
fn default_max_backoff() -> u64 {
    5
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            max_age_secs: 0,
            read_retries: 0,
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

impl CacheSettings {
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_secs > 0).then(|| Duration::from_secs(self.max_age_secs))
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Where the session (tokens + profile) is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Persist the session across restarts.
    #[serde(default = "default_true")]
    pub persist: bool,

    /// Explicit session file; defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            persist: true,
            path: None,
        }
    }
}

impl SessionSettings {
    /// Resolved session file path, if persistence is on and a path exists.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }
        self.path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "showroom", "console")
                .map(|dirs| dirs.data_dir().join("session.json"))
        })
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (showroom.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ApiResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ApiResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ApiError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ApiError::Config(format!(
                "base_url must use http or https, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(ApiError::Config("timeouts must be greater than 0".into()));
        }

        Ok(())
    }

    /// Ensures the base URL ends with `/` so relative paths join under it.
    fn normalize(&mut self) {
        if !self.api.base_url.ends_with('/') {
            self.api.base_url.push('/');
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SHOWROOM_API_BASE_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.api.base_url = url;
        }

        if let Ok(timeout) = std::env::var("SHOWROOM_API_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring invalid SHOWROOM_API_TIMEOUT_SECS"),
            }
        }

        if let Ok(path) = std::env::var("SHOWROOM_SESSION_PATH") {
            debug!(path = %path, "Overriding session path from environment");
            self.session.path = Some(PathBuf::from(path));
        }

        if let Ok(age) = std::env::var("SHOWROOM_CACHE_MAX_AGE_SECS") {
            if let Ok(a) = age.parse::<u64>() {
                self.cache.max_age_secs = a;
            }
        }

        if let Ok(retries) = std::env::var("SHOWROOM_READ_RETRIES") {
            if let Ok(r) = retries.parse::<u32>() {
                self.cache.read_retries = r;
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "showroom", "console")
            .map(|dirs| dirs.config_dir().join("showroom.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Parsed base URL (always ends with `/`).
    pub fn base_url(&self) -> ApiResult<Url> {
        let mut raw = self.api.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Ok(Url::parse(&raw)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs)
    }

    /// Config pointing at an explicit backend, everything else default.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = ClientConfig::default();
        config.api.base_url = base_url.into();
        config.session.persist = false;
        config.normalize();
        config
    }
}

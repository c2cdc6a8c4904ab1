//! # Application Context
//!
//! Builds and tears down the shared stores. Nothing in this crate is a global:
//! whoever owns the [`AppContext`] hands its parts to the views.
//!
//! ## Startup / Shutdown
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Context Lifecycle                                 │
//! │                                                                         │
//! │  init(config)                                                           │
//! │    1. SessionStore   ◄── FileStorage(session path) | MemoryStorage      │
//! │                          rehydrated immediately                         │
//! │    2. PreferenceStore    (in memory, selected branch = None)            │
//! │    3. HttpTransport  ◄── base URL, timeouts, session                    │
//! │    4. QueryCache     ◄── max_age, read retries                          │
//! │    5. ShowroomApi    ◄── transport + cache                              │
//! │                                                                         │
//! │  shutdown()                                                             │
//! │    • flush session to storage                                           │
//! │    • drop cached entries (late fetches settle into nothing)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::ShowroomApi;
use crate::cache::{CachePolicy, QueryCache};
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::preferences::PreferenceStore;
use crate::session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};
use crate::transport::HttpTransport;

/// Everything a view needs, wired together.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub preferences: PreferenceStore,
    pub cache: QueryCache,
    pub api: ShowroomApi,
}

impl AppContext {
    /// Wires the stores from `config`, with the session storage the config
    /// asks for.
    pub fn init(config: ClientConfig) -> ApiResult<Self> {
        let storage: Arc<dyn SessionStorage> = match config.session.resolved_path() {
            Some(path) => {
                info!(?path, "Using persistent session storage");
                Arc::new(FileStorage::new(path))
            }
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Wires the stores around an explicit session storage.
    pub fn with_storage(config: ClientConfig, storage: Arc<dyn SessionStorage>) -> ApiResult<Self> {
        config.validate()?;

        let session = Arc::new(SessionStore::new(storage));
        let preferences = PreferenceStore::new();
        let transport = HttpTransport::new(&config, Arc::clone(&session))?;
        let cache = QueryCache::new(CachePolicy::from(&config.cache));
        let api = ShowroomApi::new(transport, cache.clone());

        info!(base_url = %config.api.base_url, "Application context initialized");

        Ok(AppContext {
            config: Arc::new(config),
            session,
            preferences,
            cache,
            api,
        })
    }

    /// Flushes the session and drops cached reads.
    pub async fn shutdown(&self) {
        if let Err(e) = self.session.flush().await {
            warn!(error = %e, "Failed to flush session on shutdown");
        }
        self.cache.reset().await;
        info!("Application context shut down");
    }
}

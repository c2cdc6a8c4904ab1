//! # showroom-client: Data Sync Layer for the Showroom Console
//!
//! Everything between the console's views and the dealership REST backend:
//! a tag-invalidated read cache, the session and preference stores, and the
//! HTTP transport that ties the bearer token to every call.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Client Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 AppContext (init / shutdown)                     │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │  ShowroomApi   │  │  QueryCache    │  │  HttpTransport         │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Typed reads    │─►│ Tag index      │─►│ reqwest, bearer,       │    │
//! │  │ Gated writes   │  │ Coalescing     │  │ X-Request-Id,          │    │
//! │  │ Dashboard memo │  │ SWR, retry     │  │ 401 → session.expire   │    │
//! │  └────────────────┘  └────────────────┘  └───────────┬────────────┘    │
//! │                                                      │                  │
//! │  ┌────────────────┐  ┌────────────────┐  ┌───────────▼────────────┐    │
//! │  │ PreferenceStore│  │  ClientConfig  │  │  SessionStore          │    │
//! │  │ selected branch│  │  TOML + env    │  │  tokens + profile,     │    │
//! │  │ (watch)        │  │                │  │  persisted             │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - Typed endpoints, role gate, dashboard memo
//! - [`cache`] - `QueryCache`, tags, entry state machine
//! - [`config`] - Client configuration (TOML + environment)
//! - [`context`] - `AppContext` lifecycle
//! - [`error`] - `ApiError` taxonomy
//! - [`preferences`] - Selected branch
//! - [`session`] - Session store and its storage backends
//! - [`transport`] - HTTP transport
//!
//! ## Usage
//!
//! ```rust,ignore
//! use showroom_client::{AppContext, ClientConfig};
//!
//! let ctx = AppContext::init(ClientConfig::load_or_default(None))?;
//! ctx.api.login("admin", "secret").await?;
//!
//! let metrics = ctx.api.dashboard(chrono::Local::now().fixed_offset()).await?;
//! println!("Available units: {}", metrics.available_stock);
//!
//! ctx.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod preferences;
pub mod session;
pub mod transport;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{DashboardInputs, Freshness, ShowroomApi};
pub use cache::{CacheKey, CachePolicy, CacheStats, EntryStatus, QueryCache, Tag};
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{ApiError, ApiResult, FieldError};
pub use preferences::{PreferenceStore, Preferences};
pub use session::{AuthState, AuthStatus, FileStorage, MemoryStorage, SessionStorage, SessionStore};
pub use transport::{ApiRequest, HttpTransport};

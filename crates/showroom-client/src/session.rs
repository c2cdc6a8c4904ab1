//! # Session Store
//!
//! Holds the signed-in operator's tokens and profile.
//!
//! ## State Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Session Lifecycle                                │
//! │                                                                         │
//! │   rehydrate ──► Idle (no token) ─┐                                      │
//! │             └─► Authenticated ◄──┼── set_credentials(tokens)            │
//! │                   │              │                                      │
//! │                   │ set_user(None)                                      │
//! │                   ▼              │                                      │
//! │                 Idle ◄───────────┴── clear_auth / expire(token) on 401  │
//! │                                                                         │
//! │   Every mutation is written through to SessionStorage, on the           │
//! │   blocking pool and after the state lock is released.                   │
//! │   Nothing here talks to the network.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrent 401s
//! Several requests may fail with 401 at once. Each reports the token it was
//! sent with; [`SessionStore::expire`] only clears when that token is still
//! the current one, so the session is cleared exactly once and a login that
//! completed in between is not thrown away.

use serde::{Deserialize, Serialize};
use showroom_core::{TokenPair, UserProfile};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, RwLock, RwLockWriteGuard};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

// =============================================================================
// State
// =============================================================================

/// Where the authentication flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    Idle,
    Loading,
    Authenticated,
    Error,
}

/// Snapshot of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
    pub status: AuthStatus,
}

impl AuthState {
    fn empty() -> Self {
        AuthState {
            access_token: None,
            refresh_token: None,
            user: None,
            status: AuthStatus::Idle,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// What survives a restart. The status is derived again on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl From<&AuthState> for PersistedSession {
    fn from(state: &AuthState) -> Self {
        PersistedSession {
            access_token: state.access_token.clone(),
            refresh_token: state.refresh_token.clone(),
            user: state.user.clone(),
        }
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Durable home for the session.
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    fn load(&self) -> ApiResult<Option<PersistedSession>>;
    fn save(&self, session: &PersistedSession) -> ApiResult<()>;
    fn clear(&self) -> ApiResult<()>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> ApiResult<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&contents)
            .map_err(|e| ApiError::Storage(format!("corrupt session file: {}", e)))?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, for tests and non-persistent sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        MemoryStorage {
            slot: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> ApiResult<std::sync::MutexGuard<'_, Option<PersistedSession>>> {
        self.slot
            .lock()
            .map_err(|_| ApiError::Storage("session storage lock poisoned".into()))
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> ApiResult<Option<PersistedSession>> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, session: &PersistedSession) -> ApiResult<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// The one session shared by the transport, the API facade and the console.
#[derive(Debug)]
pub struct SessionStore {
    state: RwLock<AuthState>,
    storage: Arc<dyn SessionStorage>,
    // Held across a storage write so writes land in mutation order.
    writes: AsyncMutex<()>,
    clears: AtomicU64,
}

impl SessionStore {
    /// Creates a store backed by `storage`, rehydrating whatever it holds.
    ///
    /// A token on disk means `Authenticated`; an unreadable file is treated
    /// as no session.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let state = match storage.load() {
            Ok(Some(saved)) => {
                let status = if saved.access_token.is_some() {
                    AuthStatus::Authenticated
                } else {
                    AuthStatus::Idle
                };
                debug!(status = ?status, "Session rehydrated");
                AuthState {
                    access_token: saved.access_token,
                    refresh_token: saved.refresh_token,
                    user: saved.user,
                    status,
                }
            }
            Ok(None) => AuthState::empty(),
            Err(e) => {
                warn!(error = %e, "Failed to rehydrate session, starting signed out");
                AuthState::empty()
            }
        };

        SessionStore {
            state: RwLock::new(state),
            storage,
            writes: AsyncMutex::new(()),
            clears: AtomicU64::new(0),
        }
    }

    /// A store that forgets everything on exit.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub async fn snapshot(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.user.clone()
    }

    pub async fn status(&self) -> AuthStatus {
        self.state.read().await.status
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// How many times a non-empty session has been cleared.
    pub fn clear_count(&self) -> u64 {
        self.clears.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Stores a fresh token pair and marks the session authenticated.
    pub async fn set_credentials(&self, tokens: &TokenPair) {
        let mut state = self.state.write().await;
        state.access_token = Some(tokens.access_token.clone());
        state.refresh_token = Some(tokens.refresh_token.clone());
        state.status = AuthStatus::Authenticated;
        self.persist(state).await;
        info!("Session credentials stored");
    }

    /// Sets or clears the profile; the status follows its presence.
    pub async fn set_user(&self, user: Option<UserProfile>) {
        let mut state = self.state.write().await;
        state.status = if user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Idle
        };
        state.user = user;
        self.persist(state).await;
    }

    /// Sets the status only. Not persisted.
    pub async fn set_status(&self, status: AuthStatus) {
        self.state.write().await.status = status;
    }

    /// Wipes tokens, profile and the persisted copy.
    pub async fn clear_auth(&self) {
        let mut state = self.state.write().await;
        self.reset_state(&mut state);
        self.persist(state).await;
    }

    /// Clears the session after a 401, but only if `token_used` is still the
    /// current token. Returns whether anything was cleared.
    ///
    /// A request sent without a token clears only a session that has no
    /// token either (a stale profile, for instance).
    pub async fn expire(&self, token_used: Option<&str>) -> bool {
        let mut state = self.state.write().await;
        if state.is_empty() || state.access_token.as_deref() != token_used {
            debug!("Ignoring 401 for a session that has already changed");
            return false;
        }
        warn!("Session rejected by server, signing out");
        self.reset_state(&mut state);
        self.persist(state).await;
        true
    }

    /// Writes the current state to storage.
    pub async fn flush(&self) -> ApiResult<()> {
        let state = self.state.read().await;
        let snapshot = (!state.is_empty()).then(|| PersistedSession::from(&*state));
        let _slot = self.writes.lock().await;
        drop(state);
        self.write_through(snapshot).await
    }

    fn reset_state(&self, state: &mut AuthState) {
        let had_session = !state.is_empty();
        *state = AuthState::empty();
        if had_session {
            self.clears.fetch_add(1, Ordering::SeqCst);
            info!("Session cleared");
        }
    }

    /// Releases the state lock, then writes the snapshot it guarded.
    async fn persist(&self, state: RwLockWriteGuard<'_, AuthState>) {
        let snapshot = (!state.is_empty()).then(|| PersistedSession::from(&*state));
        let _slot = self.writes.lock().await;
        drop(state);
        if let Err(e) = self.write_through(snapshot).await {
            warn!(error = %e, "Failed to persist session");
        }
    }

    async fn write_through(&self, snapshot: Option<PersistedSession>) -> ApiResult<()> {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || match snapshot {
            Some(session) => storage.save(&session),
            None => storage.clear(),
        })
        .await
        .map_err(|e| ApiError::Storage(format!("session write task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showroom_core::UserRole;

    fn tokens(access: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: format!("{}-refresh", access),
            token_type: "bearer".to_string(),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            email: "admin@example.com".to_string(),
            username: "admin".to_string(),
            user_role: UserRole::Admin,
            is_active: true,
            full_name: Some("Site Admin".to_string()),
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn test_set_credentials_and_user() {
        let store = SessionStore::in_memory();
        assert_eq!(store.status().await, AuthStatus::Idle);

        store.set_credentials(&tokens("a1")).await;
        assert_eq!(store.status().await, AuthStatus::Authenticated);
        assert_eq!(store.access_token().await.as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("a1-refresh"));

        store.set_user(Some(profile())).await;
        assert_eq!(store.user().await.map(|u| u.id), Some(1));

        store.set_user(None).await;
        assert_eq!(store.status().await, AuthStatus::Idle);
    }

    #[tokio::test]
    async fn test_clear_auth_wipes_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.set_credentials(&tokens("a1")).await;
        assert!(storage.load().unwrap().is_some());

        store.clear_auth().await;
        assert_eq!(store.snapshot().await, AuthState::empty());
        assert!(storage.load().unwrap().is_none());
        assert_eq!(store.clear_count(), 1);

        // Clearing an empty session is not counted.
        store.clear_auth().await;
        assert_eq!(store.clear_count(), 1);
    }

    #[tokio::test]
    async fn test_expire_only_matching_token() {
        let store = SessionStore::in_memory();
        store.set_credentials(&tokens("old")).await;

        assert!(store.expire(Some("old")).await);
        assert!(!store.expire(Some("old")).await);
        assert_eq!(store.clear_count(), 1);

        store.set_credentials(&tokens("new")).await;
        assert!(!store.expire(Some("old")).await);
        assert_eq!(store.access_token().await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_rehydrate_from_storage() {
        let storage = Arc::new(MemoryStorage::with_session(PersistedSession {
            access_token: Some("t".to_string()),
            refresh_token: Some("r".to_string()),
            user: Some(profile()),
        }));
        let store = SessionStore::new(storage);
        let state = store.snapshot().await;
        assert_eq!(state.status, AuthStatus::Authenticated);
        assert_eq!(state.user.map(|u| u.username), Some("admin".to_string()));

        let store = SessionStore::new(Arc::new(MemoryStorage::with_session(PersistedSession {
            user: Some(profile()),
            ..Default::default()
        })));
        assert_eq!(store.status().await, AuthStatus::Idle);
    }

    #[tokio::test]
    async fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::new(Arc::new(FileStorage::new(&path)));
        store.set_credentials(&tokens("disk")).await;
        store.set_user(Some(profile())).await;
        assert!(path.exists());

        let reloaded = SessionStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(reloaded.access_token().await.as_deref(), Some("disk"));
        assert_eq!(reloaded.status().await, AuthStatus::Authenticated);

        reloaded.clear_auth().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(store.status().await, AuthStatus::Idle);
        assert!(store.access_token().await.is_none());
    }

    /// Blocks inside `save` until the test lets it go.
    #[derive(Debug)]
    struct GatedStorage {
        entered: Mutex<std::sync::mpsc::Sender<()>>,
        release: Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl SessionStorage for GatedStorage {
        fn load(&self) -> ApiResult<Option<PersistedSession>> {
            Ok(None)
        }

        fn save(&self, _session: &PersistedSession) -> ApiResult<()> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            Ok(())
        }

        fn clear(&self) -> ApiResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_state_readable_while_storage_write_blocks() {
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let store = Arc::new(SessionStore::new(Arc::new(GatedStorage {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })));

        let writer = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.set_credentials(&tokens("slow")).await }
        });
        tokio::task::spawn_blocking(move || entered_rx.recv())
            .await
            .unwrap()
            .unwrap();

        // The write is still in progress.
        assert_eq!(store.access_token().await.as_deref(), Some("slow"));
        assert_eq!(store.status().await, AuthStatus::Authenticated);

        release_tx.send(()).unwrap();
        writer.await.unwrap();
    }
}

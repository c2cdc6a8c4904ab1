//! # Remote Data Cache
//!
//! Tag-indexed cache of server reads with request coalescing and
//! stale-while-revalidate.
//!
//! ## Entry State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cache Entry Lifecycle                             │
//! │                                                                         │
//! │   Uninitialized ──query──► Loading ──ok──► Ready ──invalidate──► Stale  │
//! │                              │  ▲                                  │    │
//! │                              │  └──────────── next query ──────────┘    │
//! │                             err                                         │
//! │                              ▼                                          │
//! │                            Error ──next query──► Loading                │
//! │                                                                         │
//! │   Invalidated while Loading: the result lands, then the entry is Stale. │
//! │   Ready past max_age: served, then refreshed in the background.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Coalescing
//! The first reader of a missing key spawns the fetch as its own task and
//! stores a [`Shared`] handle to it. Later readers await the same handle, so
//! one network call serves them all. The task settles the entry whether or
//! not anyone is still waiting.
//!
//! ## Tag Index
//! `tag -> {keys}` is kept next to the entries. Invalidating a tag walks its
//! key set; entries under other tags are untouched.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use crate::config::CacheSettings;
use crate::error::{ApiError, ApiResult};

/// Type-erased cached value.
pub type BoxedValue = Arc<dyn Any + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, ApiResult<BoxedValue>>>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, ApiResult<BoxedValue>> + Send + Sync>;

// =============================================================================
// Keys & Tags
// =============================================================================

/// Identity of a read: endpoint plus canonical query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub endpoint: String,
    pub params: String,
}

impl CacheKey {
    pub fn new(endpoint: impl Into<String>, params: impl Into<String>) -> Self {
        CacheKey {
            endpoint: endpoint.into(),
            params: params.into(),
        }
    }

    /// Key for an endpoint without parameters.
    pub fn bare(endpoint: impl Into<String>) -> Self {
        Self::new(endpoint, String::new())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            f.write_str(&self.endpoint)
        } else {
            write!(f, "{}?{}", self.endpoint, self.params)
        }
    }
}

/// Groups of reads that a write can invalidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Profile,
    Customers,
    VehicleStock,
    SalesRecords,
    Branches,
    Transfers,
    Payments,
    Anomalies,
    ImportJobs,
    Dashboard,
}

/// Where an entry is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Uninitialized,
    Loading,
    Ready,
    Stale,
    Error,
}

/// Counters for observing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from a stored value.
    pub hits: u64,
    /// Reads that started a fetch.
    pub misses: u64,
    /// Reads that joined a fetch already in flight.
    pub coalesced: u64,
    /// Entries marked stale by tag invalidation.
    pub invalidations: u64,
}

// =============================================================================
// Policy
// =============================================================================

/// Revalidation and retry behavior.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub max_age: Option<Duration>,
    pub read_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CachePolicy {
    fn from(settings: &CacheSettings) -> Self {
        CachePolicy {
            max_age: settings.max_age(),
            read_retries: settings.read_retries,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_secs(settings.max_backoff_secs),
        }
    }
}

impl CachePolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Entries
// =============================================================================

struct CacheEntry {
    value: Option<BoxedValue>,
    error: Option<ApiError>,
    status: EntryStatus,
    fetched_at: Option<Instant>,
    in_flight: Option<SharedFetch>,
    /// Identifies the fetch allowed to settle this entry.
    generation: u64,
    /// The in-flight fetch started before an invalidation.
    invalidated_during_flight: bool,
}

impl CacheEntry {
    fn new() -> Self {
        CacheEntry {
            value: None,
            error: None,
            status: EntryStatus::Uninitialized,
            fetched_at: None,
            in_flight: None,
            generation: 0,
            invalidated_during_flight: false,
        }
    }

    fn is_expired(&self, max_age: Option<Duration>) -> bool {
        match (max_age, self.fetched_at) {
            (Some(max_age), Some(at)) => at.elapsed() >= max_age,
            _ => false,
        }
    }

    /// An in-flight fetch new readers may join.
    fn joinable_flight(&self) -> Option<SharedFetch> {
        if self.invalidated_during_flight {
            None
        } else {
            self.in_flight.clone()
        }
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    tag_index: HashMap<Tag, HashSet<CacheKey>>,
    next_generation: u64,
    stats: CacheStats,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    /// Serve only Ready values.
    Fresh,
    /// Serve any stored value, refreshing in the background.
    StaleOk,
}

enum Lookup {
    Hit(BoxedValue),
    Wait(SharedFetch),
}

// =============================================================================
// Query Cache
// =============================================================================

/// The shared read cache. Clones share state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Mutex<CacheInner>>,
    policy: CachePolicy,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        QueryCache {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            policy,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Reads `key`, fetching at most once across concurrent callers.
    ///
    /// Ready values are returned without a network call. Stale, failed and
    /// missing entries are fetched; callers arriving while that fetch runs
    /// share its result.
    pub async fn query<T, F, Fut>(&self, key: CacheKey, tags: &[Tag], fetch: F) -> ApiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        self.read(key, tags, erase(fetch), ReadMode::Fresh).await
    }

    /// Stale-while-revalidate read.
    ///
    /// Any stored value is returned immediately, even if stale or from before
    /// a failed refresh, and a background refresh is started when needed.
    /// Only a key that has never loaded waits for the network.
    pub async fn query_swr<T, F, Fut>(&self, key: CacheKey, tags: &[Tag], fetch: F) -> ApiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        self.read(key, tags, erase(fetch), ReadMode::StaleOk).await
    }

    /// Stored value for `key`, whatever its status, without fetching.
    pub async fn cached<T: Send + Sync + 'static>(&self, key: &CacheKey) -> Option<Arc<T>> {
        let inner = self.inner.lock().await;
        let value = inner.entries.get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    /// Last error recorded for `key`.
    pub async fn last_error(&self, key: &CacheKey) -> Option<ApiError> {
        let inner = self.inner.lock().await;
        inner.entries.get(key).and_then(|e| e.error.clone())
    }

    pub async fn entry_status(&self, key: &CacheKey) -> EntryStatus {
        let inner = self.inner.lock().await;
        inner
            .entries
            .get(key)
            .map_or(EntryStatus::Uninitialized, |e| e.status)
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }

    // =========================================================================
    // Writes & Invalidation
    // =========================================================================

    /// Runs a write and, if it succeeds, invalidates `tags`.
    ///
    /// A failed write leaves every entry as it was.
    pub async fn mutate<T, Fut>(&self, tags: &[Tag], request: Fut) -> ApiResult<T>
    where
        Fut: Future<Output = ApiResult<T>>,
    {
        let result = request.await;
        if result.is_ok() {
            self.invalidate_tags(tags).await;
        }
        result
    }

    /// Marks every entry carrying one of `tags` stale. Returns how many
    /// entries were affected.
    pub async fn invalidate_tags(&self, tags: &[Tag]) -> usize {
        let mut guard = self.inner.lock().await;
        let CacheInner {
            entries,
            tag_index,
            stats,
            ..
        } = &mut *guard;

        let keys: HashSet<&CacheKey> = tags
            .iter()
            .filter_map(|tag| tag_index.get(tag))
            .flatten()
            .collect();

        let mut affected = 0;
        for key in keys {
            let Some(entry) = entries.get_mut(key) else {
                continue;
            };
            match entry.status {
                EntryStatus::Ready => {
                    entry.status = EntryStatus::Stale;
                    if entry.in_flight.is_some() {
                        entry.invalidated_during_flight = true;
                    }
                    affected += 1;
                }
                EntryStatus::Loading => {
                    entry.invalidated_during_flight = true;
                    affected += 1;
                }
                EntryStatus::Uninitialized | EntryStatus::Stale | EntryStatus::Error => {}
            }
        }

        stats.invalidations += affected as u64;
        debug!(tags = ?tags, affected, "Invalidated cache tags");
        affected
    }

    /// Drops every entry. Fetches still running finish into nothing.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.tag_index.clear();
        debug!(dropped, "Cache reset");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn read<T>(&self, key: CacheKey, tags: &[Tag], fetcher: Fetcher, mode: ReadMode) -> ApiResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let lookup = {
            let mut guard = self.inner.lock().await;
            self.lookup(&mut guard, &key, tags, fetcher, mode)
        };

        let value = match lookup {
            Lookup::Hit(value) => value,
            Lookup::Wait(flight) => flight.await?,
        };
        downcast(value, &key)
    }

    fn lookup(
        &self,
        inner: &mut CacheInner,
        key: &CacheKey,
        tags: &[Tag],
        fetcher: Fetcher,
        mode: ReadMode,
    ) -> Lookup {
        for tag in tags {
            inner.tag_index.entry(*tag).or_default().insert(key.clone());
        }
        let generation = &mut inner.next_generation;
        let stats = &mut inner.stats;
        let entry = inner.entries.entry(key.clone()).or_insert_with(CacheEntry::new);

        let servable = match entry.status {
            EntryStatus::Ready => true,
            EntryStatus::Stale | EntryStatus::Error | EntryStatus::Loading => mode == ReadMode::StaleOk,
            EntryStatus::Uninitialized => false,
        };

        if servable {
            if let Some(value) = entry.value.clone() {
                let needs_refresh = entry.status != EntryStatus::Ready || entry.is_expired(self.policy.max_age);
                if needs_refresh && entry.joinable_flight().is_none() {
                    debug!(key = %key, status = ?entry.status, "Serving cached value, refreshing in background");
                    self.start_fetch(entry, generation, key, fetcher);
                } else {
                    debug!(key = %key, "Cache hit");
                }
                stats.hits += 1;
                return Lookup::Hit(value);
            }
        }

        if let Some(flight) = entry.joinable_flight() {
            debug!(key = %key, "Joining in-flight fetch");
            stats.coalesced += 1;
            return Lookup::Wait(flight);
        }

        debug!(key = %key, status = ?entry.status, "Cache miss, fetching");
        stats.misses += 1;
        Lookup::Wait(self.start_fetch(entry, generation, key, fetcher))
    }

    /// Spawns the fetch for `entry` and records it as the entry's flight.
    fn start_fetch(
        &self,
        entry: &mut CacheEntry,
        next_generation: &mut u64,
        key: &CacheKey,
        fetcher: Fetcher,
    ) -> SharedFetch {
        *next_generation += 1;
        let generation = *next_generation;
        entry.generation = generation;
        entry.invalidated_during_flight = false;
        if entry.status != EntryStatus::Ready {
            entry.status = EntryStatus::Loading;
        }

        let inner = Arc::clone(&self.inner);
        let policy = self.policy.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fetch_with_retry(&policy, &task_key, &fetcher).await;
            settle(&inner, &task_key, generation, &result).await;
            result
        });

        let flight = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(ApiError::Internal(format!("fetch task failed: {}", e))),
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(flight.clone());
        flight
    }
}

/// Records a finished fetch, unless the entry is gone or a newer fetch owns it.
async fn settle(inner: &Mutex<CacheInner>, key: &CacheKey, generation: u64, result: &ApiResult<BoxedValue>) {
    let mut inner = inner.lock().await;
    let Some(entry) = inner.entries.get_mut(key) else {
        debug!(key = %key, "Fetch finished for a dropped entry");
        return;
    };
    if entry.generation != generation {
        debug!(key = %key, "Fetch superseded, discarding result");
        return;
    }

    entry.in_flight = None;
    match result {
        Ok(value) => {
            entry.value = Some(Arc::clone(value));
            entry.error = None;
            entry.fetched_at = Some(Instant::now());
            entry.status = if entry.invalidated_during_flight {
                EntryStatus::Stale
            } else {
                EntryStatus::Ready
            };
        }
        Err(e) => {
            debug!(key = %key, error = %e, "Fetch failed");
            entry.error = Some(e.clone());
            entry.status = EntryStatus::Error;
        }
    }
    entry.invalidated_during_flight = false;
}

/// Runs `fetcher`, retrying network failures when the policy allows.
async fn fetch_with_retry(policy: &CachePolicy, key: &CacheKey, fetcher: &Fetcher) -> ApiResult<BoxedValue> {
    let mut backoff = policy.backoff();
    let mut attempt = 0u32;

    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.read_retries => {
                attempt += 1;
                let delay = backoff.next_backoff().unwrap_or(policy.max_backoff);
                warn!(
                    key = %key,
                    attempt,
                    max_retries = policy.read_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Read failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

fn erase<T, F, Fut>(fetch: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<T>> + Send + 'static,
{
    Arc::new(move || {
        let fut = fetch();
        async move { fut.await.map(|value| Arc::new(value) as BoxedValue) }.boxed()
    })
}

fn downcast<T: Send + Sync + 'static>(value: BoxedValue, key: &CacheKey) -> ApiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| ApiError::Internal(format!("cached value for {} has an unexpected type", key)))
}

//! Session credential acquisition, caching, and persistence.
//!
//! The session id (SID) authorises every API call and is expensive to
//! obtain: a network round trip to the service front page plus a scrape.
//! [`SessionManager`] layers three sources, cheapest first:
//!
//! 1. in-memory [`AsyncTtlCell`] — per client instance, single-flight;
//! 2. on-disk [`SidStore`] — shared by all instances and processes,
//!    fresh for 4 days by default;
//! 3. network acquisition via a page-fetching closure supplied by the
//!    client, followed by extraction ([`sid::extract`]) and a best-effort
//!    disk write.
//!
//! Steps 2–3 run inside the cell's producer, so any number of concurrent
//! first-time callers trigger exactly one page fetch and one disk write.
//!
//! The derived *request identity* (`{sid}-{digit}-0`) is deliberately
//! never cached — the remote service expects a fresh random suffix per
//! request.

pub mod sid;
pub mod store;

pub use store::{DEFAULT_DISK_TTL, SidStore};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use rand::Rng;
use tracing::{debug, info};

use crate::Result;
use crate::cache::AsyncTtlCell;
use crate::telemetry;

/// Derive a request identity from a session id: the credential plus a
/// fresh random digit suffix. Recomputed on every call, never cached.
pub fn request_id(sid: &str) -> String {
    let digit: u8 = rand::rng().random_range(0..=9);
    format!("{sid}-{digit}-0")
}

/// Async session credential manager: memory cell over disk store over
/// network acquisition.
pub struct SessionManager {
    cell: AsyncTtlCell<String, crate::TolkrError>,
    store: Arc<SidStore>,
}

impl SessionManager {
    /// Create a manager over `store`, with an in-memory freshness window
    /// of `ttl` (normally the same as the store's disk TTL).
    pub fn new(store: SidStore, ttl: Option<Duration>) -> Self {
        Self {
            cell: AsyncTtlCell::new(ttl),
            store: Arc::new(store),
        }
    }

    /// Path of the backing disk store.
    pub fn store_path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// Return the session id, acquiring it if no fresh copy exists.
    ///
    /// `fetch_page` retrieves the service front-page HTML; it is invoked
    /// only on a full cache miss (memory and disk both stale or absent),
    /// and at most once per freshness window across concurrent callers.
    pub async fn session_id<F, Fut>(&self, fetch_page: F) -> Result<String>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        if let Some(sid) = self.cell.get().await {
            counter!(telemetry::CACHE_HITS_TOTAL, "source" => "memory").increment(1);
            return Ok(sid);
        }

        let store = self.store.clone();
        self.cell
            .get_or_try_init(move || async move {
                if let Some(sid) = store.load() {
                    counter!(telemetry::CACHE_HITS_TOTAL, "source" => "disk").increment(1);
                    debug!("sid restored from disk cache");
                    return Ok(sid);
                }
                counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

                let page = fetch_page().await?;
                let sid = sid::extract(&page)?;
                store.save(&sid);
                counter!(telemetry::SID_REFRESHES_TOTAL).increment(1);
                info!("acquired fresh sid from network");
                Ok(sid)
            })
            .await
    }

    /// Drop the in-memory copy. The disk store is left untouched; the
    /// next read falls through to it.
    pub async fn invalidate_memory(&self) {
        self.cell.clear().await;
    }
}

/// Blocking mirror of [`SessionManager`] for the sync regime.
///
/// Identical state machine over the synchronous [`TtlCell`](crate::cache::TtlCell);
/// the cell's mutex is held across acquisition, so concurrent threads
/// sharing one manager still perform a single page fetch per window.
#[cfg(feature = "blocking")]
pub struct BlockingSessionManager {
    cell: crate::cache::TtlCell<String>,
    store: SidStore,
}

#[cfg(feature = "blocking")]
impl BlockingSessionManager {
    /// See [`SessionManager::new`].
    pub fn new(store: SidStore, ttl: Option<Duration>) -> Self {
        Self {
            cell: crate::cache::TtlCell::new(ttl),
            store,
        }
    }

    /// Blocking counterpart of [`SessionManager::session_id`].
    pub fn session_id(&self, fetch_page: impl FnOnce() -> Result<String>) -> Result<String> {
        if let Some(sid) = self.cell.get() {
            counter!(telemetry::CACHE_HITS_TOTAL, "source" => "memory").increment(1);
            return Ok(sid);
        }
        self.cell.get_or_try_init(|| {
            if let Some(sid) = self.store.load() {
                counter!(telemetry::CACHE_HITS_TOTAL, "source" => "disk").increment(1);
                debug!("sid restored from disk cache");
                return Ok(sid);
            }
            counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

            let page = fetch_page()?;
            let sid = sid::extract(&page)?;
            self.store.save(&sid);
            counter!(telemetry::SID_REFRESHES_TOTAL).increment(1);
            info!("acquired fresh sid from network");
            Ok(sid)
        })
    }
}

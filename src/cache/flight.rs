//! Async TTL memo cell with single-flight acquisition.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::TryFutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

/// The cached value is the producing operation itself, shared between
/// every reader of one freshness window.
type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, Arc<E>>>>;

struct Entry<T, E> {
    outcome: SharedOutcome<T, E>,
    created_at: Instant,
    generation: u64,
}

impl<T: Clone, E> Clone for Entry<T, E> {
    fn clone(&self) -> Self {
        Self {
            outcome: self.outcome.clone(),
            created_at: self.created_at,
            generation: self.generation,
        }
    }
}

/// Lazily populated async cell with a freshness window and single-flight
/// acquisition.
///
/// The freshness contract matches [`TtlCell`](crate::cache::TtlCell). The
/// difference is what gets stored: the in-flight shared future is
/// installed the instant acquisition starts, before it resolves. A reader
/// arriving while acquisition is pending finds a fresh entry, attaches to
/// the same future, and receives the identical outcome — the producer runs
/// at most once per freshness window no matter how many callers race.
///
/// Errors are shared as `Arc<E>` between attached readers and cloned back
/// out, which is why `E: Clone`. A producer that resolves to `Err` has its
/// entry evicted, so the next reader retries acquisition instead of
/// observing a cached failure until the TTL elapses. A caller that drops
/// its await leaves the in-flight entry in place for the next reader;
/// there is no cancellation path.
pub struct AsyncTtlCell<T, E> {
    ttl: Option<Duration>,
    slot: Mutex<Option<Entry<T, E>>>,
    generation: AtomicU64,
}

impl<T, E> AsyncTtlCell<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cell. `ttl = None` means entries never expire.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Return the cached value if a fresh entry exists and its producing
    /// operation has already resolved successfully.
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.lock().await;
        slot.as_ref()
            .filter(|entry| self.is_fresh(entry.created_at))
            .and_then(|entry| entry.outcome.peek())
            .and_then(|outcome| outcome.as_ref().ok())
            .cloned()
    }

    /// Return the fresh cached outcome, or start `make()` and store the
    /// in-flight operation so concurrent readers share it.
    ///
    /// `make` is only called when no fresh entry exists; the future it
    /// returns is driven by whichever readers await it.
    pub async fn get_or_try_init<F, Fut>(&self, make: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let entry = {
            let mut slot = self.slot.lock().await;
            let fresh = slot
                .as_ref()
                .filter(|e| self.is_fresh(e.created_at))
                .cloned();
            match fresh {
                Some(entry) => entry,
                None => {
                    let entry = Entry {
                        outcome: make().map_err(Arc::new).boxed().shared(),
                        created_at: Instant::now(),
                        generation: self.generation.fetch_add(1, Ordering::Relaxed),
                    };
                    *slot = Some(entry.clone());
                    entry
                }
            }
        };

        match entry.outcome.await {
            Ok(value) => Ok(value),
            Err(err) => {
                // Evict the failed flight so the next reader retries, but
                // only if it is still the installed entry.
                let mut slot = self.slot.lock().await;
                if slot
                    .as_ref()
                    .is_some_and(|e| e.generation == entry.generation)
                {
                    *slot = None;
                }
                Err((*err).clone())
            }
        }
    }

    /// Overwrite the cell with an already-resolved value and a fresh
    /// timestamp, bypassing the producer.
    ///
    /// The value is wrapped in a resolved shared future so the get path
    /// stays uniform with producer-populated entries.
    pub async fn set(&self, value: T) {
        let entry = Entry {
            outcome: futures_util::future::ready(Ok(value)).boxed().shared(),
            created_at: Instant::now(),
            generation: self.generation.fetch_add(1, Ordering::Relaxed),
        };
        *self.slot.lock().await = Some(entry);
    }

    /// Remove the entry entirely; the next read recomputes unconditionally.
    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }

    fn is_fresh(&self, created_at: Instant) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => created_at.elapsed() < ttl,
        }
    }
}

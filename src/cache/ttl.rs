//! Synchronous TTL memo cell.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A memoized value plus the moment it was (re)populated.
struct Entry<T> {
    value: T,
    created_at: Instant,
}

/// Lazily populated cell with a freshness window.
///
/// A fresh value is returned as-is; a stale or absent one triggers the
/// producer passed to [`get_or_try_init`](TtlCell::get_or_try_init). With
/// `ttl = None` the cell never expires and [`clear`](TtlCell::clear) is
/// the only way to force recomputation.
///
/// The cell's mutex is held across the producer call, so concurrent
/// readers cannot run the producer twice within one freshness window.
/// Producers must therefore not re-enter the same cell.
///
/// ```rust
/// # use std::time::Duration;
/// # use tolkr::cache::TtlCell;
/// let cell: TtlCell<String> = TtlCell::new(Some(Duration::from_secs(60)));
/// let value = cell
///     .get_or_try_init(|| Ok::<_, std::io::Error>("expensive".to_string()))
///     .unwrap();
/// assert_eq!(value, "expensive");
/// assert_eq!(cell.get(), Some("expensive".to_string()));
/// ```
pub struct TtlCell<T> {
    ttl: Option<Duration>,
    slot: Mutex<Option<Entry<T>>>,
}

impl<T: Clone> TtlCell<T> {
    /// Create an empty cell. `ttl = None` means entries never expire.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if a fresh entry exists.
    pub fn get(&self) -> Option<T> {
        let slot = self.lock();
        slot.as_ref()
            .filter(|entry| self.is_fresh(entry.created_at))
            .map(|entry| entry.value.clone())
    }

    /// Return the fresh cached value, or invoke `produce`, store its
    /// result with the current timestamp, and return it.
    ///
    /// Producer errors propagate unchanged and leave the cell untouched
    /// (a stale entry stays stale; the next read retries).
    pub fn get_or_try_init<E>(
        &self,
        produce: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        let mut slot = self.lock();
        if let Some(entry) = slot.as_ref().filter(|e| self.is_fresh(e.created_at)) {
            return Ok(entry.value.clone());
        }
        let value = produce()?;
        *slot = Some(Entry {
            value: value.clone(),
            created_at: Instant::now(),
        });
        Ok(value)
    }

    /// Overwrite the cell with `value` and a fresh timestamp, bypassing
    /// the producer.
    pub fn set(&self, value: T) {
        *self.lock() = Some(Entry {
            value,
            created_at: Instant::now(),
        });
    }

    /// Remove the entry entirely; the next read recomputes unconditionally.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn is_fresh(&self, created_at: Instant) -> bool {
        match self.ttl {
            None => true,
            Some(ttl) => created_at.elapsed() < ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Entry<T>>> {
        // A poisoned lock only means a producer panicked; the slot itself
        // is still a coherent Option.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Durable on-disk store for the session id.
//!
//! One raw-UTF-8 file whose entire content is the credential — no
//! envelope, no checksum. Freshness is judged solely by the file's
//! modification time against a configured window (4 days by default).
//! The store is a best-effort advisory cache shared by every client
//! instance and process: read and write failures are absorbed, never
//! surfaced, and a stale file is simply overwritten.
//!
//! Writes go to a sibling `.tmp` file first and are renamed into place,
//! so a concurrent reader never observes a half-written credential. The
//! rename also refreshes the modification time, restarting the freshness
//! window on every successful acquisition even when the content is
//! byte-identical.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// Default freshness window for the on-disk credential: 4 days.
pub const DEFAULT_DISK_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 4);

/// Default store location: a dotfile in the user's home directory.
const DEFAULT_FILE_NAME: &str = ".tolkr.key";

/// Mtime-gated raw-text credential store.
pub struct SidStore {
    path: PathBuf,
    ttl: Duration,
}

impl SidStore {
    /// Create a store over `path` with the given freshness window.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Default path: `~/.tolkr.key`. `None` when no home directory can be
    /// determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_FILE_NAME))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential if the file is present, a regular file,
    /// and fresh.
    ///
    /// Every failure mode — missing file, unreadable file, permission
    /// denied on stat or read, expired mtime — collapses to `None`: the
    /// caller falls back to fresh acquisition rather than crashing on a
    /// broken cache file.
    pub fn load(&self) -> Option<String> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to stat sid cache");
                return None;
            }
        };
        if !metadata.is_file() || !self.is_fresh(&metadata) {
            return None;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(sid) => {
                debug!(path = %self.path.display(), "loaded sid from disk cache");
                Some(sid)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read sid cache");
                None
            }
        }
    }

    /// Persist the credential, best-effort.
    ///
    /// A failure here is logged and swallowed — the in-memory value is
    /// still good, so durable persistence must not fail the overall
    /// operation.
    pub fn save(&self, sid: &str) {
        if let Err(e) = self.try_save(sid) {
            warn!(path = %self.path.display(), error = %e, "failed to persist sid cache");
        }
    }

    /// Atomic write via tmp + rename.
    fn try_save(&self, sid: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = {
            let mut os = self.path.clone().into_os_string();
            os.push(".tmp");
            PathBuf::from(os)
        };
        std::fs::write(&tmp_path, sid)?;
        std::fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), "persisted sid to disk cache");
        Ok(())
    }

    /// Fresh iff `now - mtime < ttl`. An unreadable or future mtime counts
    /// as fresh, matching a wall-clock comparison that went negative.
    fn is_fresh(&self, metadata: &std::fs::Metadata) -> bool {
        let Ok(mtime) = metadata.modified() else {
            return true;
        };
        match SystemTime::now().duration_since(mtime) {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }
}

//! Telemetry metric name constants.
//!
//! Centralised metric names for tolkr operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tolkr_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `operation` — API call performed ("detect" | "translate")
//! - `status` — outcome: "ok" or "error"
//! - `source` — where the session id came from ("memory" | "disk" | "network")

/// Total API requests dispatched.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "tolkr_requests_total";

/// Total session-id cache hits (memory or disk).
///
/// Labels: `source` ("memory" | "disk").
pub const CACHE_HITS_TOTAL: &str = "tolkr_cache_hits_total";

/// Total session-id cache misses (both layers stale or absent).
pub const CACHE_MISSES_TOTAL: &str = "tolkr_cache_misses_total";

/// Total fresh session-id acquisitions from the network.
pub const SID_REFRESHES_TOTAL: &str = "tolkr_sid_refreshes_total";

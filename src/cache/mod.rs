//! TTL lazy caching primitives.
//!
//! Two memoization cells share one freshness contract — an entry is fresh
//! while its age is below a configured time-to-live, and a `ttl` of `None`
//! means "cache until explicitly cleared":
//!
//! - [`TtlCell`] — synchronous produce-and-store. The internal mutex is
//!   held across the producer call, so concurrent readers of the same cell
//!   observe exactly one invocation per freshness window.
//!
//! - [`AsyncTtlCell`] — suspend/resume variant with single-flight
//!   semantics. The cell stores the in-flight shared future itself, before
//!   it resolves; readers arriving during acquisition attach to the same
//!   operation and receive its single outcome rather than starting their
//!   own.
//!
//! Both cells are building blocks for the session credential manager in
//! [`crate::session`], but carry no session-specific logic and can guard
//! any expensive zero-argument producer.

pub mod flight;
pub mod ttl;

pub use flight::AsyncTtlCell;
pub use ttl::TtlCell;

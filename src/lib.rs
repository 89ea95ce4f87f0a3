//! Tolkr - client for an unofficial translation web service
//!
//! The service has no public API; clients scrape a session id (SID) from
//! its HTML front page and use it to sign JSON calls for language
//! detection and text translation. Tolkr wraps that protocol and hides
//! its expensive part — SID acquisition — behind a two-layer cache: an
//! in-memory TTL cell with single-flight semantics plus an on-disk store
//! that keeps the credential fresh across process restarts for 4 days.
//!
//! # Translate Example
//!
//! ```rust,no_run
//! use tolkr::Translator;
//!
//! #[tokio::main]
//! async fn main() -> tolkr::Result<()> {
//!     let translator = Translator::builder()
//!         .timeout(std::time::Duration::from_secs(30))
//!         .build()?;
//!
//!     let text = translator.translate("Hello, world!", "en", "es").await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```
//!
//! # Detect Example
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> tolkr::Result<()> {
//!     let lang = tolkr::quick::detect("Guten Tag").await?;
//!     assert_eq!(lang, "de");
//!     Ok(())
//! }
//! ```
//!
//! A blocking client (`tolkr::client::blocking`) is available behind the
//! `blocking` feature for callers without an async runtime.

pub mod cache;
pub mod client;
pub mod error;
pub mod lang;
pub mod quick;
pub mod session;
pub mod telemetry;

// Re-export main types at crate root
pub use client::{Translator, TranslatorBuilder};
pub use error::{Result, TolkrError};

// Re-export the caching primitives — they are useful beyond the session
// credential they were built for.
pub use cache::{AsyncTtlCell, TtlCell};
pub use session::{SessionManager, SidStore};

//! One-shot convenience functions.
//!
//! Each call builds a default client, performs a single operation, and
//! drops the client. The session id still round-trips through the shared
//! disk cache, so repeated one-shot calls within the freshness window pay
//! for acquisition only once.

use crate::{Result, Translator};

/// Detect the language of `text` with a throwaway client.
pub async fn detect(text: &str) -> Result<String> {
    Translator::new()?.detect(text).await
}

/// Translate `text` from `source` to `target` with a throwaway client.
pub async fn translate(text: &str, source: &str, target: &str) -> Result<String> {
    Translator::new()?.translate(text, source, target).await
}

/// Blocking counterparts of the one-shot functions.
#[cfg(feature = "blocking")]
pub mod blocking {
    use crate::Result;
    use crate::client::blocking::Translator;

    /// Detect the language of `text` with a throwaway blocking client.
    pub fn detect(text: &str) -> Result<String> {
        Translator::new()?.detect(text)
    }

    /// Translate `text` from `source` to `target` with a throwaway
    /// blocking client.
    pub fn translate(text: &str, source: &str, target: &str) -> Result<String> {
        Translator::new()?.translate(text, source, target)
    }
}

//! Session-id extraction from the scraped front page.
//!
//! The service embeds its session id in the front-page HTML as
//! `SID: "<value>"` (single or double quotes). The embedded value is
//! scrambled: each dot-delimited segment is stored character-reversed, and
//! the client must un-reverse every segment before use.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Result, TolkrError};

/// `SID : "<value>"`, tolerating either quote style and optional spaces
/// around the colon.
static SID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"SID\s?:\s?['"]([^'"]+)['"]"#).expect("SID pattern is valid")
});

/// Extract the session id from a front-page HTML body.
///
/// Returns [`TolkrError::SidParse`] when the page contains no SID — a
/// terminal condition meaning the remote page format changed.
///
/// ```rust
/// # use tolkr::session::sid::extract;
/// let sid = extract(r#"var config = { SID: "a1.b2", ready: true };"#).unwrap();
/// assert_eq!(sid, "1a.2b");
/// ```
pub fn extract(page: &str) -> Result<String> {
    let captures = SID_PATTERN.captures(page).ok_or(TolkrError::SidParse)?;
    Ok(unscramble(&captures[1]))
}

/// Reverse the characters of every dot-delimited segment.
fn unscramble(raw: &str) -> String {
    raw.split('.')
        .map(|segment| segment.chars().rev().collect::<String>())
        .collect::<Vec<_>>()
        .join(".")
}

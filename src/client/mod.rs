//! Translation service clients.
//!
//! [`Translator`] is the async client (primary). The blocking mirror
//! lives in [`blocking`] behind the `blocking` feature.
//!
//! # Session lifecycle
//!
//! The HTTP session (connection pool, User-Agent, proxy pick) is created
//! at build time and recreated by [`Translator::reset()`]; no connection
//! state leaks across resets. The session *credential* has its own,
//! longer lifecycle — it is managed by [`SessionManager`] and survives
//! resets and even process restarts via the on-disk store.

#[cfg(feature = "blocking")]
pub mod blocking;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use rand::prelude::IndexedRandom;
use serde::Deserialize;
use tracing::debug;

use crate::session::{DEFAULT_DISK_TTL, SessionManager, SidStore};
use crate::{Result, TolkrError, lang, session, telemetry};

/// Front page the session id is scraped from.
pub(crate) const DEFAULT_SITE_URL: &str = "https://translate.yandex.ru/";

/// JSON API root; `detect` and `translate` are appended.
pub(crate) const DEFAULT_API_URL: &str = "https://translate.yandex.net/api/v1/tr.json/";

/// Browser User-Agents the client impersonates; one is drawn per session.
pub(crate) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

/// Transport knobs shared by build and reset.
#[derive(Debug, Clone)]
pub(crate) struct TransportConfig {
    pub(crate) proxies: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) danger_accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Draw a User-Agent for a new session.
    pub(crate) fn pick_user_agent(&self) -> String {
        USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }

    /// Draw a proxy for a new session, if any are configured.
    pub(crate) fn pick_proxy(&self) -> Option<&str> {
        self.proxies.choose(&mut rand::rng()).map(String::as_str)
    }
}

/// Browser-like headers for API calls.
pub(crate) fn api_headers(user_agent: &str, site_url: &str) -> reqwest::header::HeaderMap {
    use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER, USER_AGENT};
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    if let Ok(value) = HeaderValue::from_str(site_url.trim_end_matches('/')) {
        headers.insert(ORIGIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(site_url) {
        headers.insert(REFERER, value);
    }
    headers
}

/// Browser-like headers for the front-page fetch.
pub(crate) fn fetch_headers(user_agent: &str) -> reqwest::header::HeaderMap {
    use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    if let Ok(value) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, value);
    }
    headers
}

#[derive(Deserialize)]
struct DetectResponse {
    lang: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    text: Vec<String>,
}

/// Reject language codes outside the service catalog before spending a
/// network round trip on them.
pub(crate) fn check_lang_pair(source: &str, target: &str) -> Result<()> {
    for code in [source, target] {
        if !lang::is_supported(code) {
            return Err(TolkrError::UnsupportedLanguage(code.to_string()));
        }
    }
    Ok(())
}

/// Turn a response into `Ok(body)` or a [`TolkrError::Api`] carrying the
/// raw body, and emit the request counter.
pub(crate) fn check_status(operation: &'static str, status: u16, body: String) -> Result<String> {
    if (200..300).contains(&status) {
        counter!(telemetry::REQUESTS_TOTAL, "operation" => operation, "status" => "ok")
            .increment(1);
        Ok(body)
    } else {
        counter!(telemetry::REQUESTS_TOTAL, "operation" => operation, "status" => "error")
            .increment(1);
        Err(TolkrError::Api { status, body })
    }
}

pub(crate) fn parse_detect(body: &str) -> Result<String> {
    let resp: DetectResponse = serde_json::from_str(body)?;
    Ok(resp.lang)
}

pub(crate) fn parse_translate(body: &str) -> Result<String> {
    let resp: TranslateResponse = serde_json::from_str(body)?;
    resp.text.into_iter().next().ok_or(TolkrError::EmptyResponse)
}

/// Async client for the translation service.
///
/// ```rust,no_run
/// use tolkr::Translator;
///
/// #[tokio::main]
/// async fn main() -> tolkr::Result<()> {
///     let translator = Translator::new()?;
///     let lang = translator.detect("Hello there").await?;
///     assert_eq!(lang, "en");
///     let text = translator.translate("Hello", "en", "es").await?;
///     println!("{text}");
///     Ok(())
/// }
/// ```
pub struct Translator {
    http: reqwest::Client,
    user_agent: String,
    site_url: String,
    api_url: String,
    session: Arc<SessionManager>,
    transport: TransportConfig,
}

impl Translator {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    /// Detect the language of `text`. Returns the detected code.
    pub async fn detect(&self, text: &str) -> Result<String> {
        self.detect_with_hints(text, &[]).await
    }

    /// Detect the language of `text`, biasing the service towards the
    /// hinted codes.
    pub async fn detect_with_hints(&self, text: &str, hints: &[&str]) -> Result<String> {
        let sid = self.session_id().await?;

        let mut params: Vec<(&str, String)> = vec![
            ("sid", sid),
            ("srv", "tr-text".to_string()),
            ("text", text.to_string()),
            ("options", "1".to_string()),
        ];
        if !hints.is_empty() {
            params.push(("hint", hints.join(",")));
        }

        let resp = self
            .http
            .get(format!("{}detect", self.api_url))
            .query(&params)
            .headers(api_headers(&self.user_agent, &self.site_url))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = check_status("detect", status, resp.text().await?)?;
        parse_detect(&body)
    }

    /// Translate `text` from `source` to `target` (language codes from
    /// [`crate::lang`]). Returns the translated text.
    pub async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        check_lang_pair(source, target)?;

        let sid = self.session_id().await?;
        let id = session::request_id(&sid);

        let params: Vec<(&str, String)> = vec![
            ("id", id),
            ("srv", "tr-text".to_string()),
            ("lang", format!("{source}-{target}")),
            ("reason", "type-end".to_string()),
            ("format", "text".to_string()),
            ("ajax", "1".to_string()),
        ];

        let resp = self
            .http
            .post(format!("{}translate", self.api_url))
            .query(&params)
            .form(&[("text", text), ("options", "4")])
            .headers(api_headers(&self.user_agent, &self.site_url))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = check_status("translate", status, resp.text().await?)?;
        parse_translate(&body)
    }

    /// Tear down the HTTP session and start a fresh one: new connection
    /// pool, new User-Agent, new proxy pick. The credential cache is
    /// unaffected.
    pub fn reset(&mut self) -> Result<()> {
        let (http, user_agent) = build_http(&self.transport)?;
        self.http = http;
        self.user_agent = user_agent;
        debug!("http session recreated");
        Ok(())
    }

    /// Path of the on-disk session-id cache.
    pub fn cache_path(&self) -> &std::path::Path {
        self.session.store_path()
    }

    async fn session_id(&self) -> Result<String> {
        let http = self.http.clone();
        let url = self.site_url.clone();
        let user_agent = self.user_agent.clone();
        self.session
            .session_id(move || fetch_front_page(http, url, user_agent))
            .await
    }
}

/// Fetch the front-page HTML the session id is embedded in.
async fn fetch_front_page(
    http: reqwest::Client,
    url: String,
    user_agent: String,
) -> Result<String> {
    let resp = http
        .get(&url)
        .headers(fetch_headers(&user_agent))
        .send()
        .await?;
    Ok(resp.text().await?)
}

/// Build a fresh HTTP session from the transport config: client plus the
/// User-Agent it will impersonate.
pub(crate) fn build_http(config: &TransportConfig) -> Result<(reqwest::Client, String)> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.danger_accept_invalid_certs);
    if let Some(proxy) = config.pick_proxy() {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    let http = builder.build()?;
    Ok((http, config.pick_user_agent()))
}

/// Builder for [`Translator`] (and, with the `blocking` feature, for
/// `blocking::Translator`).
pub struct TranslatorBuilder {
    site_url: String,
    api_url: String,
    cache_path: Option<PathBuf>,
    cache_ttl: Duration,
    proxies: Vec<String>,
    timeout: Duration,
    danger_accept_invalid_certs: bool,
}

impl TranslatorBuilder {
    pub fn new() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            cache_path: None,
            cache_ttl: DEFAULT_DISK_TTL,
            proxies: Vec::new(),
            timeout: Duration::from_secs(60),
            danger_accept_invalid_certs: false,
        }
    }

    /// Override the front-page URL (e.g. to point at a mock server).
    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = url.into();
        self
    }

    /// Override the API root URL. Must end with `/`.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the on-disk session-id cache location (default:
    /// `~/.tolkr.key`). Injecting a path here isolates tests from the
    /// process-wide cache file.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Freshness window for the session id, both in memory and on disk
    /// (default: 4 days).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Add a proxy URL to the rotation; one is drawn at random per
    /// session.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxies.push(url.into());
        self
    }

    /// Request timeout (default: 60 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable TLS certificate verification. Only for debugging proxies.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    fn into_parts(self) -> Result<(TransportConfig, String, String, SessionManager)> {
        let cache_path = match self.cache_path {
            Some(path) => path,
            None => SidStore::default_path().ok_or_else(|| {
                TolkrError::Configuration(
                    "no home directory; set an explicit cache_path".to_string(),
                )
            })?,
        };
        let store = SidStore::new(cache_path, self.cache_ttl);
        let session = SessionManager::new(store, Some(self.cache_ttl));
        let transport = TransportConfig {
            proxies: self.proxies,
            timeout: self.timeout,
            danger_accept_invalid_certs: self.danger_accept_invalid_certs,
        };
        Ok((transport, self.site_url, self.api_url, session))
    }

    /// Build the async client.
    pub fn build(self) -> Result<Translator> {
        let (transport, site_url, api_url, session) = self.into_parts()?;
        let (http, user_agent) = build_http(&transport)?;
        Ok(Translator {
            http,
            user_agent,
            site_url,
            api_url,
            session: Arc::new(session),
            transport,
        })
    }

    /// Build the blocking client.
    #[cfg(feature = "blocking")]
    pub fn build_blocking(self) -> Result<blocking::Translator> {
        blocking::Translator::from_builder(self)
    }
}

impl Default for TranslatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "blocking")]
impl TranslatorBuilder {
    pub(crate) fn into_blocking_parts(
        self,
    ) -> Result<(
        TransportConfig,
        String,
        String,
        crate::session::BlockingSessionManager,
    )> {
        let cache_ttl = self.cache_ttl;
        let cache_path = match self.cache_path {
            Some(path) => path,
            None => SidStore::default_path().ok_or_else(|| {
                TolkrError::Configuration(
                    "no home directory; set an explicit cache_path".to_string(),
                )
            })?,
        };
        let store = SidStore::new(cache_path, cache_ttl);
        let session = crate::session::BlockingSessionManager::new(store, Some(cache_ttl));
        let transport = TransportConfig {
            proxies: self.proxies,
            timeout: self.timeout,
            danger_accept_invalid_certs: self.danger_accept_invalid_certs,
        };
        Ok((transport, self.site_url, self.api_url, session))
    }
}

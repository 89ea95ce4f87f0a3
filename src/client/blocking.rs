//! Blocking client for the sync regime.
//!
//! Same surface as the async [`Translator`](crate::Translator) over
//! `reqwest::blocking`. Operations execute on the caller's thread with no
//! suspension points. Must not be used from inside an async runtime —
//! `reqwest::blocking` panics there by design.

use tracing::debug;

use super::{
    TranslatorBuilder, TransportConfig, check_lang_pair, check_status, fetch_headers,
    parse_detect, parse_translate,
};
use crate::session::{self, BlockingSessionManager};
use crate::{Result, TolkrError};

/// Blocking client for the translation service.
///
/// ```rust,no_run
/// use tolkr::client::blocking;
///
/// fn main() -> tolkr::Result<()> {
///     let translator = blocking::Translator::new()?;
///     let text = translator.translate("Hello", "en", "es")?;
///     println!("{text}");
///     Ok(())
/// }
/// ```
pub struct Translator {
    http: reqwest::blocking::Client,
    user_agent: String,
    site_url: String,
    api_url: String,
    session: BlockingSessionManager,
    transport: TransportConfig,
}

impl Translator {
    /// Create a blocking client with default configuration.
    pub fn new() -> Result<Self> {
        TranslatorBuilder::new().build_blocking()
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }

    pub(crate) fn from_builder(builder: TranslatorBuilder) -> Result<Self> {
        let (transport, site_url, api_url, session) = builder.into_blocking_parts()?;
        let (http, user_agent) = build_http(&transport)?;
        Ok(Self {
            http,
            user_agent,
            site_url,
            api_url,
            session,
            transport,
        })
    }

    /// Detect the language of `text`. Returns the detected code.
    pub fn detect(&self, text: &str) -> Result<String> {
        self.detect_with_hints(text, &[])
    }

    /// Detect the language of `text`, biasing the service towards the
    /// hinted codes.
    pub fn detect_with_hints(&self, text: &str, hints: &[&str]) -> Result<String> {
        let sid = self.session_id()?;

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
            .headers(self.api_headers())
            .send()?;

        let status = resp.status().as_u16();
        let body = check_status("detect", status, resp.text()?)?;
        parse_detect(&body)
    }

    /// Translate `text` from `source` to `target`. Returns the translated
    /// text.
    pub fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        check_lang_pair(source, target)?;

        let sid = self.session_id()?;
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
            .headers(self.api_headers())
            .send()?;

        let status = resp.status().as_u16();
        let body = check_status("translate", status, resp.text()?)?;
        parse_translate(&body)
    }

    /// Tear down the HTTP session and start a fresh one. The credential
    /// cache is unaffected.
    pub fn reset(&mut self) -> Result<()> {
        let (http, user_agent) = build_http(&self.transport)?;
        self.http = http;
        self.user_agent = user_agent;
        debug!("http session recreated");
        Ok(())
    }

    fn session_id(&self) -> Result<String> {
        self.session.session_id(|| self.fetch_front_page())
    }

    fn fetch_front_page(&self) -> Result<String> {
        let resp = self
            .http
            .get(&self.site_url)
            .headers(fetch_headers(&self.user_agent))
            .send()?;
        Ok(resp.text()?)
    }

    fn api_headers(&self) -> reqwest::header::HeaderMap {
        super::api_headers(&self.user_agent, &self.site_url)
    }
}

/// Build a fresh blocking HTTP session from the transport config.
fn build_http(config: &TransportConfig) -> Result<(reqwest::blocking::Client, String)> {
    let mut builder = reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.danger_accept_invalid_certs);
    if let Some(proxy) = config.pick_proxy() {
        builder = builder.proxy(reqwest::Proxy::all(proxy).map_err(TolkrError::from)?);
    }
    let http = builder.build()?;
    Ok((http, config.pick_user_agent()))
}

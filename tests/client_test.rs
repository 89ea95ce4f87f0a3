//! End-to-end client tests against a mock service: front-page scrape,
//! detect, translate, and error surfacing.

use std::time::Duration;

use tolkr::{TolkrError, Translator};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FRONT_PAGE: &str = r#"<html><script>var cfg = { SID: "a1.b2" };</script></html>"#;

async fn mock_front_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRONT_PAGE))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer, dir: &tempfile::TempDir) -> Translator {
    Translator::builder()
        .site_url(format!("{}/", server.uri()))
        .api_url(format!("{}/api/", server.uri()))
        .cache_path(dir.path().join(".tolkr.key"))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn detect_returns_language_code() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_front_page(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/detect"))
        .and(query_param("sid", "1a.2b"))
        .and(query_param("srv", "tr-text"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":200,"lang":"en"}"#))
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    assert_eq!(translator.detect("Hello there").await.unwrap(), "en");
}

#[tokio::test]
async fn translate_returns_first_text_element() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_front_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/translate"))
        .and(query_param("srv", "tr-text"))
        .and(query_param("lang", "en-es"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"code":200,"lang":"en-es","text":["Hola"]}"#),
        )
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    assert_eq!(
        translator.translate("Hello", "en", "es").await.unwrap(),
        "Hola"
    );
}

#[tokio::test]
async fn translate_request_identity_carries_random_suffix() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_front_page(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"text":["Hallo"]}"#))
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    translator.translate("Hello", "en", "de").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let translate_req = requests
        .iter()
        .find(|r| r.url.path() == "/api/translate")
        .expect("translate request recorded");
    let id = translate_req
        .url
        .query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.to_string())
        .expect("id param present");
    // sid + "-" + digit + "-0"
    assert!(id.starts_with("1a.2b-"));
    assert!(id.ends_with("-0"));
    let digit = &id["1a.2b-".len()..id.len() - 2];
    assert!(digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn non_success_response_surfaces_body() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_front_page(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/detect"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    let err = translator.detect("text").await.unwrap_err();
    match err {
        TolkrError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn page_without_sid_fails_without_touching_disk() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>redesigned</html>"))
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    let err = translator.detect("text").await.unwrap_err();
    assert!(matches!(err, TolkrError::SidParse));
    assert!(!dir.path().join(".tolkr.key").exists());
}

#[tokio::test]
async fn front_page_is_scraped_once_across_calls() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRONT_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"lang":"en"}"#))
        .mount(&server)
        .await;

    let translator = client_for(&server, &dir);
    for _ in 0..3 {
        translator.detect("Hello").await.unwrap();
    }
    server.verify().await;
}

#[tokio::test]
async fn second_client_instance_reuses_the_disk_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRONT_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/detect"))
        .and(query_param("sid", "1a.2b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"lang":"en"}"#))
        .mount(&server)
        .await;

    let first = client_for(&server, &dir);
    first.detect("Hello").await.unwrap();
    drop(first);

    // A fresh process would behave like this new instance: same cache
    // path, fresh memory — the credential comes off disk, not the page.
    let second = client_for(&server, &dir);
    assert_eq!(second.detect("Hello").await.unwrap(), "en");
    server.verify().await;
}

#[tokio::test]
async fn unsupported_language_fails_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let translator = client_for(&server, &dir);
    let err = translator.translate("text", "en", "xx").await.unwrap_err();
    assert!(matches!(err, TolkrError::UnsupportedLanguage(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn reset_keeps_the_credential_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FRONT_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"lang":"en"}"#))
        .mount(&server)
        .await;

    let mut translator = client_for(&server, &dir);
    translator.detect("Hello").await.unwrap();
    translator.reset().unwrap();
    translator.detect("Hello").await.unwrap();
    server.verify().await;
}

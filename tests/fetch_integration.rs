//! Integration tests for the HTTP fetcher against a mock server.

use std::time::Duration;

use futures_util::StreamExt;
use pdfdl_core::{FetchError, FetchResult, Fetcher, FetcherConfig, HttpFetcher, ResourceKind, classify};
use reqwest::StatusCode;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&FetcherConfig::default()).expect("client should build")
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).expect("valid mock url")
}

async fn collect_body(result: FetchResult) -> Vec<u8> {
    let mut body = result.body;
    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        bytes.extend_from_slice(&chunk.expect("chunk should arrive"));
    }
    bytes
}

#[tokio::test]
async fn test_fetch_follows_redirect_and_reports_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.php/jrn/article/download/1/2"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/files/journals/1/2.pdf"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/journals/1/2.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&url(&server, "/index.php/jrn/article/download/1/2"))
        .await
        .expect("fetch should succeed");

    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(result.final_url.path(), "/files/journals/1/2.pdf");
    assert_eq!(classify(&result), ResourceKind::DirectPdf);
    assert_eq!(collect_body(result).await, b"%PDF-1.7");
}

#[tokio::test]
async fn test_fetch_http_error_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&url(&server, "/gone"))
        .await
        .expect_err("404 should be an error");

    assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_fetch_redirect_without_location_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&url(&server, "/moved"))
        .await
        .expect("3xx without Location is not an error");

    assert_eq!(result.status, StatusCode::FOUND);
    assert_eq!(classify(&result), ResourceKind::Redirect);
}

#[tokio::test]
async fn test_fetch_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("user-agent", "LibraryBot/2.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html></html>", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    let fetcher = HttpFetcher::new(&FetcherConfig {
        user_agent: "LibraryBot/2.0".into(),
        ..FetcherConfig::default()
    })
    .expect("client should build");

    let result = fetcher.fetch(&url(&server, "/page")).await.expect("fetch should succeed");

    assert_eq!(classify(&result), ResourceKind::HtmlPage);
    assert_eq!(result.into_text().await.expect("text body"), "<html></html>");
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let fetcher = HttpFetcher::new(&FetcherConfig {
        read_timeout_secs: 1,
        ..FetcherConfig::default()
    })
    .expect("client should build");

    let err = fetcher
        .fetch(&url(&server, "/slow"))
        .await
        .expect_err("request should time out");

    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[tokio::test]
async fn test_fetch_connection_refused_is_network_error() {
    let target = Url::parse("http://127.0.0.1:1/anything").expect("valid url");

    let err = fetcher().fetch(&target).await.expect_err("nothing listens on port 1");

    assert!(matches!(err, FetchError::Network { .. }), "got {err:?}");
}

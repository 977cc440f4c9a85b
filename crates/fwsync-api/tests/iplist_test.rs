#![allow(clippy::unwrap_used)]
// Integration tests for `IpListClient` using wiremock.

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwsync_api::{Error, IpListClient};

async fn setup() -> (MockServer, IpListClient, Url) {
    let server = MockServer::start().await;
    let client = IpListClient::from_reqwest(reqwest::Client::new());
    let url = Url::parse(&format!("{}/ips.txt", server.uri())).unwrap();
    (server, client, url)
}

#[tokio::test]
async fn test_fetch_dedupes_and_trims() {
    let (server, client, url) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("203.0.113.5/32\n  198.51.100.0/24\n\n203.0.113.5/32\n"),
        )
        .mount(&server)
        .await;

    let entries = client.fetch(&url).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert!(entries.contains("203.0.113.5/32"));
    assert!(entries.contains("198.51.100.0/24"));
}

#[tokio::test]
async fn test_fetch_empty_body_is_valid() {
    let (server, client, url) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let entries = client.fetch(&url).await.unwrap();

    assert!(entries.is_empty(), "empty body must yield an empty set");
}

#[tokio::test]
async fn test_fetch_server_error() {
    let (server, client, url) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.fetch(&url).await;

    match result {
        Err(ref err @ Error::Http { status: 500, .. }) => {
            assert!(err.is_transient(), "5xx should classify as transient");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_not_found() {
    let (server, client, url) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ips.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client.fetch(&url).await;

    match result {
        Err(ref err @ Error::Http { status: 404, .. }) => {
            assert!(err.is_not_found());
            assert!(!err.is_transient(), "404 is not transient");
        }
        other => panic!("expected Http 404 error, got: {other:?}"),
    }
}

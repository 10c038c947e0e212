//! HTTP-level tests for the Maven Central search client.
//!
//! A local mock server stands in for the search endpoint.

use mockito::Matcher;
use tokio_test::{assert_err, assert_ok};

use maven_central_mcp::config::SearchConfig;
use maven_central_mcp::maven::{
    Coordinate, MavenCentralClient, SearchClient, SearchError, SearchQuery,
};

const GAV_RESPONSE: &str = r#"{
    "responseHeader": {"status": 0, "QTime": 2},
    "response": {
        "numFound": 3,
        "start": 0,
        "docs": [
            {"id": "org.slf4j:slf4j-api:2.0.9", "g": "org.slf4j", "a": "slf4j-api",
             "v": "2.0.9", "p": "jar", "timestamp": 1693500000000},
            {"id": "org.slf4j:slf4j-api:2.1.0-alpha0", "g": "org.slf4j", "a": "slf4j-api",
             "v": "2.1.0-alpha0", "p": "jar", "timestamp": 1692000000000},
            {"id": "org.slf4j:slf4j-api:2.0.7", "g": "org.slf4j", "a": "slf4j-api",
             "v": "2.0.7", "timestamp": 1678000000000}
        ]
    }
}"#;

fn client_for(server: &mockito::ServerGuard) -> MavenCentralClient {
    let config = SearchConfig {
        base_url: format!("{}/solrsearch/select", server.url()),
        ..SearchConfig::default()
    };
    MavenCentralClient::new(&config).unwrap()
}

fn slf4j() -> Coordinate {
    Coordinate::parse("org.slf4j:slf4j-api").unwrap()
}

#[tokio::test]
async fn sends_gav_query_with_sort() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), r#"g:"org.slf4j" AND a:"slf4j-api""#.into()),
            Matcher::UrlEncoded("core".into(), "gav".into()),
            Matcher::UrlEncoded("rows".into(), "100".into()),
            Matcher::UrlEncoded("wt".into(), "json".into()),
            Matcher::UrlEncoded("sort".into(), "timestamp desc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(GAV_RESPONSE)
        .create_async()
        .await;

    let records = assert_ok!(
        client_for(&server)
            .search(&SearchQuery::for_coordinate(&slf4j()))
            .await
    );

    mock.assert_async().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].version, "2.0.9");
    assert_eq!(records[0].published_at, 1_693_500_000_000);
    assert_eq!(records[0].packaging.as_deref(), Some("jar"));
    assert_eq!(records[2].packaging, None);
}

#[tokio::test]
async fn version_query_has_no_sort() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "q".into(),
                r#"g:"org.slf4j" AND a:"slf4j-api" AND v:"2.0.9""#.into(),
            ),
            Matcher::UrlEncoded("core".into(), "gav".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"response": {"numFound": 0, "docs": []}}"#)
        .create_async()
        .await;

    let records = assert_ok!(
        client_for(&server)
            .search(&SearchQuery::for_version(&slf4j(), "2.0.9"))
            .await
    );

    mock.assert_async().await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn configured_rows_cap_the_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::UrlEncoded("rows".into(), "20".into()))
        .with_status(200)
        .with_body(r#"{"response": {"numFound": 0, "docs": []}}"#)
        .create_async()
        .await;

    let config = SearchConfig {
        base_url: format!("{}/solrsearch/select", server.url()),
        rows: 20,
        ..SearchConfig::default()
    };
    let client = MavenCentralClient::new(&config).unwrap();
    client
        .search(&SearchQuery::for_coordinate(&slf4j()))
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let err = assert_err!(
        client_for(&server)
            .search(&SearchQuery::for_coordinate(&slf4j()))
            .await
    );

    assert!(matches!(err, SearchError::Status { status: 503 }));
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create_async()
        .await;

    let err = assert_err!(
        client_for(&server)
            .search(&SearchQuery::for_coordinate(&slf4j()))
            .await
    );

    assert!(matches!(err, SearchError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let config = SearchConfig {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        base_url: "http://127.0.0.1:9/solrsearch/select".to_string(),
        ..SearchConfig::default()
    };
    let client = MavenCentralClient::new(&config).unwrap();

    let err = assert_err!(client.search(&SearchQuery::for_coordinate(&slf4j())).await);

    assert!(matches!(err, SearchError::Transport { .. }));
}

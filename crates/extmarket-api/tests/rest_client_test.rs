#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use extmarket_api::{Column, Error, OrderBy, RemoteQuery, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let key: SecretString = "anon-key".to_string().into();
    let client =
        RestClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();
    (server, client)
}

fn first_page() -> RemoteQuery {
    RemoteQuery {
        filters: Vec::new(),
        order: vec![OrderBy::desc(Column::GithubStars), OrderBy::asc(Column::Id)],
        offset: 0,
        limit: 50,
    }
}

fn row(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "A helpful extension",
        "summary": null,
        "author": "someone",
        "category": "Tools",
        "logo_url": null,
        "github_stars": 12,
        "download_count_month": 300,
        "download_count_total": 4000,
        "last_updated": "2025-03-01T10:00:00+00:00"
    })
}

// ── List queries ────────────────────────────────────────────────────

#[tokio::test]
async fn test_query_extensions_reads_total_from_content_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("prefer", "count=exact"))
        .and(query_param("order", "github_stars.desc,id.asc"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "50"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-1/1234")
                .set_body_json(json!([row(7, "jupyterlab-git"), row(9, "jupyterlab-lsp")])),
        )
        .mount(&server)
        .await;

    let page = client.query_extensions(&first_page()).await.unwrap();

    assert_eq!(page.total_count, 1234);
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, 50);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].id, 7);
    assert_eq!(page.data[1].name, "jupyterlab-lsp");
    assert_eq!(page.data[0].github_stars, 12);
}

#[tokio::test]
async fn test_query_extensions_empty_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "*/0")
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let page = client.query_extensions(&first_page()).await.unwrap();
    assert_eq!(page.total_count, 0);
    assert!(page.data.is_empty());
}

#[tokio::test]
async fn test_query_extensions_missing_count_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client.query_extensions(&first_page()).await;
    assert!(
        matches!(result, Err(Error::ContentRange { .. })),
        "expected ContentRange error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_search_is_sent_as_or_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .and(query_param(
            "or",
            "(name.ilike.\"*git*\",author.ilike.\"*git*\")",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([row(7, "jupyterlab-git")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut query = first_page();
    query.filters.push(extmarket_api::Filter::AnyILike {
        columns: vec![Column::Name, Column::Author],
        needle: "git".into(),
    });

    let page = client.query_extensions(&query).await.unwrap();
    assert_eq!(page.total_count, 1);
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let result = client.query_extensions(&first_page()).await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_structured_error_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "PGRST100",
            "message": "failed to parse order",
            "hint": null
        })))
        .mount(&server)
        .await;

    let err = client.query_extensions(&first_page()).await.unwrap_err();
    match &err {
        Error::Rest {
            status, message, ..
        } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "failed to parse order");
        }
        other => panic!("expected Rest error, got: {other:?}"),
    }
    assert_eq!(err.api_error_code(), Some("PGRST100"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client.query_extensions(&first_page()).await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("upstream down"));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_string("not json"),
        )
        .mount(&server)
        .await;

    let result = client.query_extensions(&first_page()).await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

// ── Detail and freshness ────────────────────────────────────────────

#[tokio::test]
async fn test_get_extension_found() {
    let (server, client) = setup().await;

    let mut detail = row(7, "jupyterlab-git");
    detail["version"] = json!("0.50.1");
    detail["license"] = json!("BSD-3-Clause");
    detail["github_forks"] = json!(300);
    detail["download_count_day"] = json!(42);
    detail["lab_versions"] = json!(["3", "4"]);

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .and(query_param("select", "*"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([detail])))
        .mount(&server)
        .await;

    let found = client.get_extension(7).await.unwrap().unwrap();
    assert_eq!(found.row.id, 7);
    assert_eq!(found.version.as_deref(), Some("0.50.1"));
    assert_eq!(found.github_forks, 300);
    assert_eq!(found.download_count_day, 42);
    assert_eq!(found.lab_versions, vec!["3".to_owned(), "4".to_owned()]);
}

#[tokio::test]
async fn test_get_extension_missing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .and(query_param("id", "eq.404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.get_extension(404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_latest_update() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/extensions"))
        .and(query_param("select", "last_updated"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "last_updated": "2025-06-01T08:30:00+00:00" }
        ])))
        .mount(&server)
        .await;

    assert_eq!(
        client.latest_update().await.unwrap().as_deref(),
        Some("2025-06-01T08:30:00+00:00")
    );
}

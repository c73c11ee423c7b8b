//! Tests for the Notion source client against a mock API.

use serde_json::json;
use sticker_sync::notion::{NotionClient, NOTION_VERSION};
use sticker_sync_core::contract::{Block, PropertyValue, RawRecord, SourceDatabase};
use sticker_sync_core::fetch::fetch_all_records;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> NotionClient {
    NotionClient::new(format!("{}/v1", server.uri()), "secret_token")
}

// ── query_records ────────────────────────────────────────────────────

#[tokio::test]
async fn query_sends_auth_and_version_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(header("Authorization", "Bearer secret_token"))
        .and(header("Notion-Version", NOTION_VERSION))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "page", "id": "page-1"}, {"object": "page", "id": "page-2"}],
            "next_cursor": "cur-2",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client_for(&server)
        .query_records("db-1", None)
        .await
        .unwrap();

    assert_eq!(page.records, vec![RawRecord::new("page-1"), RawRecord::new("page-2")]);
    assert!(page.has_more);
    assert_eq!(page.next_cursor.as_deref(), Some("cur-2"));
}

#[tokio::test]
async fn fetcher_follows_cursors_until_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "page", "id": "a"}, {"object": "page", "id": "b"}],
            "next_cursor": "cur-2",
            "has_more": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(body_json(json!({"start_cursor": "cur-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "page", "id": "c"}],
            "next_cursor": null,
            "has_more": false
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let records = fetch_all_records(&client, "db-1").await.unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn query_error_includes_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .query_records("db-1", None)
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("401") && msg.contains("API token is invalid."), "{msg}");
}

// ── retrieve_property ────────────────────────────────────────────────

#[tokio::test]
async fn retrieves_title_and_scalar_properties() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1/properties/title"))
        .and(header("Authorization", "Bearer secret_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "property_item", "id": "title", "type": "title",
                         "title": {"type": "text", "text": {"content": "Cat"}, "plain_text": "Cat"}}],
            "next_cursor": null,
            "has_more": false,
            "type": "property_item",
            "property_item": {"id": "title", "next_url": null, "type": "title", "title": {}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1/properties/cnt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "property_item", "id": "cnt", "type": "number", "number": 5
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1/properties/exc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "property_item", "id": "exc", "type": "checkbox", "checkbox": false
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(
        client.retrieve_property("page-1", "title").await.unwrap(),
        PropertyValue::Title(vec!["Cat".to_string()])
    );
    assert_eq!(
        client.retrieve_property("page-1", "cnt").await.unwrap(),
        PropertyValue::Number(Some(5.0))
    );
    assert_eq!(
        client.retrieve_property("page-1", "exc").await.unwrap(),
        PropertyValue::Checkbox(false)
    );
}

#[tokio::test]
async fn title_spread_over_pages_is_joined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1/properties/title"))
        .and(query_param_is_missing("start_cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "property_item", "id": "title", "type": "title",
                         "title": {"type": "text", "plain_text": "Sea "}}],
            "next_cursor": "cursor-2",
            "has_more": true,
            "type": "property_item",
            "property_item": {"id": "title", "next_url": null, "type": "title", "title": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/page-1/properties/title"))
        .and(query_param("start_cursor", "cursor-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{"object": "property_item", "id": "title", "type": "title",
                         "title": {"type": "text", "plain_text": "Otter"}}],
            "next_cursor": null,
            "has_more": false,
            "type": "property_item",
            "property_item": {"id": "title", "next_url": null, "type": "title", "title": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client_for(&server)
        .retrieve_property("page-1", "title")
        .await
        .unwrap();
    assert_eq!(
        value,
        PropertyValue::Title(vec!["Sea ".to_string(), "Otter".to_string()])
    );
}

// ── first_block ──────────────────────────────────────────────────────

#[tokio::test]
async fn first_block_requests_a_single_block() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-1/children"))
        .and(query_param("page_size", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "results": [{
                "object": "block", "id": "blk", "type": "image",
                "image": {"caption": [], "type": "file",
                          "file": {"url": "https://s3.example.com/cat.png?sig=1",
                                   "expiry_time": "2026-10-16T12:00:00.000Z"}}
            }],
            "next_cursor": null,
            "has_more": false
        })))
        .mount(&server)
        .await;

    let block = client_for(&server).first_block("page-1").await.unwrap();
    assert_eq!(
        block,
        Some(Block::HostedImage {
            url: "https://s3.example.com/cat.png?sig=1".to_string()
        })
    );
}

#[tokio::test]
async fn first_block_of_empty_page_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list", "results": [], "next_cursor": null, "has_more": false
        })))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).first_block("page-1").await.unwrap(), None);
}

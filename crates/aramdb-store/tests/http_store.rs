//! Integration tests for `HttpCacheStore` using wiremock HTTP mocks.

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aramdb_core::{ChampionData, ChampionRecord, StoreConfig};
use aramdb_store::{CacheEntry, CacheStore, CacheStoreError, HttpCacheStore};

const RECORD_PATH: &str = "/api/collections/data/records/latestaramdata1";

fn store_config(base_url: &str, token: Option<&str>) -> StoreConfig {
    StoreConfig {
        base_url: base_url.to_owned(),
        token: token.map(ToOwned::to_owned),
        collection: "data".to_owned(),
        record_id: "latestaramdata1".to_owned(),
        cache_file: None,
    }
}

fn test_store(server: &MockServer) -> HttpCacheStore {
    HttpCacheStore::new(&store_config(&server.uri(), Some("test-token")), 5)
        .expect("store construction should not fail")
}

fn sample_entry() -> CacheEntry {
    let mut data = ChampionData::new();
    data.insert(
        "266".to_owned(),
        ChampionRecord {
            id: 266,
            name: "Aatrox".to_owned(),
            modes: BTreeMap::new(),
            extended: None,
        },
    );
    CacheEntry {
        data,
        patch_version: Some("V14.1".to_owned()),
        timestamp: 1_700_000_000_000,
    }
}

#[tokio::test]
async fn load_returns_stored_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "latestaramdata1",
            "collectionName": "data",
            "content": {
                "data": { "266": { "id": 266, "name": "Aatrox", "modes": {} } },
                "patchVersion": "V14.1",
                "timestamp": 1_700_000_000_000_i64
            }
        })))
        .mount(&server)
        .await;

    let entry = test_store(&server)
        .load()
        .await
        .expect("load should succeed")
        .expect("entry should exist");

    assert_eq!(entry, sample_entry());
}

#[tokio::test]
async fn load_maps_not_found_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "The requested resource wasn't found."
        })))
        .mount(&server)
        .await;

    assert!(test_store(&server).load().await.unwrap().is_none());
}

#[tokio::test]
async fn load_surfaces_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = test_store(&server).load().await.unwrap_err();
    assert!(
        matches!(err, CacheStoreError::UnexpectedStatus { status: 500, ref body, .. } if body == "boom"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn save_patches_existing_record() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({ "content": { "patchVersion": "V14.1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "latestaramdata1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    test_store(&server)
        .save(&sample_entry())
        .await
        .expect("save should succeed");
}

#[tokio::test]
async fn save_creates_record_when_missing() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/collections/data/records"))
        .and(body_partial_json(json!({
            "id": "latestaramdata1",
            "content": { "timestamp": 1_700_000_000_000_i64 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "latestaramdata1" })))
        .expect(1)
        .mount(&server)
        .await;

    test_store(&server)
        .save(&sample_entry())
        .await
        .expect("save should fall back to create");
}

#[tokio::test]
async fn save_without_token_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(RECORD_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(RECORD_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = HttpCacheStore::new(&store_config(&server.uri(), None), 5).unwrap();
    store.save(&sample_entry()).await.unwrap();
}

#[tokio::test]
async fn health_checks_store_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 200 })))
        .mount(&server)
        .await;

    assert!(test_store(&server).health().await.is_ok());
}

#[tokio::test]
async fn health_reports_unreachable_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = test_store(&server).health().await.unwrap_err();
    assert!(matches!(err, CacheStoreError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn list_records_returns_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/collections/data/records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "perPage": 30,
            "totalItems": 1,
            "totalPages": 1,
            "items": [
                { "id": "latestaramdata1", "created": "2024-01-10 12:00:00.000Z", "updated": "2024-01-11 12:00:00.000Z" }
            ]
        })))
        .mount(&server)
        .await;

    let items = test_store(&server).list_records().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "latestaramdata1");
    assert_eq!(items[0].updated.as_deref(), Some("2024-01-11 12:00:00.000Z"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = HttpCacheStore::new(&store_config("not a url", None), 5);
    assert!(matches!(result, Err(CacheStoreError::InvalidBaseUrl(_))));
}

use super::models::{Value, ValueType};
use super::FirebaseFirestore;
use crate::core::middleware::ApiKeyMiddleware;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DOCS: &str = "/v1/projects/test-project/databases/(default)/documents";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Classification {
    label: String,
    score: f64,
    votes: i64,
}

fn create_db(server: &MockServer) -> FirebaseFirestore {
    let client = ClientBuilder::new(Client::new())
        .with(ApiKeyMiddleware::new("test-api-key", None))
        .build();
    FirebaseFirestore::new_with_client(client, server.url(DOCS))
}

#[tokio::test]
async fn test_get_existing_document() {
    let server = MockServer::start();
    let db = create_db(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/classifications/run-1", DOCS))
            .query_param("key", "test-api-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/databases/(default)/documents/classifications/run-1",
                "fields": {
                    "label": { "stringValue": "cat" },
                    "score": { "doubleValue": 0.93 },
                    "votes": { "integerValue": "12" },
                    "meta": { "mapValue": { "fields": { "model": { "stringValue": "v2" } } } }
                },
                "createTime": "2024-01-01T00:00:00Z",
                "updateTime": "2024-01-02T00:00:00Z"
            }));
    });

    let snapshot = db.doc("classifications/run-1").get().await.unwrap();
    assert!(snapshot.exists());
    assert_eq!(snapshot.id(), "run-1");
    assert_eq!(snapshot.update_time(), Some("2024-01-02T00:00:00Z"));

    #[derive(Deserialize)]
    struct Partial {
        label: String,
        votes: i64,
    }
    let data: Partial = snapshot.data().unwrap().unwrap();
    assert_eq!(data.label, "cat");
    assert_eq!(data.votes, 12);

    let model: Option<String> = snapshot.get_field("meta.model").unwrap();
    assert_eq!(model.as_deref(), Some("v2"));
    let missing: Option<String> = snapshot.get_field("meta.nope").unwrap();
    assert_eq!(missing, None);

    mock.assert();
}

#[tokio::test]
async fn test_get_missing_document() {
    let server = MockServer::start();
    let db = create_db(&server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{}/classifications/none", DOCS));
        then.status(404)
            .header("content-type", "application/json")
            .json_body(json!({ "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" } }));
    });

    let snapshot = db.collection("classifications").doc("none").get().await.unwrap();
    assert!(!snapshot.exists());
    assert_eq!(snapshot.data::<Classification>().unwrap(), None);
}

#[tokio::test]
async fn test_set_document() {
    let server = MockServer::start();
    let db = create_db(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{}/classifications/run-2", DOCS))
            .json_body(json!({
                "fields": {
                    "label": { "stringValue": "dog" },
                    "score": { "doubleValue": 0.5 },
                    "votes": { "integerValue": "3" }
                }
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "name": "projects/test-project/databases/(default)/documents/classifications/run-2" }));
    });

    let value = Classification { label: "dog".to_string(), score: 0.5, votes: 3 };
    db.doc("classifications/run-2").set(&value).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_update_document_with_mask() {
    let server = MockServer::start();
    let db = create_db(&server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{}/classifications/run-2", DOCS))
            .query_param("updateMask.fieldPaths", "votes");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "name": "projects/test-project/databases/(default)/documents/classifications/run-2" }));
    });

    db.doc("classifications/run-2")
        .update(&json!({ "votes": 4 }), Some(&["votes"][..]))
        .await
        .unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_set_rejects_non_object() {
    let server = MockServer::start();
    let db = create_db(&server);

    let err = db.doc("classifications/run-3").set(&vec![1, 2, 3]).await.unwrap_err();
    assert!(matches!(err, super::FirestoreError::SerializationError(_)));
}

#[tokio::test]
async fn test_add_and_delete() {
    let server = MockServer::start();
    let db = create_db(&server);

    let add_mock = server.mock(|when, then| {
        when.method(POST).path(format!("{}/classifications", DOCS));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/databases/(default)/documents/classifications/auto-id",
                "fields": { "label": { "stringValue": "bird" } }
            }));
    });
    let delete_mock = server.mock(|when, then| {
        when.method(DELETE).path(format!("{}/classifications/auto-id", DOCS));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({}));
    });

    let reference = db
        .collection("classifications")
        .add(&json!({ "label": "bird" }))
        .await
        .unwrap();
    assert_eq!(reference.id(), "auto-id");

    reference.delete().await.unwrap();
    add_mock.assert();
    delete_mock.assert();
}

#[tokio::test]
async fn test_list_documents_follows_pages() {
    let server = MockServer::start();
    let db = create_db(&server);

    let second = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/classifications", DOCS))
            .query_param("pageToken", "page-2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "documents": [{ "name": "projects/test-project/databases/(default)/documents/classifications/b" }]
            }));
    });
    let first = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/classifications", DOCS))
            .query_param_missing("pageToken");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "documents": [{ "name": "projects/test-project/databases/(default)/documents/classifications/a" }],
                "nextPageToken": "page-2"
            }));
    });

    let snapshots = db.collection("classifications").list_documents().await.unwrap();
    let ids: Vec<&str> = snapshots.iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);

    first.assert();
    second.assert();
}

#[test]
fn test_value_conversion() {
    let value = Value::from_json(json!({
        "n": null,
        "list": [1, 2.5, "x", true]
    }))
    .unwrap();

    match &value.value_type {
        ValueType::MapValue(map) => {
            assert_eq!(map.fields["n"].value_type, ValueType::NullValue(()));
            match &map.fields["list"].value_type {
                ValueType::ArrayValue(array) => {
                    assert_eq!(array.values[0].value_type, ValueType::IntegerValue("1".to_string()));
                    assert_eq!(array.values[1].value_type, ValueType::DoubleValue(2.5));
                }
                other => panic!("expected array, got {:?}", other),
            }
        }
        other => panic!("expected map, got {:?}", other),
    }

    let json = value.into_json().unwrap();
    assert_eq!(json, json!({ "n": null, "list": [1, 2.5, "x", true] }));
}

#[tokio::test]
async fn test_transport_error_hides_api_key() {
    let api_key = "AIzaSyTransportKey0123456789";
    let client = ClientBuilder::new(Client::new())
        .with(ApiKeyMiddleware::new(api_key, None))
        .build();
    // Nothing listens on port 1.
    let db = FirebaseFirestore::new_with_client(client, format!("http://127.0.0.1:1{}", DOCS));

    let err = db.doc("classifications/run-1").get().await.unwrap_err();

    assert!(matches!(
        err,
        super::FirestoreError::MiddlewareError(_) | super::FirestoreError::RequestError(_)
    ));
    assert!(!err.to_string().contains(api_key), "display: {}", err);
    assert!(!format!("{:?}", err).contains(api_key), "debug: {:?}", err);
}

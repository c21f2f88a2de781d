mod common;

use common::TestEngine;
use http::StatusCode;
use runtime_local::StoreCall;
use serde_json::{json, Value};

#[tokio::test]
async fn upsert() {
    let test = TestEngine::with_documents([]).await;

    let response = test
        .execute(
            r#"mutation { container(input: { id: "a1", city: "Amsterdam", address: "Dam 1", floors: 3 }) { status error id partitionKeyValue address floors } costs }"#,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    insta::assert_json_snapshot!(response.body, @r###"
    {
      "data": {
        "container": {
          "status": true,
          "error": null,
          "id": "a1",
          "partitionKeyValue": "Amsterdam",
          "address": "Dam 1",
          "floors": 3
        },
        "costs": 1.0
      }
    }
    "###);

    assert_eq!(response.metadata.session_token.as_deref(), Some("0:1"));
    assert_eq!(test.store.len().await, 1);
}

#[tokio::test]
async fn upsert_returns_the_stored_document() {
    let test = TestEngine::with_documents([]).await;

    let response = test
        .execute(r#"mutation { container(input: { city: "Amsterdam", address: "Dam 1" }) { id document { id city _etag timestamp } } }"#)
        .await;

    let result = &response.body["data"]["container"];
    let id = result["id"].as_str().unwrap();

    assert!(uuid::Uuid::parse_str(id).is_ok(), "{id}");
    assert_eq!(result["document"]["id"], id);
    assert_eq!(result["document"]["city"], "Amsterdam");
    assert!(result["document"]["_etag"].is_string());
    assert!(result["document"]["timestamp"].is_string());
}

#[tokio::test]
async fn validation_failures_do_not_reach_the_store() {
    let test = TestEngine::with_documents([]).await;

    let cases = [
        ("mutation { container { status error id } }", "No input provided for upsert."),
        ("mutation { container(input: {}) { status error id } }", "No input provided for upsert."),
        (
            r#"mutation { container(input: { address: "Dam 1" }) { status error id } }"#,
            "Partition key (city) is required.",
        ),
        (
            r#"mutation { container(input: { city: "", address: "Dam 1" }) { status error id } }"#,
            "Partition key (city) is required.",
        ),
        (
            r#"mutation { container(input: { id: "a1", city: "Amsterdam", floors: 2 }) { status error id } }"#,
            "Address is required.",
        ),
    ];

    for (query, error) in cases {
        let response = test.execute(query).await;

        assert_eq!(response.status, StatusCode::OK, "{query}");
        assert_eq!(
            response.body["data"]["container"],
            json!({ "status": false, "error": error, "id": null }),
            "{query}"
        );
    }

    assert!(test.store.drain_calls().await.is_empty());
    assert!(test.store.is_empty().await);
}

#[tokio::test]
async fn costs_accumulate_over_the_operation() {
    let test = TestEngine::with_documents([]).await;

    let response = test
        .execute(
            r#"mutation {
                first: container(input: { id: "a1", city: "Amsterdam", address: "Dam 1" }) { status }
                second: container(input: { id: "a2", city: "Amsterdam", address: "Damrak 5" }) { status }
                costs
            }"#,
        )
        .await;

    assert_eq!(response.body["data"]["costs"], json!(2.0));
    assert_eq!(response.metadata.request_charge, 2.0);

    // the second write carries the session token of the first one
    assert_eq!(
        test.store.drain_calls().await,
        [
            StoreCall::UpsertItem {
                id: "a1".into(),
                partition_key: "Amsterdam".into(),
                session_token: None,
            },
            StoreCall::UpsertItem {
                id: "a2".into(),
                partition_key: "Amsterdam".into(),
                session_token: Some("0:1".into()),
            },
        ]
    );
}

#[tokio::test]
async fn session_token_from_the_client_is_forwarded() {
    let test = TestEngine::with_documents([]).await;

    let write = test
        .execute(r#"mutation { container(input: { id: "a1", city: "Amsterdam", address: "Dam 1" }) { status } }"#)
        .await;
    let token = write.metadata.session_token.unwrap();

    let read = test
        .execute_with_session(
            r#"{ container(id: "a1", partitionKeyValue: "Amsterdam") { address } }"#,
            &token,
        )
        .await;

    assert_eq!(read.body["data"]["container"][0]["address"], "Dam 1");

    let calls = test.store.drain_calls().await;
    assert_eq!(
        calls.last(),
        Some(&StoreCall::ReadItem {
            id: "a1".into(),
            partition_key: "Amsterdam".into(),
            session_token: Some(token),
        })
    );
}

#[tokio::test]
async fn upsert_replaces_the_whole_document() {
    let test = TestEngine::with_documents([json!({"id": "a1", "city": "Amsterdam", "address": "Dam 1", "floors": 3})]).await;

    let response = test
        .execute(r#"mutation { container(input: { id: "a1", city: "Amsterdam", address: "Dam 2" }) { status floors } }"#)
        .await;

    assert_eq!(response.body["data"]["container"]["floors"], Value::Null);

    let response = test
        .execute(r#"{ container(id: "a1", partitionKeyValue: "Amsterdam") { address floors } }"#)
        .await;

    assert_eq!(
        response.body["data"]["container"],
        json!([{ "address": "Dam 2", "floors": null }])
    );
    assert_eq!(test.store.len().await, 1);
}

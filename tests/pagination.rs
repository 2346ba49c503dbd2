//! Lazy pagination over continuation tokens

mod common;

use common::{ScriptedTransport, client};
use flasharray_client::ClientError;
use flasharray_client::api::{ApiResult, CallArguments};
use futures::TryStreamExt;
use serde_json::json;

#[tokio::test]
async fn test_walks_every_page_lazily() {
    let transport = ScriptedTransport::new();
    transport
        .push_json(200, json!({
            "continuation_token": "t1",
            "total_item_count": 3,
            "items": [{"name": "vol1"}, {"name": "vol2"}]
        }))
        .push_json(200, json!({"items": [{"name": "vol3"}]}));
    let client = client(&transport);

    let result = client.get_volumes(CallArguments::new().limit(2)).await.unwrap();
    let valid = result.valid().expect("first page should succeed");
    assert_eq!(valid.total_item_count, Some(3));

    let mut pager = valid.into_items().expect("items");
    assert_eq!(transport.calls(), 1);

    assert_eq!(pager.next().await.unwrap().unwrap()["name"], "vol1");
    assert_eq!(pager.next().await.unwrap().unwrap()["name"], "vol2");
    assert_eq!(transport.calls(), 1, "second page must not be fetched early");

    assert_eq!(pager.next().await.unwrap().unwrap()["name"], "vol3");
    assert_eq!(transport.calls(), 2);
    assert!(pager.next().await.unwrap().is_none());
    assert_eq!(pager.pages_fetched(), 2);

    let requests = transport.requests();
    assert_eq!(requests[0].query_param("continuation_token"), None);
    assert_eq!(requests[1].query_param("continuation_token"), Some("t1"));
    assert_eq!(requests[1].query_param("limit"), Some("2"));
    assert_eq!(
        requests[0].header("x-request-id"),
        requests[1].header("x-request-id"),
        "pages of one call share the request id"
    );
}

#[tokio::test]
async fn test_stream_collects_all_items() {
    let transport = ScriptedTransport::new();
    transport
        .push_json(200, json!({"continuation_token": "a", "items": [{"id": "1"}]}))
        .push_json(200, json!({"continuation_token": "b", "items": []}))
        .push_json(200, json!({"items": [{"id": "2"}, {"id": "3"}]}));
    let client = client(&transport);

    let pager = client
        .get_hosts(CallArguments::new())
        .await
        .unwrap()
        .valid()
        .and_then(|valid| valid.into_items())
        .expect("items");

    let items: Vec<_> = pager.into_stream().try_collect().await.unwrap();

    let ids: Vec<_> = items.iter().map(|item| item["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_stops_when_server_reports_no_more_items() {
    let transport = ScriptedTransport::new();
    transport.push_json(200, json!({
        "continuation_token": "stale",
        "more_items_remaining": false,
        "items": [{"name": "pod1"}]
    }));
    let client = client(&transport);

    let pager = client
        .get_pods(CallArguments::new())
        .await
        .unwrap()
        .valid()
        .and_then(|valid| valid.into_items())
        .expect("items");

    assert!(!pager.has_more_pages());
    assert_eq!(pager.collect_all().await.unwrap().len(), 1);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_fatal_page_fetch_is_raised() {
    let transport = ScriptedTransport::new();
    transport
        .push_json(200, json!({"continuation_token": "t1", "items": [{"name": "vol1"}]}))
        .push_json(404, json!({"errors": [{"message": "Continuation token expired."}]}));
    let client = client(&transport);

    let mut pager = client
        .get_volumes(CallArguments::new())
        .await
        .unwrap()
        .valid()
        .and_then(|valid| valid.into_items())
        .expect("items");

    assert!(pager.next().await.unwrap().is_some());
    match pager.next().await {
        Err(ClientError::Pagination(error)) => {
            assert_eq!(error.status_code, 404);
            assert_eq!(error.message(), Some("Continuation token expired."));
        }
        other => panic!("expected a pagination error, got {:?}", other),
    }
    assert!(pager.next().await.unwrap().is_none());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_response_without_items_has_no_pager() {
    let transport = ScriptedTransport::new();
    transport.push_raw(200, &[], "");
    let client = client(&transport);

    let result = client
        .delete_volumes(CallArguments::new().names(vec!["vol1"]))
        .await
        .unwrap();

    match result {
        ApiResult::Valid(valid) => {
            assert_eq!(valid.status_code, 200);
            assert!(valid.items.is_none());
            assert!(valid.continuation_token.is_none());
        }
        ApiResult::Error(error) => panic!("unexpected error {:?}", error),
    }
}

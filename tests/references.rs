//! Reference resolution and parameter preparation on the wire

mod common;

use common::{RecordingSink, ScriptedTransport, client};
use flasharray_client::api::endpoints;
use flasharray_client::api::{CallArguments, FlashArrayClient, Reference};
use serde_json::json;

fn ok_transport() -> std::sync::Arc<ScriptedTransport> {
    let transport = ScriptedTransport::new();
    transport.push_json(200, json!({"items": []}));
    transport
}

#[tokio::test]
async fn test_name_references_become_names_parameter() {
    let transport = ok_transport();
    let client = client(&transport);

    client
        .get_volumes(CallArguments::new().references([Reference::by_name("a"), Reference::by_name("b")]))
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://array.example.com/api/2.17/volumes");
    assert_eq!(request.query_param("names"), Some("a,b"));
    assert_eq!(request.query_param("ids"), None);
}

#[tokio::test]
async fn test_references_replace_explicit_parameters() {
    let transport = ok_transport();
    let client = client(&transport);

    let args = CallArguments::new()
        .names(vec!["stale"])
        .references([Reference::by_id("42")]);
    client.get_volumes(args).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.query_param("ids"), Some("42"));
    assert_eq!(request.query_param("names"), None);
}

#[tokio::test]
async fn test_references_from_server_items() {
    let transport = ok_transport();
    let client = client(&transport);

    let items = [json!({"id": "10", "name": "pg1"}), json!({"id": "11", "name": "pg2"})];
    let groups: Vec<_> = items.iter().filter_map(Reference::from_item).collect();
    client
        .get_protection_groups_volumes(CallArguments::new().group_references(groups))
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://array.example.com/api/2.17/protection-groups/volumes");
    assert_eq!(request.query_param("group_ids"), Some("10,11"));
    assert_eq!(request.query_param("member_names"), None);
}

#[tokio::test]
async fn test_mixed_references_fail_before_any_request() {
    let transport = ok_transport();
    let client = client(&transport);

    let error = client
        .get_volumes(CallArguments::new().references([Reference::by_id("1"), Reference::by_name("")]))
        .await
        .unwrap_err();

    assert!(error.is_validation());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_reference_role_is_rejected() {
    let transport = ok_transport();
    let client = client(&transport);

    let error = client
        .get_volumes(CallArguments::new().member_references([Reference::by_name("host1")]))
        .await
        .unwrap_err();

    assert!(error.is_validation());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn test_scalar_list_parameters_and_request_id() {
    let transport = ok_transport();
    let client = client(&transport);

    let args = CallArguments::new()
        .names("vol1")
        .sort("name-")
        .filter("destroyed='false'")
        .request_id("my-request");
    client.call(endpoints::GET_VOLUMES_SPACE, args).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.url, "https://array.example.com/api/2.17/volumes/space");
    assert_eq!(request.query_param("names"), Some("vol1"));
    assert_eq!(request.query_param("sort"), Some("name-"));
    assert_eq!(request.query_param("filter"), Some("destroyed='false'"));
    assert_eq!(request.header("x-request-id"), Some("my-request"));
}

#[tokio::test]
async fn test_request_id_generated_when_missing() {
    let transport = ok_transport();
    let client = client(&transport);

    client.get_hosts(CallArguments::new().request_id("")).await.unwrap();

    let request = &transport.requests()[0];
    let id = request.header("x-request-id").expect("request id header");
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_scalar_names_emit_one_compat_warning() {
    let transport = ok_transport();
    let sink = RecordingSink::new();
    let client = FlashArrayClient::builder()
        .target("array.example.com")
        .access_token("t0k")
        .transport(transport.clone())
        .event_sink(sink.clone())
        .build()
        .unwrap();

    client
        .call(endpoints::GET_VOLUMES, CallArguments::new().names("vol1"))
        .await
        .unwrap();

    let warnings = sink.named("compat_coercion");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["parameter"], "names");
    assert_eq!(transport.requests()[0].query_param("names"), Some("vol1"));
}

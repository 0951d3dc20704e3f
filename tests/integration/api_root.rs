//! API root parsing and lookup behavior.

use super::test_utils::{
    api_envelope, api_with, init_tracing, FakeClient, API_ROOT_URL, MASTER_TOKEN,
};
use serde_json::json;
use std::sync::Arc;
use stela::{ApiBuilder, Error, NoCache};

#[tokio::test]
async fn test_parses_refs_in_feed_order() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert_eq!(api.refs().len(), 2);
    assert_eq!(api.refs()[0].label, "Master");
    assert_eq!(api.refs()[1].value, "UlfoxUnM0wkXYXbo");
    assert!(!api.refs()[1].is_master);
}

#[tokio::test]
async fn test_master_ref_is_flagged_ref() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert_eq!(api.master_ref().value, MASTER_TOKEN);
    assert!(api.master_ref().is_master);
}

#[tokio::test]
async fn test_first_master_wins_on_duplicates() {
    init_tracing();
    let body = json!({
        "refs": [
            {"id": "a", "ref": "ref30", "label": "label3"},
            {"id": "b", "ref": "ref3", "label": "label3", "isMasterRef": true},
            {"id": "c", "ref": "ref4", "label": "label4", "isMasterRef": true}
        ],
        "forms": {}
    })
    .to_string();
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, body));
    let api = api_with(client).await;

    assert_eq!(api.master_ref().value, "ref3");
}

#[tokio::test]
async fn test_no_master_ref_fails_construction() {
    init_tracing();
    let body = json!({"refs": [], "forms": {}}).to_string();
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, body));
    let result = ApiBuilder::new()
        .client(client)
        .cache(Arc::new(NoCache))
        .fetch(API_ROOT_URL)
        .await;

    assert!(matches!(result, Err(Error::NoMasterFound)));
}

#[tokio::test]
async fn test_ref_lookup_by_label() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert_eq!(
        api.ref_by_label("St-Patrick specials").unwrap().value,
        "UlfoxUnM0wkXYXbo"
    );
    assert!(matches!(
        api.ref_by_label("No such label"),
        Err(Error::RefNotFound(_))
    ));
}

#[tokio::test]
async fn test_bookmarks_and_types_and_tags() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert_eq!(api.bookmarks().len(), 3);
    assert_eq!(api.bookmark("about").unwrap(), "Ue0EDd_mqb8Dhk3j");
    assert!(matches!(
        api.bookmark("nowhere"),
        Err(Error::BookmarkNotFound(_))
    ));

    assert_eq!(api.types().len(), 6);
    assert_eq!(api.types()["blog-post"], "Blog post");
    assert_eq!(api.tags().len(), 4);
    assert!(api.tags().contains(&"Cupcake".to_string()));
}

#[tokio::test]
async fn test_forms_are_parsed_with_fields() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert_eq!(api.forms().len(), 2);
    let search_form = api.form("macarons").unwrap();
    let form = search_form.form();
    assert_eq!(form.name.as_deref(), Some("Macarons"));
    assert_eq!(form.method, "GET");
    assert_eq!(form.enctype, "application/x-www-form-urlencoded");
    assert_eq!(form.action, "http://repo.example.org/api/documents/search");
    assert_eq!(form.field("ref").unwrap().kind, "String");
    assert!(form.field("q").unwrap().multiple);
}

#[tokio::test]
async fn test_search_form_seeds_defaults() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    let search_form = api.form("macarons").unwrap();
    assert_eq!(
        search_form.data(),
        &[
            (
                "q".to_string(),
                "[[any(document.tags, [\"Macaron\"])]]".to_string()
            ),
            ("page".to_string(), "1".to_string()),
            ("pageSize".to_string(), "20".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unknown_form_fails() {
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    let api = api_with(client).await;

    assert!(matches!(api.form("pies"), Err(Error::FormNotFound(_))));
}

#[tokio::test]
async fn test_access_token_is_sent_as_query_parameter() {
    init_tracing();
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, api_envelope()));
    ApiBuilder::new()
        .client(client.clone())
        .cache(Arc::new(NoCache))
        .access_token("sesame")
        .fetch(API_ROOT_URL)
        .await
        .unwrap();

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let url = reqwest::Url::parse(&requests[0]).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("access_token".to_string(), "sesame".to_string())));
}

#[tokio::test]
async fn test_unauthorized_without_token_reports_missing_token() {
    init_tracing();
    let client = Arc::new(FakeClient::new().fail(API_ROOT_URL, 401));
    let result = ApiBuilder::new()
        .client(client)
        .cache(Arc::new(NoCache))
        .fetch(API_ROOT_URL)
        .await;

    match result {
        Err(Error::Auth(message)) => assert_eq!(message, "missing access token"),
        other => panic!("expected auth error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_unauthorized_with_token_reports_invalid_token() {
    init_tracing();
    let client = Arc::new(FakeClient::new().fail(API_ROOT_URL, 403));
    let result = ApiBuilder::new()
        .client(client)
        .cache(Arc::new(NoCache))
        .access_token("expired")
        .fetch(API_ROOT_URL)
        .await;

    match result {
        Err(Error::Auth(message)) => assert_eq!(message, "invalid access token"),
        other => panic!("expected auth error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_server_errors_pass_through_untouched() {
    init_tracing();
    let client = Arc::new(FakeClient::new().fail(API_ROOT_URL, 502));
    let result = ApiBuilder::new()
        .client(client)
        .cache(Arc::new(NoCache))
        .fetch(API_ROOT_URL)
        .await;

    assert!(matches!(result, Err(Error::Status { status: 502, .. })));
}

#[tokio::test]
async fn test_malformed_envelope_is_a_json_error() {
    init_tracing();
    let client = Arc::new(FakeClient::new().respond(API_ROOT_URL, "{not json"));
    let result = ApiBuilder::new()
        .client(client)
        .cache(Arc::new(NoCache))
        .fetch(API_ROOT_URL)
        .await;

    assert!(matches!(result, Err(Error::Json(_))));
}

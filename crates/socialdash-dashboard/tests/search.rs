//! Tests for the debounced search sub-flow.

use std::time::Duration;

use serde_json::json;
use socialdash_client::AnalyticsClient;
use socialdash_core::FilterParameters;
use socialdash_dashboard::{SearchFlow, SearchPhase};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEBOUNCE: Duration = Duration::from_millis(250);

fn flow(server: &MockServer) -> SearchFlow {
    let client = AnalyticsClient::with_base_url(&server.uri(), 30, "socialdash-test/0.1", None)
        .expect("client construction should not fail");
    SearchFlow::new(
        client,
        FilterParameters::new("pirai-infotech").search_scope(),
        DEBOUNCE,
    )
}

async fn mount_results(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/linkedin/posts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn request_keywords(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["keyword"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

#[tokio::test]
async fn rapid_keystrokes_issue_one_request_for_the_last_query() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        json!([{ "id": "p-1", "postTitle": "abc launch", "postType": "image", "productType": "pirai-infotech" }]),
    )
    .await;
    let flow = flow(&server);

    let (a, ab, abc) = tokio::join!(
        flow.input("a"),
        async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            flow.input("ab").await
        },
        async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            flow.input("abc").await
        },
    );

    assert_eq!(a, None);
    assert_eq!(ab, None);
    assert_eq!(abc, Some(SearchPhase::Results));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(request_keywords(&requests), vec!["abc".to_string()]);

    let view = flow.view().await;
    assert_eq!(view.query, "abc");
    assert_eq!(view.results.len(), 1);
}

#[tokio::test]
async fn empty_response_settles_in_empty_phase() {
    let server = MockServer::start().await;
    mount_results(&server, json!([])).await;
    let flow = flow(&server);

    assert_eq!(flow.input("zzz").await, Some(SearchPhase::Empty));
}

#[tokio::test]
async fn search_error_degrades_to_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/linkedin/posts/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let flow = flow(&server);

    assert_eq!(flow.input("hiring").await, Some(SearchPhase::Error));
    let view = flow.view().await;
    assert!(view.results.is_empty());
}

#[tokio::test]
async fn blank_query_clears_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let flow = flow(&server);

    assert_eq!(flow.input("   ").await, Some(SearchPhase::Idle));
    assert_eq!(flow.phase().await, SearchPhase::Idle);
}

#[tokio::test]
async fn selection_toggles_per_id() {
    let server = MockServer::start().await;
    let flow = flow(&server);

    assert!(flow.toggle("p-1").await);
    assert!(flow.toggle("p-2").await);
    assert!(!flow.toggle("p-1").await);

    assert_eq!(flow.selected().await, vec!["p-2".to_string()]);
}

#[tokio::test]
async fn clear_drops_query_results_and_selection() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        json!([{ "id": "p-1", "postTitle": "launch", "postType": "image", "productType": "pirai-infotech" }]),
    )
    .await;
    let flow = flow(&server);

    flow.input("launch").await;
    flow.toggle("p-1").await;
    flow.clear().await;

    let view = flow.view().await;
    assert_eq!(view.phase, SearchPhase::Idle);
    assert!(view.query.is_empty());
    assert!(view.results.is_empty());
    assert!(view.selected.is_empty());
}

#[tokio::test]
async fn scope_change_clears_selection_and_refetches_silently() {
    let server = MockServer::start().await;
    mount_results(
        &server,
        json!([{ "id": 3, "postTitle": "ops", "postType": "video", "productType": "astraops" }]),
    )
    .await;
    let flow = flow(&server);

    flow.input("ops").await;
    flow.toggle("3").await;

    let phase = flow
        .set_scope(FilterParameters::new("astraops").search_scope())
        .await;

    assert_eq!(phase, Some(SearchPhase::Results));
    assert!(flow.selected().await.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let last: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(last["keyword"], "ops");
    assert_eq!(last["productType"], "astraops");
}

#[tokio::test]
async fn scope_change_without_query_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let flow = flow(&server);
    flow.toggle("p-1").await;

    let phase = flow
        .set_scope(FilterParameters::new("g4-guides").search_scope())
        .await;

    assert_eq!(phase, Some(SearchPhase::Idle));
    assert!(flow.selected().await.is_empty());
}

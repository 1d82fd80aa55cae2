//! Integration tests for `AnalyticsClient` using wiremock HTTP mocks.

use chrono::NaiveDate;
use socialdash_client::{AnalyticsClient, ClientError, UploadFile};
use socialdash_core::{DateRange, FilterParameters, PageRequest, TimeSeriesMetric};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AnalyticsClient {
    AnalyticsClient::with_base_url(base_url, 30, "socialdash-test/0.1", None)
        .expect("client construction should not fail")
}

fn march() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
    )
}

#[tokio::test]
async fn tiles_sends_filters_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/dashboard"))
        .and(query_param("productType", "astraops"))
        .and(query_param("startDate", "2025-03-01"))
        .and(query_param("endDate", "2025-03-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "profileViews": { "value": 310, "change": 12.5 },
            "postReach": { "value": "5400", "change": -3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let filters = FilterParameters::new("astraops").with_date_range(Some(march()));
    let tiles = client.tiles(&filters).await.expect("should parse tiles");

    assert_eq!(tiles.0.len(), 2);
    assert_eq!(tiles.get("postReach").unwrap().value.as_f64(), Some(5400.0));
}

#[tokio::test]
async fn base_path_is_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/linkedin/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/api", server.uri()));
    let metrics = client
        .metrics(&FilterParameters::new("astraops"))
        .await
        .expect("should parse metrics");
    assert!(metrics.is_empty());
}

#[tokio::test]
async fn cleared_date_range_is_omitted_from_query_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/linkedin/posts/engagement-table"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "posts": [], "totalPosts": 0 })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let dated = FilterParameters::new("pirai-infotech").with_date_range(Some(march()));
    let cleared = dated.clone().with_date_range(None);

    client.insights(&cleared).await.unwrap();
    client
        .post_page(&cleared, PageRequest::first(10))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        let query = request.url.query().unwrap_or_default();
        assert!(!query.contains("startDate"), "query was {query}");
        assert!(!query.contains("endDate"), "query was {query}");
        let body = String::from_utf8_lossy(&request.body);
        assert!(!body.contains("startDate"), "body was {body}");
        assert!(!body.contains("endDate"), "body was {body}");
    }
}

#[tokio::test]
async fn post_page_sends_offset_and_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/linkedin/posts/engagement-table"))
        .and(body_json(serde_json::json!({
            "productType": "g4-guides",
            "offset": 1,
            "limit": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "posts": [
                { "id": "p-11", "title": "Guide #11", "postType": "article", "impressions": 120 }
            ],
            "totalPosts": 23
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .post_page(
            &FilterParameters::new("g4-guides"),
            PageRequest::first(10).with_number(2),
        )
        .await
        .expect("should parse page");

    assert_eq!(page.total_posts, 23);
    assert_eq!(page.posts[0].id, "p-11");
}

#[tokio::test]
async fn engagement_over_time_adds_metric_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/charts/engagement-over-time"))
        .and(query_param("metric", "impressions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "engagementOverTime": [
                { "date": "2025-03-01", "impressions": 900 },
                { "date": "2025-03-02", "impressions": 1100 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let series = client
        .engagement_over_time(
            &FilterParameters::new("astraops"),
            TimeSeriesMetric::Impressions,
        )
        .await
        .unwrap();

    assert_eq!(series.metric, TimeSeriesMetric::Impressions);
    assert_eq!(series.points.len(), 2);
}

#[tokio::test]
async fn chart_envelopes_are_unwrapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/charts/engagement-by-post-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "engagementByPostTypes": [{ "postType": "video", "engagementRate": "6.1" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/linkedin/charts/clicks-per-post-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "clicksPerPostTypes": null
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let filters = FilterParameters::new("astraops");

    let by_type = client.engagement_by_post_type(&filters).await.unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].post_type, "video");

    let clicks = client.clicks_per_post_type(&filters).await.unwrap();
    assert!(clicks.is_empty());
}

#[tokio::test]
async fn search_posts_posts_keyword_and_scope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/linkedin/posts/search"))
        .and(body_json(serde_json::json!({
            "keyword": "hiring",
            "productType": "pirai-infotech"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 7, "postTitle": "We are hiring", "postType": "image", "productType": "pirai-infotech" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let scope = FilterParameters::new("pirai-infotech").search_scope();
    let results = client.search_posts("hiring", &scope).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "7");
    assert_eq!(results[0].post_title, "We are hiring");
}

#[tokio::test]
async fn null_search_body_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/linkedin/posts/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let scope = FilterParameters::new("astraops").search_scope();
    let results = client.search_posts("nothing", &scope).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn api_error_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/posts/ai-analysis"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "message": "analysis service unavailable",
            "retryAfter": 30
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .ai_analysis(&FilterParameters::new("astraops"))
        .await
        .unwrap_err();

    match &err {
        ClientError::Api {
            status,
            message,
            data,
        } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "analysis service unavailable");
            assert_eq!(data.as_ref().unwrap()["retryAfter"], 30);
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(err.normalized().status, Some(503));
}

#[tokio::test]
async fn api_error_without_body_uses_reason_phrase() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/content-engagement"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .content_engagement(&FilterParameters::new("astraops"))
        .await
        .unwrap_err();

    let normalized = err.normalized();
    assert_eq!(normalized.status, Some(404));
    assert_eq!(normalized.message, "Not Found");
    assert!(normalized.data.is_none());
}

#[tokio::test]
async fn malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .tiles(&FilterParameters::new("astraops"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/linkedin/metrics"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = AnalyticsClient::with_base_url(&server.uri(), 30, "ua", Some("s3cret")).unwrap();
    client
        .metrics(&FilterParameters::new("astraops"))
        .await
        .unwrap();
}

#[tokio::test]
async fn upload_sends_multipart_file_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/linkedin/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "File processed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let file = UploadFile::new("march.csv", b"date,impressions\n2025-03-01,900\n".to_vec());
    let ack = client.upload_file(&file).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("File processed"));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"march.csv\""));
}

#[tokio::test]
async fn upload_rejects_unsupported_file_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .upload_file(&UploadFile::new("notes.txt", b"hello".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidFile { .. }));
}

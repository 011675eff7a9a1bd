//! LeetCode source against a mock Discuss server.

use std::time::Duration;

use leetcode_client::LeetCodeClient;
use salary_scraper::{
    CompanyQuery, DiscussionText, LeetCodeSource, LeetCodeSourceConfig, RetryPolicy, ScrapeError,
    Source, ThreadReference,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source_for(server: &MockServer) -> LeetCodeSource {
    let client = LeetCodeClient::new()
        .expect("client builds")
        .with_base_url(server.uri());
    let config = LeetCodeSourceConfig::default()
        .with_requests_per_second(100)
        .with_discovery_retry(RetryPolicy::fixed(Duration::ZERO, 3))
        .with_retrieval_retry(RetryPolicy::fixed(Duration::ZERO, 3));
    LeetCodeSource::new(client, config)
}

fn post_page(content: &str) -> String {
    let next_data = json!({
        "props": {"pageProps": {"dehydratedState": {"queries": [
            {"state": {"data": {"ugcArticleDiscussionArticle": {"content": content}}}}
        ]}}}
    });
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
        next_data
    )
}

#[tokio::test]
async fn test_discover_searches_lowercase_keyword() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql/"))
        .and(body_partial_json(json!({
            "variables": {"keywords": ["google salary india"], "tagSlugs": ["compensation"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"ugcArticleDiscussionArticles": {
                "totalNum": 1,
                "pageInfo": {"hasNextPage": false},
                "edges": [{"node": {
                    "uuid": "u1", "title": "Google SDE2", "slug": "google-sde2",
                    "summary": null, "topic": {"id": 77}
                }}]
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let threads = source_for(&server)
        .discover(&CompanyQuery::new("Google"))
        .await
        .unwrap();

    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].identifier, "77");
    assert_eq!(threads[0].slug, "google-sde2");
    assert_eq!(threads[0].title.as_deref(), Some("Google SDE2"));
}

#[tokio::test]
async fn test_discover_retries_transient_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql/"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/graphql/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"ugcArticleDiscussionArticles": {
                "totalNum": 0, "pageInfo": {"hasNextPage": false}, "edges": []
            }}
        })))
        .mount(&server)
        .await;

    let threads = source_for(&server)
        .discover(&CompanyQuery::new("Acme"))
        .await
        .unwrap();

    assert!(threads.is_empty());
}

#[tokio::test]
async fn test_discover_does_not_retry_graphql_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "rate limited"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = source_for(&server)
        .discover(&CompanyQuery::new("Acme"))
        .await
        .unwrap_err();

    match err {
        ScrapeError::Discovery {
            source_name,
            message,
        } => {
            assert_eq!(source_name, "leetcode");
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected discovery error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retrieve_retries_challenge_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discuss/post/77/google-sde2"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Just a moment..."))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/discuss/post/77/google-sde2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(post_page("Base: 40L\\nStocks: 20L")))
        .mount(&server)
        .await;

    let text = source_for(&server)
        .retrieve(&ThreadReference::new("77", "google-sde2"))
        .await
        .unwrap();

    assert_eq!(
        text,
        DiscussionText::Found("Base: 40L\nStocks: 20L".to_string())
    );
}

#[tokio::test]
async fn test_retrieve_page_without_content_is_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>moved</body></html>"))
        .mount(&server)
        .await;

    let text = source_for(&server)
        .retrieve(&ThreadReference::new("1", "gone"))
        .await
        .unwrap();

    assert!(text.is_missing());
}

#[tokio::test]
async fn test_retrieve_exhaustion_reports_url_and_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    let err = source_for(&server)
        .retrieve(&ThreadReference::new("9", "blocked"))
        .await
        .unwrap_err();

    match err {
        ScrapeError::RetrievalExhausted { url, attempts, .. } => {
            assert_eq!(url, format!("{}/discuss/post/9/blocked", server.uri()));
            assert_eq!(attempts, 3);
        }
        other => panic!("expected retrieval exhaustion, got {:?}", other),
    }
}

//! Provider clients against an in-process HTTP server on 127.0.0.1.

use axum::{
    Router,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use trade_opportunities::clients::{
    DuckDuckGoSearch, GeminiClient, ModelError, ReportModel, SearchError, SearchProvider,
};

const RESULTS_PAGE: &str = r#"<html><body>
  <div class="result results_links">
    <h2><a class="result__a" href="https://example.com/tea">Tea exports rise</a></h2>
    <a class="result__snippet">Darjeeling shipments up.</a>
  </div>
</body></html>"#;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gemini(base: &str) -> GeminiClient {
    GeminiClient::with_base_url(
        "test-key".into(),
        "gemini-1.5-flash".into(),
        5_000,
        &format!("{base}/v1beta"),
    )
    .unwrap()
}

#[tokio::test]
async fn test_search_posts_query_and_parses_results() {
    let app = Router::new().route(
        "/html/",
        post(|body: String| async move {
            if body.starts_with("q=") {
                (StatusCode::OK, RESULTS_PAGE.to_string())
            } else {
                (StatusCode::BAD_REQUEST, body)
            }
        }),
    );
    let base = serve(app).await;
    let search = DuckDuckGoSearch::with_endpoint(format!("{base}/html/"), 5_000).unwrap();

    let results = search.search("tea sector India 2024", 5).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Tea exports rise");
    assert_eq!(results[0].link, "https://example.com/tea");
}

#[tokio::test]
async fn test_search_non_success_is_status_error() {
    let app = Router::new().route(
        "/html/",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
    );
    let base = serve(app).await;
    let search = DuckDuckGoSearch::with_endpoint(format!("{base}/html/"), 5_000).unwrap();

    let err = search.search("q", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Status { status: 503 }), "{err:?}");
}

#[tokio::test]
async fn test_search_challenge_page_is_parse_error() {
    let app = Router::new().route(
        "/html/",
        post(|| async { "<html><body><form id=\"challenge-form\"></form></body></html>" }),
    );
    let base = serve(app).await;
    let search = DuckDuckGoSearch::with_endpoint(format!("{base}/html/"), 5_000).unwrap();

    let err = search.search("q", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn test_search_connection_failure_is_http_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let search = DuckDuckGoSearch::with_endpoint(format!("http://{addr}/html/"), 2_000).unwrap();

    let err = search.search("q", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Http(_)), "{err:?}");
}

#[tokio::test]
async fn test_gemini_sends_key_and_joins_parts() {
    let app = Router::new().fallback(|headers: HeaderMap| async move {
        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, "missing key".to_string());
        }
        (
            StatusCode::OK,
            r##"{"candidates":[{"content":{"parts":[{"text":"# Report"},{"text":"\nbody"}]},"finishReason":"STOP"}]}"##
                .to_string(),
        )
    });
    let base = serve(app).await;

    let text = gemini(&base).generate("prompt").await.unwrap();
    assert_eq!(text, "# Report\nbody");
}

#[tokio::test]
async fn test_gemini_non_success_carries_status_and_body() {
    let app = Router::new().fallback(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") });
    let base = serve(app).await;

    let err = gemini(&base).generate("prompt").await.unwrap_err();
    match &err {
        ModelError::Status { status, body } => {
            assert_eq!(*status, 429);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "model API error 429: quota exceeded");
}

#[tokio::test]
async fn test_gemini_blank_candidate_is_empty_response() {
    let app = Router::new().fallback(|| async {
        r#"{"candidates":[{"content":{"parts":[{"text":"  "}]},"finishReason":"SAFETY"}]}"#
    });
    let base = serve(app).await;

    let err = gemini(&base).generate("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::EmptyResponse), "{err:?}");
}

#[tokio::test]
async fn test_gemini_malformed_body_is_parse_error() {
    let app = Router::new().fallback(|| async { "not json" });
    let base = serve(app).await;

    let err = gemini(&base).generate("prompt").await.unwrap_err();
    assert!(matches!(err, ModelError::Parse(_)), "{err:?}");
}

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};

use super::support::{StubApp, response_json};

#[tokio::test]
async fn trending_items_are_ranked_by_count() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/trending")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    let items = json["items"].as_array().expect("items array");
    let counts: Vec<u64> = items
        .iter()
        .map(|item| item["count"].as_u64().expect("count"))
        .collect();
    let mut sorted = counts.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(counts, sorted, "items must be ordered by count descending");

    assert!(items[0]["query"].is_string());
    assert!(items[0]["posterUrl"].is_string());
    assert!(items[0]["movieId"].is_u64());
}

#[tokio::test]
async fn trending_honors_limit_parameter() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/trending?limit=1")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["items"].as_array().expect("items array").len(), 1);
}

#[tokio::test]
async fn trending_rejects_out_of_range_limit() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/trending?limit=0")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
}

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};

use super::support::{KNOWN_SESSION, StubApp, response_json};

#[tokio::test]
async fn create_session_returns_created_with_id() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/sessions")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = response_json(response).await;
    assert!(json["sessionId"].is_string());
}

#[tokio::test]
async fn session_view_carries_list_pagination_and_phase() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/v1/sessions/{KNOWN_SESSION}"))
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["page"], 1);
    assert_eq!(json["hasMore"], true);
    assert!(json["errorMessage"].is_null());
    let movies = json["movies"].as_array().expect("movies array");
    assert_eq!(movies[0]["id"], 268);
    assert!(movies[0]["posterPath"].is_string());
}

#[tokio::test]
async fn input_acknowledges_with_accepted() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/sessions/{KNOWN_SESSION}/input"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"text": "batman"}"#))
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = response_json(response).await;
    assert_eq!(json["status"], "accepted");
}

#[tokio::test]
async fn load_more_acknowledges_with_accepted() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/sessions/{KNOWN_SESSION}/load-more"))
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn unknown_session_surfaces_contract_envelope() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/sessions/6f3f5a52-0000-4000-8000-00000000dead")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn malformed_session_id_surfaces_validation_envelope() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/sessions/not-a-uuid")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn oversized_input_surfaces_validation_envelope() {
    let app = StubApp::new();
    let oversized = "x".repeat(300);
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/sessions/{KNOWN_SESSION}/input"))
        .header("content-type", "application/json")
        .body(Body::from(format!(r#"{{"text": "{oversized}"}}"#)))
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn close_session_acknowledges() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/sessions/{KNOWN_SESSION}"))
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "closed");
}

#[tokio::test]
async fn unknown_route_surfaces_contract_envelope() {
    let app = StubApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v2/anything")
        .body(Body::empty())
        .expect("request");

    let response = app.request(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = response_json(response).await;
    assert_eq!(json["error"]["code"], "RESOURCE_NOT_FOUND");
    assert_eq!(json["error"]["message"], "route not found");
}

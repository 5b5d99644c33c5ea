use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, rejection::JsonRejection},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const KNOWN_SESSION: &str = "6f3f5a52-0000-4000-8000-000000000001";

/// Self-contained stub encoding the HTTP contract: status codes, envelope
/// shapes and payload fields the real service must produce.
#[derive(Clone)]
pub struct StubApp {
    router: Router,
}

impl StubApp {
    pub fn new() -> Self {
        Self {
            router: build_router(),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("stub router to respond")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body bytes")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid json payload")
}

fn build_router() -> Router {
    Router::new()
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/{id}", get(session_view).delete(close_session))
        .route("/api/v1/sessions/{id}/input", post(submit_input))
        .route("/api/v1/sessions/{id}/load-more", post(load_more))
        .route("/api/v1/trending", get(trending))
        .fallback(not_found_handler)
}

async fn create_session() -> Response {
    (
        StatusCode::CREATED,
        Json(json!({"sessionId": KNOWN_SESSION})),
    )
        .into_response()
}

async fn session_view(Path(id): Path<String>) -> Response {
    match classify_session(&id) {
        SessionLookup::Invalid => return validation_failed("session id must be a UUID"),
        SessionLookup::Unknown => return session_not_found(),
        SessionLookup::Known => {}
    }

    let payload = json!({
        "searchText": "batman",
        "committedQuery": "batman",
        "phase": "idle",
        "movies": [
            {
                "id": 268,
                "title": "Batman",
                "posterPath": "/cij4dd21v2Rk2YtUQbV5kW69WB2.jpg",
                "voteAverage": 7.2,
                "releaseDate": "1989-06-21",
                "originalLanguage": "en",
                "popularity": 64.6
            }
        ],
        "page": 1,
        "hasMore": true,
        "errorMessage": null
    });

    (StatusCode::OK, Json(payload)).into_response()
}

async fn submit_input(
    Path(id): Path<String>,
    payload: Result<Json<InputRequest>, JsonRejection>,
) -> Response {
    match classify_session(&id) {
        SessionLookup::Invalid => return validation_failed("session id must be a UUID"),
        SessionLookup::Unknown => return session_not_found(),
        SessionLookup::Known => {}
    }

    let Json(request) = match payload {
        Ok(value) => value,
        Err(_) => return validation_failed("invalid JSON payload"),
    };

    if request.text.chars().count() > 256 {
        return validation_failed("search input must be at most 256 characters");
    }

    (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response()
}

async fn load_more(Path(id): Path<String>) -> Response {
    match classify_session(&id) {
        SessionLookup::Invalid => return validation_failed("session id must be a UUID"),
        SessionLookup::Unknown => return session_not_found(),
        SessionLookup::Known => {}
    }

    (StatusCode::ACCEPTED, Json(json!({"status": "accepted"}))).into_response()
}

async fn close_session(Path(id): Path<String>) -> Response {
    match classify_session(&id) {
        SessionLookup::Invalid => validation_failed("session id must be a UUID"),
        SessionLookup::Unknown => session_not_found(),
        SessionLookup::Known => {
            (StatusCode::OK, Json(json!({"status": "closed"}))).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrendingParams {
    limit: Option<usize>,
}

async fn trending(Query(params): Query<TrendingParams>) -> Response {
    let limit = params.limit.unwrap_or(5);
    if limit == 0 || limit > 20 {
        return validation_failed("limit must be between 1 and 20");
    }

    let items: Vec<Value> = [
        ("batman", 42, 268, "Batman"),
        ("alien", 17, 348, "Alien"),
        ("heat", 9, 949, "Heat"),
    ]
    .iter()
    .take(limit)
    .map(|(query, count, movie_id, title)| {
        json!({
            "query": query,
            "count": count,
            "movieId": movie_id,
            "title": title,
            "posterUrl": format!("https://image.tmdb.org/t/p/w500/{movie_id}.jpg"),
            "lastSearchedAt": "2025-01-01T12:00:00Z"
        })
    })
    .collect();

    (StatusCode::OK, Json(json!({"items": items}))).into_response()
}

async fn not_found_handler() -> Response {
    contract_error(
        StatusCode::NOT_FOUND,
        "RESOURCE_NOT_FOUND",
        "route not found",
    )
}

enum SessionLookup {
    Known,
    Unknown,
    Invalid,
}

fn classify_session(id: &str) -> SessionLookup {
    let is_uuid = id.len() == 36 && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    if !is_uuid {
        SessionLookup::Invalid
    } else if id == KNOWN_SESSION {
        SessionLookup::Known
    } else {
        SessionLookup::Unknown
    }
}

fn session_not_found() -> Response {
    contract_error(
        StatusCode::NOT_FOUND,
        "RESOURCE_NOT_FOUND",
        "session not found",
    )
}

fn validation_failed(message: impl Into<String>) -> Response {
    contract_error(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message)
}

fn contract_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": {
            "code": code,
            "message": message.into()
        }
    });

    (status, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
struct InputRequest {
    text: String,
}

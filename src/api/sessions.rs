use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{ApiError, ApiResponse, ApiResult},
    discovery::{SessionHandle, SessionView},
    routes::AppState,
};

const MAX_INPUT_CHARS: usize = 256;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct InputRequest {
    pub text: String,
}

/// Handler for `POST /api/v1/sessions`: spawn a discovery session. The session starts
/// loading the discover feed right away.
pub async fn create_session(State(state): State<AppState>) -> ApiResponse<SessionCreated> {
    let session_id = state
        .sessions
        .create(
            state.catalog.clone(),
            state.journal.clone(),
            state.config.search_debounce,
        )
        .await;

    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// Handler for `GET /api/v1/sessions/{id}`: current view of the session.
pub async fn session_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    let handle = lookup(&state, &id).await?;
    let view = handle
        .view()
        .await
        .map_err(|_| ApiError::not_found("session no longer exists"))?;
    Ok(Json(view))
}

/// Handler for `POST /api/v1/sessions/{id}/input`: submit the raw search box contents.
/// The session commits the value once the quiet period elapses.
pub async fn submit_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<InputRequest>,
) -> ApiResponse<serde_json::Value> {
    if request.text.chars().count() > MAX_INPUT_CHARS {
        return Err(ApiError::bad_request(format!(
            "search input must be at most {MAX_INPUT_CHARS} characters"
        )));
    }

    let handle = lookup(&state, &id).await?;
    handle
        .submit_input(request.text)
        .await
        .map_err(|_| ApiError::not_found("session no longer exists"))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "accepted"})),
    ))
}

/// Handler for `POST /api/v1/sessions/{id}/load-more`: fetch the next result page for
/// the committed query. Ignored by the session while a fetch is in flight.
pub async fn load_more(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<serde_json::Value> {
    let handle = lookup(&state, &id).await?;
    handle
        .load_more()
        .await
        .map_err(|_| ApiError::not_found("session no longer exists"))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"status": "accepted"})),
    ))
}

/// Handler for `DELETE /api/v1/sessions/{id}`: close the session and drop its state.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<serde_json::Value> {
    let id = parse_session_id(&id)?;
    if !state.sessions.remove(id).await {
        return Err(ApiError::not_found("session not found"));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"status": "closed"})),
    ))
}

async fn lookup(state: &AppState, raw_id: &str) -> Result<SessionHandle, ApiError> {
    let id = parse_session_id(raw_id)?;
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found("session not found"))
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::bad_request("session id must be a UUID"))
}

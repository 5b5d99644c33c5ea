use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{ApiError, ApiResult},
    journal::SearchRecord,
    routes::AppState,
};

const DEFAULT_LIMIT: usize = 5;
const MAX_LIMIT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingResponse {
    pub items: Vec<SearchRecord>,
}

/// Handler for `GET /api/v1/trending`: the most searched terms, ranked by count. The
/// frontend fetches this once at mount and hides the section when the list
/// is empty, so there is no error case to surface here.
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> ApiResult<TrendingResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }

    Ok(Json(TrendingResponse {
        items: state.journal.trending(limit),
    }))
}

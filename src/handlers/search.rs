//! Public search over events and tasks.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Local;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    search::{SearchParams, SearchResponse},
    AppState,
};

#[utoipa::path(
    get,
    path = "/search",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching events and tasks", body = SearchResponse),
        (status = 400, description = "Invalid date or role", body = ApiError),
        (status = 500, description = "Search failed", body = ApiError)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let now = Local::now();
    // Public endpoint: no acting user, so no role scoping.
    let criteria = params.into_criteria(&now)?.for_user(None);

    let results = state.search.search(&criteria).await?;

    info!(
        query = criteria.text.as_deref().unwrap_or(""),
        events = results.events.len(),
        tasks = results.tasks.len(),
        "Search served"
    );

    Ok(Json(SearchResponse::assemble(
        &criteria,
        results.events,
        results.tasks,
        &now,
    )))
}

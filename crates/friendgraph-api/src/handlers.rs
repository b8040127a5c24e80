use crate::{ApiError, ApiResult, AppState, CallerIdentity};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use friendgraph_core::{NeighborView, SearchOutcome, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Accepts `?q=` or `?query=`.
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub query: Option<String>,
}

impl SearchParams {
    fn text(&self) -> Option<&str> {
        self.q
            .as_deref()
            .or(self.query.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

pub async fn root() -> &'static str {
    "API running"
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.queries.get_profile(&id).await?;
    Ok(Json(profile))
}

pub async fn get_user_friends(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<NeighborView>>> {
    let friends = state.queries.list_friends(&id).await?;
    Ok(Json(friends))
}

pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<NeighborView>>> {
    let text = params
        .text()
        .ok_or_else(|| ApiError::BadRequest("Missing search query".to_string()))?;
    run_search(&state, text).await
}

pub async fn search_users_by_path(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> ApiResult<Json<Vec<NeighborView>>> {
    run_search(&state, &query).await
}

async fn run_search(state: &AppState, text: &str) -> ApiResult<Json<Vec<NeighborView>>> {
    match state.queries.search_users(text).await? {
        SearchOutcome::Matches(views) => Ok(Json(views)),
        SearchOutcome::Empty => Err(ApiError::NotFound("No users found".to_string())),
    }
}

pub async fn add_remove_friend(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path((id, friend_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<NeighborView>>> {
    info!(
        caller = %caller.user_id,
        user_id = %id,
        friend_id = %friend_id,
        "toggle friendship requested"
    );
    let friends = state
        .relationships
        .toggle_friendship(&id, &friend_id)
        .await?;
    Ok(Json(friends))
}

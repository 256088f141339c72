use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use serde::Serialize;

use encore_core::directory::event_views;
use encore_core::search::{SearchParams, SearchRequest};
use encore_core::CoreError;
use encore_shared::{EventView, PublicUser};

use crate::error::{success, ApiQuery, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    Users(Vec<PublicUser>),
    Events(Vec<EventView>),
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/search/nearest", get(nearest))
}

/// GET /api/search
async fn search(State(state): State<AppState>, ApiQuery(params): ApiQuery<SearchParams>) -> ApiResult<SearchResults> {
    let results = match params.into_search(Utc::now())? {
        SearchRequest::Users(query) => {
            let users = state.repos.users.search_users(&query).await.map_err(CoreError::from)?;
            SearchResults::Users(users.into_iter().map(PublicUser::from).collect())
        }
        SearchRequest::Events(query) => {
            let events = state.repos.events.search_events(&query).await.map_err(CoreError::from)?;
            SearchResults::Events(event_views(&state.repos, events).await?)
        }
    };
    success(results)
}

/// GET /api/search/nearest
async fn nearest(State(state): State<AppState>, ApiQuery(params): ApiQuery<SearchParams>) -> ApiResult<SearchResults> {
    let request = params.into_nearest()?;

    let results = match request.target.account_type() {
        Some(account_type) => {
            let users = state
                .repos
                .users
                .nearest_users(account_type, request.point)
                .await
                .map_err(CoreError::from)?;
            SearchResults::Users(users.into_iter().map(PublicUser::from).collect())
        }
        None => {
            let events = state.repos.events.nearest_events(request.point).await.map_err(CoreError::from)?;
            SearchResults::Events(event_views(&state.repos, events).await?)
        }
    };
    success(results)
}

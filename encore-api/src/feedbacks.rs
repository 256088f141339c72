use axum::{
    extract::State,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use encore_core::review::{self, FeedbackDraft, FeedbackListing};
use encore_core::Actor;
use encore_shared::Feedback;

use crate::error::{success, success_with, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbacksQuery {
    pub author: Option<Uuid>,
    pub receiver: Option<Uuid>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/feedbacks", get(list_feedbacks))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedbacks", post(create_feedback))
        .route("/feedbacks/{id}", delete(delete_feedback))
}

async fn list_feedbacks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FeedbacksQuery>,
) -> ApiResult<FeedbackListing> {
    success(review::listing(&state.repos, query.author, query.receiver).await?)
}

async fn create_feedback(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(draft): ApiJson<FeedbackDraft>,
) -> ApiResult<Feedback> {
    success_with("Thanks for your review", review::submit(&state.repos, &actor, draft).await?)
}

async fn delete_feedback(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    review::withdraw(&state.repos, &actor, id).await?;
    success(())
}

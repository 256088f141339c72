use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use encore_core::directory::require_event;
use encore_core::{review, Actor, CoreError};
use encore_shared::Participation;

use crate::error::{success, ApiPath, ApiQuery, ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationsQuery {
    pub user_id: Option<Uuid>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events/{id}/partecipations/count", get(participants_count))
        .route("/partecipations", get(user_participations))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{id}/partecipations/me",
            get(my_participation).post(join_event).delete(leave_event),
        )
        .route("/events/{id}/qrcode/{code}", post(check_in))
}

async fn my_participation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Option<Participation>> {
    let participation = state
        .repos
        .participations
        .get_participation(id, actor.id)
        .await
        .map_err(CoreError::from)?;
    success(participation)
}

/// Joining twice returns the existing record.
async fn join_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Participation> {
    let event = require_event(&state.repos, id).await?;
    let participation = state
        .repos
        .participations
        .join_event(event.id, actor.id)
        .await
        .map_err(CoreError::from)?;
    debug!("User {} joins event {}", actor.id, event.id);
    success(participation)
}

async fn leave_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    state
        .repos
        .participations
        .leave_event(id, actor.id)
        .await
        .map_err(CoreError::from)?;
    success(())
}

async fn participants_count(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<i64> {
    let count = state
        .repos
        .participations
        .count_participants(id)
        .await
        .map_err(CoreError::from)?;
    success(count)
}

async fn user_participations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ParticipationsQuery>,
) -> ApiResult<Vec<Participation>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::invalid("userId", "userId is required"))?;
    let participations = state
        .repos
        .participations
        .participations_of(user_id)
        .await
        .map_err(CoreError::from)?;
    success(participations)
}

/// POST /api/events/{id}/qrcode/{code}
async fn check_in(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((id, code)): ApiPath<(Uuid, String)>,
) -> ApiResult<Participation> {
    success(review::check_in(&state.repos, &actor, id, &code).await?)
}

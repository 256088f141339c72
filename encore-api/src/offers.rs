use axum::{
    extract::State,
    routing::{get, patch},
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use encore_core::chat::thread_between;
use encore_core::Actor;
use encore_offer::{OfferPatch, OfferView, ProposalInput};

use crate::error::{success, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersQuery {
    pub recipient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOfferQuery {
    pub recipient_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers).post(create_offer))
        .route("/offers/event", get(event_offer))
        .route("/offers/{id}", patch(update_offer))
}

/// GET /api/offers
async fn list_offers(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiQuery(query): ApiQuery<OffersQuery>,
) -> ApiResult<Vec<OfferView>> {
    success(state.offers.list(&actor, query.recipient_id).await?)
}

/// GET /api/offers/event
async fn event_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiQuery(query): ApiQuery<EventOfferQuery>,
) -> ApiResult<Option<OfferView>> {
    success(state.offers.find_for_event(&actor, query.recipient_id, query.event_id).await?)
}

/// POST /api/offers
async fn create_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(input): ApiJson<ProposalInput>,
) -> ApiResult<OfferView> {
    let view = state.offers.propose(&actor, input).await?;
    refresh_thread(&state, &view).await;
    success(view)
}

/// PATCH /api/offers/{id}
async fn update_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<OfferPatch>,
) -> ApiResult<OfferView> {
    let view = state.offers.apply(&actor, id, patch).await?;
    refresh_thread(&state, &view).await;
    success(view)
}

/// Tells the pair's open chat windows to reload. The offer change already
/// happened, so a lookup failure is only logged.
async fn refresh_thread(state: &AppState, view: &OfferView) {
    let (artist, place) = view.pair;
    match thread_between(&state.repos, artist, place).await {
        Ok(Some(conversation)) => {
            state.notifier.publish(conversation, None).await;
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Could not notify about offer {}: {}", view.id, e),
    }
}

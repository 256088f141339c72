use axum::{
    extract::State,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use encore_core::{Actor, CoreError, CoreResult, Validator};
use encore_shared::{AccountType, Location, Stage, Tour, TourView};

use crate::error::{success, success_with, ApiJson, ApiPath, ApiQuery, ApiResult, AppError};
use crate::state::AppState;

const NO_TOUR: &str = "There is not a tour with this id";
const NO_STAGE: &str = "There is not a stage with this id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToursQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourRequest {
    pub name: Option<String>,
    pub start_location: Option<Location>,
    pub end_location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StageRequest {
    pub location: Option<Location>,
    pub date: Option<String>,
    pub offer: Option<Uuid>,
    pub event: Option<Uuid>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/tours", get(list_tours))
        .route("/tours/{id}", get(get_tour))
        .route("/tours/{id}/stages", get(list_stages))
        .route("/tours/{id}/stages/{stage_id}", get(get_stage))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tours", post(create_tour))
        .route("/tours/{id}", patch(edit_tour).delete(delete_tour))
        .route("/tours/{id}/stages", post(create_stage))
        .route("/tours/{id}/stages/{stage_id}", patch(edit_stage).delete(delete_stage))
}

async fn require_tour(state: &AppState, id: Uuid) -> CoreResult<Tour> {
    state
        .repos
        .tours
        .get_tour(id)
        .await?
        .ok_or_else(|| CoreError::not_found(NO_TOUR))
}

async fn require_own_tour(state: &AppState, actor: &Actor, id: Uuid) -> CoreResult<Tour> {
    let tour = require_tour(state, id).await?;
    if tour.artist != actor.id {
        return Err(CoreError::forbidden("You are not the owner of this tour"));
    }
    Ok(tour)
}

async fn require_stage(state: &AppState, tour: &Tour, stage_id: Uuid) -> CoreResult<Stage> {
    match state.repos.tours.get_stage(stage_id).await? {
        Some(stage) if stage.tour == tour.id => Ok(stage),
        _ => Err(CoreError::not_found(NO_STAGE)),
    }
}

async fn with_stages(state: &AppState, tour: Tour) -> CoreResult<TourView> {
    let stages = state.repos.tours.stages_of(tour.id).await?;
    Ok(TourView { tour, stages })
}

/// GET /api/tours?userId
async fn list_tours(State(state): State<AppState>, ApiQuery(query): ApiQuery<ToursQuery>) -> ApiResult<Vec<TourView>> {
    let artist = query
        .user_id
        .ok_or_else(|| AppError::invalid("userId", "userId is required"))?;

    let tours = state.repos.tours.tours_of(artist).await.map_err(CoreError::from)?;
    let mut views = Vec::with_capacity(tours.len());
    for tour in tours {
        views.push(with_stages(&state, tour).await?);
    }
    success(views)
}

async fn get_tour(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<TourView> {
    let tour = require_tour(&state, id).await?;
    success(with_stages(&state, tour).await?)
}

/// POST /api/tours (artists only)
async fn create_tour(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<TourRequest>,
) -> ApiResult<Tour> {
    actor.require(AccountType::Artist)?;

    let mut v = Validator::new();
    let name = v.required("name", req.name.as_deref(), "name is a required field");
    let start = v.present("startLocation", req.start_location, "location is a required field");
    let end = v.present("endLocation", req.end_location, "location is a required field");
    v.finish()?;
    let (Some(name), Some(start_location), Some(end_location)) = (name, start, end) else {
        return Err(AppError::invalid("name", "name is a required field"));
    };

    let tour = Tour {
        id: Uuid::new_v4(),
        artist: actor.id,
        name: name.to_string(),
        start_location,
        end_location,
    };
    state.repos.tours.insert_tour(&tour).await.map_err(CoreError::from)?;
    info!("Tour {} created by artist {}", tour.id, actor.id);
    success(tour)
}

/// PATCH /api/tours/{id}: absent fields keep their value.
async fn edit_tour(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<TourRequest>,
) -> ApiResult<Tour> {
    let mut tour = require_own_tour(&state, &actor, id).await?;

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(AppError::invalid("name", "name is a required field"));
        }
        tour.name = name.trim().to_string();
    }
    if let Some(start) = req.start_location {
        tour.start_location = start;
    }
    if let Some(end) = req.end_location {
        tour.end_location = end;
    }

    if !state.repos.tours.update_tour(&tour).await.map_err(CoreError::from)? {
        return Err(CoreError::not_found(NO_TOUR).into());
    }
    success(tour)
}

async fn delete_tour(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    let tour = require_own_tour(&state, &actor, id).await?;
    state.repos.tours.delete_tour(tour.id).await.map_err(CoreError::from)?;
    success_with("Tour deleted", ())
}

async fn list_stages(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Vec<Stage>> {
    let tour = require_tour(&state, id).await?;
    success(state.repos.tours.stages_of(tour.id).await.map_err(CoreError::from)?)
}

async fn get_stage(State(state): State<AppState>, ApiPath((id, stage_id)): ApiPath<(Uuid, Uuid)>) -> ApiResult<Stage> {
    let tour = require_tour(&state, id).await?;
    success(require_stage(&state, &tour, stage_id).await?)
}

async fn create_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StageRequest>,
) -> ApiResult<Stage> {
    let tour = require_own_tour(&state, &actor, id).await?;

    let mut v = Validator::new();
    let location = v.present("location", req.location, "location is a required field");
    let date = v.instant("date", req.date.as_deref(), "date is a required field");
    v.future("date", date, Utc::now());
    v.finish()?;
    let (Some(location), Some(date)) = (location, date) else {
        return Err(AppError::invalid("date", "date is a required field"));
    };

    let stage = Stage {
        id: Uuid::new_v4(),
        tour: tour.id,
        offer: req.offer,
        event: req.event,
        location,
        date,
    };
    state.repos.tours.insert_stage(&stage).await.map_err(CoreError::from)?;
    success(stage)
}

async fn edit_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((id, stage_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<StageRequest>,
) -> ApiResult<Stage> {
    let tour = require_own_tour(&state, &actor, id).await?;
    let mut stage = require_stage(&state, &tour, stage_id).await?;

    if let Some(raw) = req.date.as_deref() {
        let mut v = Validator::new();
        let date = v.instant("date", Some(raw), "date is a required field");
        v.future("date", date, Utc::now());
        v.finish()?;
        if let Some(date) = date {
            stage.date = date;
        }
    }
    if let Some(location) = req.location {
        stage.location = location;
    }
    if req.offer.is_some() {
        stage.offer = req.offer;
    }
    if req.event.is_some() {
        stage.event = req.event;
    }

    if !state.repos.tours.update_stage(&stage).await.map_err(CoreError::from)? {
        return Err(CoreError::not_found(NO_STAGE).into());
    }
    success(stage)
}

async fn delete_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((id, stage_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let tour = require_own_tour(&state, &actor, id).await?;
    let stage = require_stage(&state, &tour, stage_id).await?;
    state.repos.tours.delete_stage(stage.id).await.map_err(CoreError::from)?;
    success(())
}

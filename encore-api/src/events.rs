use axum::{
    extract::State,
    routing::{get, patch, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use encore_core::directory::{artists_names, event_view, event_views, require_event, require_user};
use encore_core::review::check_in_url;
use encore_core::{Actor, CoreError, CoreResult, Validator};
use encore_shared::{AccountType, Event, EventView, Location};

use crate::error::{success, success_with, ApiJson, ApiPath, ApiQuery, ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub user_type: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub date: Option<String>,
    pub picture: Option<String>,
    #[serde(default)]
    pub typologies: Vec<String>,
    pub price: Option<f64>,
    pub artists: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize)]
pub struct QrCodeResponse {
    pub url: String,
}

#[derive(Debug)]
struct EventFields {
    name: String,
    description: String,
    location: Location,
    date: DateTime<Utc>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/{id}", get(get_event))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", patch(edit_event).delete(delete_event))
        .route("/events/{id}/qrcode", get(event_qrcode))
}

fn validate(req: &EventRequest, now: DateTime<Utc>) -> CoreResult<EventFields> {
    let mut v = Validator::new();
    let name = v.required("name", req.name.as_deref(), "name is a required field");
    let description = v.required("description", req.description.as_deref(), "description is a required field");
    let location = v.present("location", req.location.clone(), "location is a required field");
    let date = v.instant("date", req.date.as_deref(), "date is a required field");
    v.future("date", date, now);
    if let Some(price) = req.price {
        v.check(price.is_finite() && price >= 0.0, "price", "The price must be a non-negative number");
    }
    v.finish()?;

    match (name, description, location, date) {
        (Some(name), Some(description), Some(location), Some(date)) => Ok(EventFields {
            name: name.to_string(),
            description: description.to_string(),
            location,
            date,
        }),
        _ => Err(CoreError::invalid("date", "date is a required field")),
    }
}

async fn require_owned(state: &AppState, actor: &Actor, id: Uuid) -> CoreResult<Event> {
    let event = require_event(&state.repos, id).await?;
    if !event.is_owned_by(actor.id) {
        return Err(CoreError::forbidden("You are not the owner of this event"));
    }
    Ok(event)
}

/// GET /api/events?userType&userId
async fn list_events(State(state): State<AppState>, ApiQuery(query): ApiQuery<EventsQuery>) -> ApiResult<Vec<EventView>> {
    let mut v = Validator::new();
    let kind = match query.user_type.as_deref().map(str::parse::<AccountType>) {
        Some(Ok(kind)) => Some(kind),
        _ => {
            v.error("userType", "Not a valid user type");
            None
        }
    };
    let user_id = v.present("userId", query.user_id, "userId is required");
    v.finish()?;
    let (Some(kind), Some(user_id)) = (kind, user_id) else {
        return Err(AppError::invalid("userId", "userId is required"));
    };

    let events = match kind {
        AccountType::Artist => state.repos.events.events_with_artist(user_id).await,
        AccountType::Place => state.repos.events.events_of_place(user_id).await,
        AccountType::Viewer => {
            let attended = state.repos.participations.participations_of(user_id).await.map_err(CoreError::from)?;
            let ids: Vec<Uuid> = attended.iter().map(|p| p.event).collect();
            state.repos.events.get_events(&ids).await
        }
    }
    .map_err(CoreError::from)?;

    success(event_views(&state.repos, events).await?)
}

async fn get_event(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<EventView> {
    let event = require_event(&state.repos, id).await?;
    success(event_view(&state.repos, event).await?)
}

/// POST /api/events (places only)
async fn create_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<EventRequest>,
) -> ApiResult<EventView> {
    actor.require(AccountType::Place)?;
    let fields = validate(&req, Utc::now())?;
    let place = require_user(&state.repos, actor.id).await?;

    let mut event = Event::new(&place, fields.name, fields.description, fields.date, fields.location);
    event.picture = req.picture;
    event.typologies = req.typologies;
    event.price = req.price;
    state.repos.events.insert_event(&event).await.map_err(CoreError::from)?;

    info!("Event {} created by place {}", event.id, place.id);
    success_with("Event created", event_view(&state.repos, event).await?)
}

/// PATCH /api/events/{id} (owner only)
async fn edit_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EventRequest>,
) -> ApiResult<EventView> {
    let mut event = require_owned(&state, &actor, id).await?;
    let fields = validate(&req, Utc::now())?;
    let place = require_user(&state.repos, actor.id).await?;

    event.name = fields.name;
    event.description = fields.description;
    event.location = fields.location;
    event.date = fields.date;
    event.picture = req.picture;
    event.typologies = req.typologies;
    event.price = req.price;
    event.place_name = place.profile.fullname;
    if let Some(artists) = req.artists {
        let mut unique = Vec::with_capacity(artists.len());
        for artist in artists {
            if !unique.contains(&artist) {
                unique.push(artist);
            }
        }
        event.artists_names = artists_names(&state.repos, &unique).await?;
        event.artists = unique;
    }

    if !state.repos.events.replace_event(&event).await.map_err(CoreError::from)? {
        return Err(CoreError::not_found("There is not an event with this id").into());
    }
    success(event_view(&state.repos, event).await?)
}

async fn delete_event(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    let event = require_owned(&state, &actor, id).await?;
    state.repos.events.delete_event(event.id).await.map_err(CoreError::from)?;
    info!("Event {} deleted by {}", event.id, actor.id);
    success_with("Event deleted", ())
}

/// GET /api/events/{id}/qrcode: the link viewers scan at the venue.
async fn event_qrcode(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<QrCodeResponse> {
    let event = require_owned(&state, &actor, id).await?;
    success(QrCodeResponse {
        url: check_in_url(&state.domain, event.id, &event.qrcode),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(date: &str) -> EventRequest {
        EventRequest {
            name: Some("Jazz night".to_string()),
            description: Some("Quartet".to_string()),
            location: Some(Location::default()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_future_event() {
        let now = Utc::now();
        let date = (now + Duration::days(3)).to_rfc3339();
        let fields = validate(&request(&date), now).unwrap();
        assert_eq!(fields.name, "Jazz night");
    }

    #[test]
    fn test_validate_reports_every_field() {
        let now = Utc::now();
        let err = validate(&EventRequest::default(), now).unwrap_err();
        let CoreError::ValidationError(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["name", "description", "location", "date"]);
    }

    #[test]
    fn test_validate_rejects_past_date_and_negative_price() {
        let now = Utc::now();
        let mut req = request(&(now - Duration::days(1)).to_rfc3339());
        req.price = Some(-5.0);
        let CoreError::ValidationError(fields) = validate(&req, now).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
    }
}

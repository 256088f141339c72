use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Location;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub id: Uuid,
    pub artist: Uuid,
    pub name: String,
    pub start_location: Location,
    pub end_location: Location,
}

/// One stop of a tour, optionally tied to the offer or event that books it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: Uuid,
    pub tour: Uuid,
    pub offer: Option<Uuid>,
    pub event: Option<Uuid>,
    pub location: Location,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TourView {
    #[serde(flatten)]
    pub tour: Tour,
    pub stages: Vec<Stage>,
}

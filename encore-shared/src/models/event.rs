use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Location, PublicUser, User};

pub const PLACEHOLDER_NAME: &str = "New event";
pub const PLACEHOLDER_DESCRIPTION: &str = "Description";
pub const PLACEHOLDER_PICTURE: &str = "http://via.placeholder.com/960x768";

/// A scheduled performance owned by a place.
///
/// `place_name` and `artists_names` copy the referenced profiles so text
/// search never needs a join; they are refreshed on every write that touches
/// the artists or the place profile and are not part of the public JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub artists: Vec<Uuid>,
    pub name: String,
    pub description: String,
    pub picture: Option<String>,
    pub place: Uuid,
    pub date: DateTime<Utc>,
    pub location: Location,
    pub typologies: Vec<String>,
    pub price: Option<f64>,
    #[serde(skip_serializing, default)]
    pub qrcode: String,
    #[serde(skip_serializing, default)]
    pub place_name: String,
    #[serde(skip_serializing, default)]
    pub artists_names: Vec<String>,
}

impl Event {
    pub fn new(place: &User, name: impl Into<String>, description: impl Into<String>, date: DateTime<Utc>, location: Location) -> Self {
        Self {
            id: Uuid::new_v4(),
            artists: Vec::new(),
            name: name.into(),
            description: description.into(),
            picture: None,
            place: place.id,
            date,
            location,
            typologies: Vec::new(),
            price: None,
            qrcode: Uuid::new_v4().simple().to_string(),
            place_name: place.profile.fullname.clone(),
            artists_names: Vec::new(),
        }
    }

    /// Placeholder event created when an offer is accepted by both sides and
    /// did not target an existing event.
    pub fn from_agreement(id: Uuid, place: &User, artist: &User, date: DateTime<Utc>) -> Self {
        let mut event = Self::new(place, PLACEHOLDER_NAME, PLACEHOLDER_DESCRIPTION, date, place.profile.location.clone());
        event.id = id;
        event.picture = Some(PLACEHOLDER_PICTURE.to_string());
        event.typologies = place.profile.typologies.clone();
        event.add_artist(artist);
        event
    }

    /// Adds the artist once; returns false when already listed.
    pub fn add_artist(&mut self, artist: &User) -> bool {
        if self.artists.contains(&artist.id) {
            return false;
        }
        self.artists.push(artist.id);
        self.artists_names.push(artist.profile.fullname.clone());
        true
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.place == user_id
    }
}

/// Event with its artists and place resolved to profiles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: Uuid,
    pub artists: Vec<PublicUser>,
    pub name: String,
    pub description: String,
    pub picture: Option<String>,
    pub place: Option<PublicUser>,
    pub date: DateTime<Utc>,
    pub location: Location,
    pub typologies: Vec<String>,
    pub price: Option<f64>,
}

impl EventView {
    pub fn new(event: Event, artists: Vec<PublicUser>, place: Option<PublicUser>) -> Self {
        Self {
            id: event.id,
            artists,
            name: event.name,
            description: event.description,
            picture: event.picture,
            place,
            date: event.date,
            location: event.location,
            typologies: event.typologies,
            price: event.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{AccountType, GeoPoint};

    fn user(kind: AccountType, name: &str) -> User {
        let mut u = User::new(format!("{}@encore.test", name.to_lowercase()), None);
        u.account_type = Some(kind);
        u.profile.fullname = name.to_string();
        u
    }

    #[test]
    fn test_agreement_event_uses_place_defaults() {
        let mut place = user(AccountType::Place, "Blue Note");
        place.profile.location = Location::new(GeoPoint::new(9.18, 45.48), "Via Borsieri 37");
        place.profile.typologies = vec!["jazz".to_string()];
        let artist = user(AccountType::Artist, "Miles");
        let id = Uuid::new_v4();

        let event = Event::from_agreement(id, &place, &artist, Utc::now());

        assert_eq!(event.id, id);
        assert_eq!(event.place, place.id);
        assert_eq!(event.artists, vec![artist.id]);
        assert_eq!(event.artists_names, vec!["Miles".to_string()]);
        assert_eq!(event.place_name, "Blue Note");
        assert_eq!(event.typologies, vec!["jazz".to_string()]);
        assert_eq!(event.location.address, "Via Borsieri 37");
        assert_eq!(event.name, PLACEHOLDER_NAME);
        assert!(!event.qrcode.is_empty());
    }

    #[test]
    fn test_add_artist_is_set_like() {
        let place = user(AccountType::Place, "Blue Note");
        let artist = user(AccountType::Artist, "Miles");
        let mut event = Event::from_agreement(Uuid::new_v4(), &place, &artist, Utc::now());

        assert!(!event.add_artist(&artist));
        assert_eq!(event.artists.len(), 1);
        assert_eq!(event.artists_names.len(), 1);
    }

    #[test]
    fn test_search_fields_hidden_from_json() {
        let place = user(AccountType::Place, "Blue Note");
        let event = Event::new(&place, "Jam", "Open jam", Utc::now(), Location::default());
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("placeName").is_none());
        assert!(value.get("artistsNames").is_none());
        assert!(value.get("qrcode").is_none());
    }
}

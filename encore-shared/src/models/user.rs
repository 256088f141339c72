use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// The three kinds of account a user can pick after signing up
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccountType {
    Artist,
    Place,
    Viewer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Artist => "Artist",
            AccountType::Place => "Place",
            AccountType::Viewer => "Viewer",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Artist" => Ok(AccountType::Artist),
            "Place" => Ok(AccountType::Place),
            "Viewer" => Ok(AccountType::Viewer),
            other => Err(format!("Not a valid user type: {}", other)),
        }
    }
}

/// One side of a negotiation. Viewers never negotiate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Party {
    Artist,
    Place,
}

impl Party {
    pub fn of(account_type: AccountType) -> Option<Party> {
        match account_type {
            AccountType::Artist => Some(Party::Artist),
            AccountType::Place => Some(Party::Place),
            AccountType::Viewer => None,
        }
    }

    pub fn counterpart(&self) -> Party {
        match self {
            Party::Artist => Party::Place,
            Party::Place => Party::Artist,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Party::Artist => AccountType::Artist,
            Party::Place => AccountType::Place,
        }
    }
}

/// A `[longitude, latitude]` pair, serialized the GeoJSON way.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GeoPoint(pub f64, pub f64);

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat().to_radians(), other.lat().to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng() - self.lng()).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(rename = "type", default = "point_kind")]
    pub kind: String,
    pub coordinates: GeoPoint,
    #[serde(default)]
    pub address: String,
}

fn point_kind() -> String {
    "Point".to_string()
}

impl Location {
    pub fn new(coordinates: GeoPoint, address: impl Into<String>) -> Self {
        Self {
            kind: point_kind(),
            coordinates,
            address: address.into(),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(GeoPoint::default(), "")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub fullname: String,
    pub description: Option<String>,
    #[serde(default)]
    pub location: Location,
    pub picture: Option<String>,
    #[serde(default)]
    pub typologies: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A stored account, credentials included
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    pub facebook: Option<String>,
    pub google: Option<String>,
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash,
            account_type: None,
            facebook: None,
            google: None,
            profile: Profile::default(),
            created_at: Utc::now(),
        }
    }

    pub fn party(&self) -> Option<Party> {
        self.account_type.and_then(Party::of)
    }

    pub fn has_local_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// What other users get to see of an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(rename = "type")]
    pub account_type: Option<AccountType>,
    pub profile: Profile,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            account_type: user.account_type,
            profile: user.profile.clone(),
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            account_type: user.account_type,
            profile: user.profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_of_account_type() {
        assert_eq!(Party::of(AccountType::Artist), Some(Party::Artist));
        assert_eq!(Party::of(AccountType::Place), Some(Party::Place));
        assert_eq!(Party::of(AccountType::Viewer), None);
        assert_eq!(Party::Artist.counterpart(), Party::Place);
    }

    #[test]
    fn test_location_geojson_shape() {
        let json = r#"{"coordinates": [9.19, 45.46], "address": "Milano"}"#;
        let location: Location = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(location.kind, "Point");
        assert_eq!(location.coordinates.lng(), 9.19);

        let value = serde_json::to_value(&location).unwrap();
        assert_eq!(value["coordinates"][1], 45.46);
        assert_eq!(value["type"], "Point");
    }

    #[test]
    fn test_distance_km() {
        let milan = GeoPoint::new(9.19, 45.4642);
        let turin = GeoPoint::new(7.6869, 45.0703);
        let d = milan.distance_km(&turin);
        assert!(d > 120.0 && d < 130.0, "unexpected distance {}", d);
        assert!(milan.distance_km(&milan) < 1e-9);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("a@b.it", Some("secret".to_string()));
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert!(value["type"].is_null());
    }
}

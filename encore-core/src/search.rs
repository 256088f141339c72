use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

use encore_shared::{AccountType, Event, GeoPoint, User};

use crate::validation::Validator;
use crate::CoreResult;

/// Radius of area searches and cut-off of nearest searches.
pub const SEARCH_RADIUS_KM: f64 = 10.0;
/// Cap on user searches and nearest searches.
pub const RESULT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Artist,
    Place,
    Event,
}

impl SearchTarget {
    /// Account type searched for, `None` for events.
    pub fn account_type(&self) -> Option<AccountType> {
        match self {
            SearchTarget::Artist => Some(AccountType::Artist),
            SearchTarget::Place => Some(AccountType::Place),
            SearchTarget::Event => None,
        }
    }
}

impl FromStr for SearchTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Artist" => Ok(SearchTarget::Artist),
            "Place" => Ok(SearchTarget::Place),
            "Event" => Ok(SearchTarget::Event),
            other => Err(format!("The type of search is not valid: {}", other)),
        }
    }
}

/// Raw query string of the search endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub fullname: Option<String>,
    pub lng: Option<String>,
    pub lat: Option<String>,
    pub typologies: Option<String>,
    pub event_place_name: Option<String>,
    pub event_artist_name: Option<String>,
    pub event_date_from: Option<String>,
    pub event_date_to: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSearch {
    pub account_type: AccountType,
    pub terms: Vec<String>,
    pub near: Option<GeoPoint>,
    pub typologies: Vec<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSearch {
    /// Any term may hit the event name, the place name or an artist name.
    pub terms: Vec<String>,
    pub near: Option<GeoPoint>,
    pub typologies: Vec<String>,
    pub from: DateTime<Utc>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    Users(UserSearch),
    Events(EventSearch),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestRequest {
    pub target: SearchTarget,
    pub point: GeoPoint,
}

impl SearchParams {
    fn target(&self, v: &mut Validator) -> Option<SearchTarget> {
        let raw = v.required("type", self.kind.as_deref(), "The type of search is required")?;
        match raw.parse() {
            Ok(target) => Some(target),
            Err(_) => {
                v.error("type", "The type of search is not valid");
                None
            }
        }
    }

    fn point(&self, v: &mut Validator) -> Option<GeoPoint> {
        let (lng, lat) = match (self.lng.as_deref(), self.lat.as_deref()) {
            (Some(lng), Some(lat)) if !lng.trim().is_empty() && !lat.trim().is_empty() => (lng, lat),
            _ => return None,
        };
        let lng = lng.trim().parse::<f64>().ok().filter(|x| x.is_finite());
        let lat = lat.trim().parse::<f64>().ok().filter(|x| x.is_finite());
        v.check(lng.is_some(), "lng", "The longitude must be numeric");
        v.check(lat.is_some(), "lat", "The latitude must be numeric");
        Some(GeoPoint::new(lng?, lat?))
    }

    /// Turns the query string into a typed area search.
    pub fn into_search(self, now: DateTime<Utc>) -> CoreResult<SearchRequest> {
        let mut v = Validator::new();
        let target = self.target(&mut v);
        let near = self.point(&mut v);

        let mut terms = self.fullname.as_deref().map(tokenize).unwrap_or_default();
        let typologies: Vec<String> = self
            .typologies
            .as_deref()
            .map(|t| t.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
            .unwrap_or_default();

        let request = match target {
            Some(SearchTarget::Event) => {
                for name in [&self.event_place_name, &self.event_artist_name].into_iter().flatten() {
                    terms.extend(tokenize(name));
                }

                let from = match self.event_date_from.as_deref() {
                    Some(raw) => v.instant("eventDateFrom", Some(raw), "The date must be in ISO8601 format"),
                    None => Some(now),
                };
                let to = match self.event_date_to.as_deref() {
                    Some(raw) => v.instant("eventDateTo", Some(raw), "The date must be in ISO8601 format").map(end_of_day),
                    None => None,
                };

                from.map(|from| {
                    SearchRequest::Events(EventSearch {
                        terms,
                        near,
                        typologies,
                        from: start_of_day(from),
                        to,
                    })
                })
            }
            Some(target) => target.account_type().map(|account_type| {
                SearchRequest::Users(UserSearch {
                    account_type,
                    terms,
                    near,
                    typologies,
                    limit: RESULT_LIMIT,
                })
            }),
            None => None,
        };

        v.finish()?;
        // every `None` above recorded an error, so finish() already bailed
        request.ok_or_else(|| crate::CoreError::invalid("type", "The type of search is required"))
    }

    pub fn into_nearest(self) -> CoreResult<NearestRequest> {
        let mut v = Validator::new();
        let target = self.target(&mut v);
        v.check(self.lng.as_deref().is_some_and(|s| !s.trim().is_empty()), "lng", "The longitude must be numeric");
        v.check(self.lat.as_deref().is_some_and(|s| !s.trim().is_empty()), "lat", "The latitude must be numeric");
        let point = self.point(&mut v);
        v.finish()?;

        match (target, point) {
            (Some(target), Some(point)) => Ok(NearestRequest { target, point }),
            _ => Err(crate::CoreError::invalid("lng", "The longitude must be numeric")),
        }
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

pub fn start_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.date_naive().and_time(NaiveTime::MIN).and_utc()
}

pub fn end_of_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(instant) + Duration::days(1) - Duration::milliseconds(1)
}

/// Empty `terms` match everything; otherwise any term inside any haystack.
pub fn matches_terms<'a>(terms: &[String], haystacks: impl IntoIterator<Item = &'a str>) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystacks: Vec<String> = haystacks.into_iter().map(str::to_lowercase).collect();
    terms.iter().any(|t| haystacks.iter().any(|h| h.contains(t.as_str())))
}

pub fn overlaps(wanted: &[String], have: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|w| have.contains(w))
}

pub fn within_radius(center: Option<&GeoPoint>, point: &GeoPoint) -> bool {
    center.map_or(true, |c| c.distance_km(point) <= SEARCH_RADIUS_KM)
}

impl UserSearch {
    pub fn matches(&self, user: &User) -> bool {
        user.account_type == Some(self.account_type)
            && matches_terms(&self.terms, [user.profile.fullname.as_str()])
            && within_radius(self.near.as_ref(), &user.profile.location.coordinates)
            && overlaps(&self.typologies, &user.profile.typologies)
    }
}

impl EventSearch {
    pub fn matches(&self, event: &Event) -> bool {
        let haystacks = [event.name.as_str(), event.place_name.as_str()]
            .into_iter()
            .chain(event.artists_names.iter().map(String::as_str));

        matches_terms(&self.terms, haystacks)
            && within_radius(self.near.as_ref(), &event.location.coordinates)
            && overlaps(&self.typologies, &event.typologies)
            && event.date >= self.from
            && self.to.map_or(true, |to| event.date <= to)
    }
}

/// Sorts by distance from `point`, dropping anything past the radius.
pub fn nearest_first<T>(items: Vec<T>, point: &GeoPoint, coords: impl Fn(&T) -> GeoPoint) -> Vec<T> {
    let mut scored: Vec<(f64, T)> = items
        .into_iter()
        .map(|item| (point.distance_km(&coords(&item)), item))
        .filter(|(d, _)| *d <= SEARCH_RADIUS_KM)
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().take(RESULT_LIMIT).map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;
    use chrono::TimeZone;
    use encore_shared::Location;

    fn params(kind: &str) -> SearchParams {
        SearchParams {
            kind: Some(kind.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_user_search_translation() {
        let mut p = params("Artist");
        p.fullname = Some("Miles Davis".to_string());
        p.lng = Some("9.19".to_string());
        p.lat = Some("45.46".to_string());
        p.typologies = Some("jazz, blues".to_string());

        match p.into_search(Utc::now()).unwrap() {
            SearchRequest::Users(s) => {
                assert_eq!(s.account_type, AccountType::Artist);
                assert_eq!(s.terms, vec!["miles", "davis"]);
                assert_eq!(s.near, Some(GeoPoint::new(9.19, 45.46)));
                assert_eq!(s.typologies, vec!["jazz", "blues"]);
                assert_eq!(s.limit, RESULT_LIMIT);
            }
            other => panic!("expected user search, got {:?}", other),
        }
    }

    #[test]
    fn test_event_search_merges_name_terms_and_bounds_days() {
        let now = Utc.with_ymd_and_hms(2030, 1, 10, 15, 0, 0).unwrap();
        let mut p = params("Event");
        p.fullname = Some("jam".to_string());
        p.event_place_name = Some("Blue Note".to_string());
        p.event_artist_name = Some("Miles".to_string());
        p.event_date_to = Some("2030-01-20".to_string());

        match p.into_search(now).unwrap() {
            SearchRequest::Events(s) => {
                assert_eq!(s.terms, vec!["jam", "blue", "note", "miles"]);
                assert_eq!(s.from, Utc.with_ymd_and_hms(2030, 1, 10, 0, 0, 0).unwrap());
                let to = s.to.unwrap();
                assert_eq!(to.date_naive(), Utc.with_ymd_and_hms(2030, 1, 20, 0, 0, 0).unwrap().date_naive());
                assert!(to > Utc.with_ymd_and_hms(2030, 1, 20, 23, 59, 59).unwrap());
            }
            other => panic!("expected event search, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_search_params() {
        assert!(matches!(SearchParams::default().into_search(Utc::now()), Err(CoreError::ValidationError(_))));
        assert!(matches!(params("Viewer").into_search(Utc::now()), Err(CoreError::ValidationError(_))));

        let mut p = params("Place");
        p.lng = Some("east".to_string());
        p.lat = Some("45".to_string());
        match p.into_search(Utc::now()) {
            Err(CoreError::ValidationError(errors)) => assert_eq!(errors[0].field, "lng"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_nearest_requires_coordinates() {
        assert!(params("Place").into_nearest().is_err());

        let mut p = params("Place");
        p.lng = Some("9.1".to_string());
        p.lat = Some("45.4".to_string());
        let req = p.into_nearest().unwrap();
        assert_eq!(req.target, SearchTarget::Place);
    }

    #[test]
    fn test_user_search_matches() {
        let mut user = User::new("m@encore.test", None);
        user.account_type = Some(AccountType::Artist);
        user.profile.fullname = "Miles Davis".to_string();
        user.profile.location = Location::new(GeoPoint::new(9.19, 45.46), "Milano");
        user.profile.typologies = vec!["jazz".to_string()];

        let mut search = UserSearch {
            account_type: AccountType::Artist,
            terms: vec!["davis".to_string()],
            near: Some(GeoPoint::new(9.20, 45.47)),
            typologies: vec!["jazz".to_string(), "rock".to_string()],
            limit: RESULT_LIMIT,
        };
        assert!(search.matches(&user));

        search.near = Some(GeoPoint::new(7.68, 45.07));
        assert!(!search.matches(&user));

        search.near = None;
        search.account_type = AccountType::Place;
        assert!(!search.matches(&user));
    }

    #[test]
    fn test_nearest_first_orders_and_cuts() {
        let origin = GeoPoint::new(9.19, 45.46);
        let points = vec![GeoPoint::new(9.25, 45.46), GeoPoint::new(9.19, 45.461), GeoPoint::new(12.49, 41.9)];
        let sorted = nearest_first(points, &origin, |p| *p);
        assert_eq!(sorted, vec![GeoPoint::new(9.19, 45.461), GeoPoint::new(9.25, 45.46)]);
    }
}

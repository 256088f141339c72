use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use encore_core::{CoreError, CoreResult, Validator};
use encore_shared::{Event, Offer, PublicUser};

use crate::proposal::{read_terms, Terms};

/// Body of `PATCH /api/offers/{id}`
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    pub action: Option<String>,
    pub price: Option<serde_json::Value>,
    pub date: Option<String>,
    pub event: Option<Uuid>,
    pub decline_reason: Option<String>,
}

/// A validated mutation of an existing offer
#[derive(Debug, Clone, PartialEq)]
pub enum OfferAction {
    Edit(Terms),
    Accept,
    Decline { reason: String },
}

impl OfferPatch {
    pub fn accept() -> Self {
        Self {
            action: Some("accept".to_string()),
            ..Default::default()
        }
    }

    pub fn decline(reason: &str) -> Self {
        Self {
            action: Some("decline".to_string()),
            decline_reason: Some(reason.to_string()),
            ..Default::default()
        }
    }

    /// Resolves the `action` discriminator and checks the fields that action
    /// needs. Nothing is written before this succeeds.
    pub fn into_action(self, now: DateTime<Utc>) -> CoreResult<OfferAction> {
        match self.action.as_deref().map(str::trim) {
            Some("edit") => {
                let mut v = Validator::new();
                let terms = read_terms(&mut v, self.price.as_ref(), self.date.as_deref(), self.event, now);
                v.finish()?;
                terms
                    .map(OfferAction::Edit)
                    .ok_or_else(|| CoreError::invalid("offer", "The offer terms are not valid"))
            }
            Some("accept") => Ok(OfferAction::Accept),
            Some("decline") => {
                let mut v = Validator::new();
                let reason = v
                    .required("declineReason", self.decline_reason.as_deref(), "The decline reason must be specified")
                    .map(str::to_string);
                v.finish()?;
                reason
                    .map(|reason| OfferAction::Decline { reason })
                    .ok_or_else(|| CoreError::invalid("declineReason", "The decline reason must be specified"))
            }
            other => Err(CoreError::InvalidActionError(other.unwrap_or_default().to_string())),
        }
    }
}

/// An offer with its event and both parties resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferView {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub event: Option<Event>,
    pub artist: Option<PublicUser>,
    pub place: Option<PublicUser>,
    pub artist_accept_date: Option<DateTime<Utc>>,
    pub place_accept_date: Option<DateTime<Utc>>,
    pub decline_author: Option<Uuid>,
    pub decline_date: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub pair: (Uuid, Uuid),
}

impl OfferView {
    pub fn new(offer: Offer, event: Option<Event>, artist: Option<PublicUser>, place: Option<PublicUser>) -> Self {
        Self {
            id: offer.id,
            date: offer.date,
            price: offer.price,
            event,
            artist,
            place,
            artist_accept_date: offer.artist_accept_date,
            place_accept_date: offer.place_accept_date,
            decline_author: offer.decline_author,
            decline_date: offer.decline_date,
            decline_reason: offer.decline_reason,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
            pair: (offer.artist, offer.place),
        }
    }

    pub fn is_fully_accepted(&self) -> bool {
        self.artist_accept_date.is_some() && self.place_accept_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn patch(action: &str) -> OfferPatch {
        OfferPatch {
            action: Some(action.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let err = patch("cancel").into_action(Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidActionError(ref a) if a == "cancel"));

        let err = OfferPatch::default().into_action(Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidActionError(_)));
    }

    #[test]
    fn test_decline_needs_reason() {
        let mut p = patch("decline");
        p.decline_reason = Some("   ".to_string());
        assert!(matches!(p.into_action(Utc::now()), Err(CoreError::ValidationError(_))));

        let action = OfferPatch::decline("Schedule conflict").into_action(Utc::now()).unwrap();
        assert_eq!(
            action,
            OfferAction::Decline {
                reason: "Schedule conflict".to_string()
            }
        );
    }

    #[test]
    fn test_edit_revalidates_terms() {
        let now = Utc::now();
        let mut p = patch("edit");
        p.price = Some(serde_json::json!(500));
        p.date = Some((now - Duration::days(1)).to_rfc3339());
        assert!(matches!(p.clone().into_action(now), Err(CoreError::ValidationError(_))));

        p.date = Some((now + Duration::days(1)).to_rfc3339());
        match p.into_action(now).unwrap() {
            OfferAction::Edit(terms) => assert_eq!(terms.price, 500.0),
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_accept_needs_nothing_else() {
        assert_eq!(OfferPatch::accept().into_action(Utc::now()).unwrap(), OfferAction::Accept);
    }
}

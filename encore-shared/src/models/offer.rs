use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::Party;

/// The acceptance timestamp a party writes when accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceSlot {
    ArtistAcceptDate,
    PlaceAcceptDate,
}

impl AcceptanceSlot {
    pub fn for_party(party: Party) -> Self {
        match party {
            Party::Artist => AcceptanceSlot::ArtistAcceptDate,
            Party::Place => AcceptanceSlot::PlaceAcceptDate,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            AcceptanceSlot::ArtistAcceptDate => "artist_accept_date",
            AcceptanceSlot::PlaceAcceptDate => "place_accept_date",
        }
    }
}

/// A negotiation between exactly one artist and one place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub price: f64,
    pub event: Option<Uuid>,
    pub artist: Uuid,
    pub place: Uuid,
    pub artist_accept_date: Option<DateTime<Utc>>,
    pub place_accept_date: Option<DateTime<Utc>>,
    pub decline_author: Option<Uuid>,
    pub decline_date: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// The proposer takes the slot of its own party, the recipient the other one.
    pub fn propose(
        proposer: Party,
        proposer_id: Uuid,
        recipient_id: Uuid,
        date: DateTime<Utc>,
        price: f64,
        event: Option<Uuid>,
    ) -> Self {
        let (artist, place) = match proposer {
            Party::Artist => (proposer_id, recipient_id),
            Party::Place => (recipient_id, proposer_id),
        };
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            date,
            price,
            event,
            artist,
            place,
            artist_accept_date: None,
            place_accept_date: None,
            decline_author: None,
            decline_date: None,
            decline_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn party_id(&self, party: Party) -> Uuid {
        match party {
            Party::Artist => self.artist,
            Party::Place => self.place,
        }
    }

    /// Which side of this offer the given user sits on, if any.
    pub fn party_of(&self, user_id: Uuid) -> Option<Party> {
        if self.artist == user_id {
            Some(Party::Artist)
        } else if self.place == user_id {
            Some(Party::Place)
        } else {
            None
        }
    }

    pub fn acceptance(&self, slot: AcceptanceSlot) -> Option<DateTime<Utc>> {
        match slot {
            AcceptanceSlot::ArtistAcceptDate => self.artist_accept_date,
            AcceptanceSlot::PlaceAcceptDate => self.place_accept_date,
        }
    }

    pub fn is_fully_accepted(&self) -> bool {
        self.artist_accept_date.is_some() && self.place_accept_date.is_some()
    }

    pub fn is_declined(&self) -> bool {
        self.decline_date.is_some()
    }

    /// Stamps the party's acceptance. Returns false when it was already set.
    pub fn accept(&mut self, party: Party, at: DateTime<Utc>) -> bool {
        let slot = match AcceptanceSlot::for_party(party) {
            AcceptanceSlot::ArtistAcceptDate => &mut self.artist_accept_date,
            AcceptanceSlot::PlaceAcceptDate => &mut self.place_accept_date,
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(at);

        self.decline_author = None;
        self.decline_date = None;
        self.decline_reason = None;
        self.updated_at = at;
        true
    }

    pub fn decline(&mut self, author: Uuid, reason: impl Into<String>, at: DateTime<Utc>) {
        self.artist_accept_date = None;
        self.place_accept_date = None;
        self.decline_author = Some(author);
        self.decline_date = Some(at);
        self.decline_reason = Some(reason.into());
        self.updated_at = at;
    }

    /// Replaces the negotiated terms. An event link, once set, is kept.
    pub fn revise(&mut self, date: DateTime<Utc>, price: f64, event: Option<Uuid>) {
        self.date = date;
        self.price = price;
        self.event = self.event.or(event);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(proposer: Party) -> (Offer, Uuid, Uuid) {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let offer = Offer::propose(proposer, me, other, Utc::now() + Duration::days(3), 1000.0, None);
        (offer, me, other)
    }

    #[test]
    fn test_proposer_takes_own_slot() {
        let (offer, me, other) = sample(Party::Artist);
        assert_eq!(offer.artist, me);
        assert_eq!(offer.place, other);

        let (offer, me, other) = sample(Party::Place);
        assert_eq!(offer.place, me);
        assert_eq!(offer.artist, other);
        assert_eq!(offer.party_of(me), Some(Party::Place));
        assert_eq!(offer.party_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_full_acceptance_needs_both_parties() {
        let (mut offer, _, _) = sample(Party::Artist);
        assert!(offer.accept(Party::Place, Utc::now()));
        assert!(!offer.is_fully_accepted());
        assert!(offer.accept(Party::Artist, Utc::now()));
        assert!(offer.is_fully_accepted());
    }

    #[test]
    fn test_second_accept_keeps_first_timestamp() {
        let (mut offer, _, _) = sample(Party::Artist);
        let first = Utc::now() - Duration::minutes(5);
        assert!(offer.accept(Party::Artist, first));
        assert!(!offer.accept(Party::Artist, Utc::now()));
        assert_eq!(offer.artist_accept_date, Some(first));
    }

    #[test]
    fn test_decline_clears_acceptance() {
        let (mut offer, _, place) = sample(Party::Artist);
        offer.accept(Party::Artist, Utc::now());
        offer.accept(Party::Place, Utc::now());

        offer.decline(place, "Schedule conflict", Utc::now());

        assert!(offer.artist_accept_date.is_none());
        assert!(offer.place_accept_date.is_none());
        assert_eq!(offer.decline_author, Some(place));
        assert_eq!(offer.decline_reason.as_deref(), Some("Schedule conflict"));
        assert!(offer.is_declined());
    }

    #[test]
    fn test_revise_keeps_event_link() {
        let (mut offer, _, _) = sample(Party::Artist);
        let event = Uuid::new_v4();
        offer.revise(offer.date, 900.0, Some(event));
        assert_eq!(offer.event, Some(event));

        offer.revise(offer.date, 1200.0, None);
        assert_eq!(offer.event, Some(event));
        assert_eq!(offer.price, 1200.0);
    }

    #[test]
    fn test_slot_columns() {
        assert_eq!(AcceptanceSlot::for_party(Party::Artist).column(), "artist_accept_date");
        assert_eq!(AcceptanceSlot::for_party(Party::Place).column(), "place_accept_date");
    }
}

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use encore_core::directory::{public, require_user, user_index};
use encore_core::{Actor, CoreError, CoreResult, Repositories, Validator};
use encore_shared::{AcceptanceSlot, Event, Offer, Party};

use crate::models::{OfferAction, OfferPatch, OfferView};
use crate::proposal::{ProposalInput, Terms};

const NO_OFFER: &str = "There is not an offer with this id";

/// Negotiation between one artist and one place, up to the event it produces.
#[derive(Clone)]
pub struct OfferWorkflow {
    repos: Repositories,
}

impl OfferWorkflow {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Offers the actor takes part in, by date, optionally narrowed to one counterparty.
    pub async fn list(&self, actor: &Actor, counterparty: Option<Uuid>) -> CoreResult<Vec<OfferView>> {
        let party = actor.party()?;
        let offers = self.repos.offers.list_offers(party, actor.id, counterparty).await?;
        self.populate_many(offers).await
    }

    /// The offer between the actor and `recipient` that targets `event`, if any.
    pub async fn find_for_event(
        &self,
        actor: &Actor,
        recipient: Option<Uuid>,
        event: Option<Uuid>,
    ) -> CoreResult<Option<OfferView>> {
        let party = actor.party()?;
        let mut v = Validator::new();
        let recipient = v.present("recipientId", recipient, "The recipient must be specified");
        let event = v.present("eventId", event, "The event must be specified");
        v.finish()?;
        let (Some(recipient), Some(event)) = (recipient, event) else {
            return Ok(None);
        };

        match self.repos.offers.find_event_offer(party, actor.id, recipient, event).await? {
            Some(offer) => Ok(Some(self.populate(offer).await?)),
            None => Ok(None),
        }
    }

    pub async fn propose(&self, actor: &Actor, input: ProposalInput) -> CoreResult<OfferView> {
        let party = actor.party()?;
        let proposal = input.validate(Utc::now())?;

        let recipient = require_user(&self.repos, proposal.recipient).await?;
        if recipient.party() != Some(party.counterpart()) {
            return Err(CoreError::invalid(
                "recipientId",
                format!("The recipient must be a {}", party.counterpart().account_type()),
            ));
        }

        let offer = Offer::propose(
            party,
            actor.id,
            recipient.id,
            proposal.terms.date,
            proposal.terms.price,
            proposal.terms.event,
        );
        self.check_event_target(&offer, offer.event).await?;
        self.repos.offers.insert_offer(&offer).await?;

        info!("Offer {} proposed by {} {} to {}", offer.id, party.account_type(), actor.id, recipient.id);
        self.populate(offer).await
    }

    /// Single mutation entry point keyed by the `action` discriminator.
    pub async fn apply(&self, actor: &Actor, offer_id: Uuid, patch: OfferPatch) -> CoreResult<OfferView> {
        match patch.into_action(Utc::now())? {
            OfferAction::Edit(terms) => self.edit(actor, offer_id, terms).await,
            OfferAction::Accept => self.accept(actor, offer_id).await,
            OfferAction::Decline { reason } => self.decline(actor, offer_id, &reason).await,
        }
    }

    pub async fn edit(&self, actor: &Actor, offer_id: Uuid, terms: Terms) -> CoreResult<OfferView> {
        let (offer, _) = self.load_as_party(actor, offer_id).await?;
        // a linked event stays linked
        if let (Some(linked), Some(requested)) = (offer.event, terms.event) {
            if linked != requested {
                return Err(CoreError::invalid("event", "The offer is already linked to an event"));
            }
        }
        self.check_event_target(&offer, terms.event).await?;

        let offer = self
            .repos
            .offers
            .revise_offer(offer.id, terms.date, terms.price, terms.event)
            .await?
            .ok_or_else(|| CoreError::not_found(NO_OFFER))?;
        self.populate(offer).await
    }

    /// Stamps the actor's acceptance. The first call that sees both parties
    /// accepted links the offer to an event.
    pub async fn accept(&self, actor: &Actor, offer_id: Uuid) -> CoreResult<OfferView> {
        let (_, party) = self.load_as_party(actor, offer_id).await?;

        let offer = self
            .repos
            .offers
            .stamp_acceptance(offer_id, AcceptanceSlot::for_party(party), Utc::now())
            .await?
            .ok_or_else(|| CoreError::not_found(NO_OFFER))?;

        if !offer.is_fully_accepted() {
            return self.populate(offer).await;
        }

        let offer = match offer.event {
            Some(event_id) => {
                self.join_event(&offer, event_id).await?;
                offer
            }
            None => self.materialize_event(offer).await?,
        };
        self.populate(offer).await
    }

    pub async fn decline(&self, actor: &Actor, offer_id: Uuid, reason: &str) -> CoreResult<OfferView> {
        self.load_as_party(actor, offer_id).await?;

        let offer = self
            .repos
            .offers
            .decline_offer(offer_id, actor.id, reason, Utc::now())
            .await?
            .ok_or_else(|| CoreError::not_found(NO_OFFER))?;

        info!("Offer {} declined by {}", offer.id, actor.id);
        self.populate(offer).await
    }

    async fn load_as_party(&self, actor: &Actor, offer_id: Uuid) -> CoreResult<(Offer, Party)> {
        actor.party()?;
        let offer = self
            .repos
            .offers
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found(NO_OFFER))?;

        match offer.party_of(actor.id) {
            Some(party) => Ok((offer, party)),
            None => Err(CoreError::forbidden("You are not a party of this offer")),
        }
    }

    /// A targeted event has to exist and belong to the offer's place.
    async fn check_event_target(&self, offer: &Offer, event: Option<Uuid>) -> CoreResult<()> {
        let Some(event_id) = event else {
            return Ok(());
        };
        match self.repos.events.get_event(event_id).await? {
            Some(event) if event.is_owned_by(offer.place) => Ok(()),
            Some(_) => Err(CoreError::invalid("event", "The event must belong to the place of the offer")),
            None => Err(CoreError::invalid("event", "There is not an event with this id")),
        }
    }

    async fn join_event(&self, offer: &Offer, event_id: Uuid) -> CoreResult<()> {
        let artist = require_user(&self.repos, offer.artist).await?;
        let joined = self
            .repos
            .events
            .add_artist(event_id, artist.id, &artist.profile.fullname)
            .await?;
        if joined.is_none() {
            warn!("Offer {} targets event {} which no longer exists", offer.id, event_id);
        }
        Ok(())
    }

    /// Claims the offer's event link before inserting, so racing accepts
    /// create at most one event.
    async fn materialize_event(&self, offer: Offer) -> CoreResult<Offer> {
        let place = require_user(&self.repos, offer.place).await?;
        let artist = require_user(&self.repos, offer.artist).await?;

        let event_id = Uuid::new_v4();
        if !self.repos.offers.claim_event(offer.id, event_id).await? {
            info!("Offer {} already has its event, skipping creation", offer.id);
            return self.reload(offer.id).await;
        }

        let event = Event::from_agreement(event_id, &place, &artist, offer.date);
        if let Err(err) = self.repos.events.insert_event(&event).await {
            if let Err(release_err) = self.repos.offers.release_event(offer.id, event_id).await {
                warn!("Could not release event claim on offer {}: {}", offer.id, release_err);
            }
            return Err(err.into());
        }

        info!("Event {} created from offer {}", event_id, offer.id);
        self.reload(offer.id).await
    }

    async fn reload(&self, offer_id: Uuid) -> CoreResult<Offer> {
        self.repos
            .offers
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| CoreError::not_found(NO_OFFER))
    }

    async fn populate(&self, offer: Offer) -> CoreResult<OfferView> {
        let mut views = self.populate_many(vec![offer]).await?;
        views
            .pop()
            .ok_or_else(|| CoreError::StorageError("offer view went missing".to_string()))
    }

    async fn populate_many(&self, offers: Vec<Offer>) -> CoreResult<Vec<OfferView>> {
        let index = user_index(&self.repos, offers.iter().flat_map(|o| [o.artist, o.place])).await?;
        let event_ids: Vec<Uuid> = offers.iter().filter_map(|o| o.event).collect();
        let events = if event_ids.is_empty() {
            Vec::new()
        } else {
            self.repos.events.get_events(&event_ids).await?
        };

        Ok(offers
            .into_iter()
            .map(|offer| {
                let event = offer
                    .event
                    .and_then(|id| events.iter().find(|e| e.id == id).cloned());
                let artist = public(&index, offer.artist);
                let place = public(&index, offer.place);
                OfferView::new(offer, event, artist, place)
            })
            .collect())
    }
}

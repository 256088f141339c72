use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use encore_core::repository::{
    ConversationRepository, EventRepository, FeedbackRepository, OfferRepository, ParticipationRepository,
    TourRepository, UserRepository,
};
use encore_core::search::{nearest_first, EventSearch, UserSearch};
use encore_core::{RepoResult, Repositories};
use encore_shared::{
    AcceptanceSlot, AccountType, Conversation, Event, Feedback, GeoPoint, Message, Offer, Participation, Party,
    Profile, Stage, Tour, User,
};

/// Process-local store used when no database is configured, and by tests.
///
/// Each collection sits behind its own lock; every trait method takes the
/// lock once, so single-record updates are atomic like their SQL versions.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    events: RwLock<HashMap<Uuid, Event>>,
    offers: RwLock<HashMap<Uuid, Offer>>,
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    messages: RwLock<Vec<Message>>,
    participations: RwLock<Vec<Participation>>,
    feedbacks: RwLock<HashMap<Uuid, Feedback>>,
    tours: RwLock<HashMap<Uuid, Tour>>,
    stages: RwLock<HashMap<Uuid, Stage>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_repositories(self) -> Repositories {
        let store = Arc::new(self);
        Repositories {
            users: store.clone(),
            events: store.clone(),
            offers: store.clone(),
            conversations: store.clone(),
            participations: store.clone(),
            feedbacks: store.clone(),
            tours: store,
        }
    }
}

/// Fresh, empty in-memory repositories.
pub fn repositories() -> Repositories {
    MemoryStore::new().into_repositories()
}

fn by_date<T>(items: &mut [T], date: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| date(item));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> RepoResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(format!("email {} is already registered", user.email).into());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_users(&self, ids: &[Uuid]) -> RepoResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.email == email).cloned())
    }

    async fn list_users_by_type(&self, account_type: AccountType) -> RepoResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.account_type == Some(account_type))
            .cloned()
            .collect();
        by_date(&mut found, |u| u.created_at);
        Ok(found)
    }

    async fn update_profile(&self, id: Uuid, account_type: AccountType, profile: &Profile) -> RepoResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.account_type = Some(account_type);
            user.profile = profile.clone();
            user.clone()
        }))
    }

    async fn update_credentials(&self, id: Uuid, email: &str, password_hash: Option<&str>) -> RepoResult<Option<User>> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email && u.id != id) {
            return Err(format!("email {} is already registered", email).into());
        }
        Ok(users.get_mut(&id).map(|user| {
            user.email = email.to_string();
            if let Some(hash) = password_hash {
                user.password_hash = Some(hash.to_string());
            }
            user.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn search_users(&self, search: &UserSearch) -> RepoResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| search.matches(u))
            .cloned()
            .collect();
        by_date(&mut found, |u| u.created_at);
        found.truncate(search.limit);
        Ok(found)
    }

    async fn nearest_users(&self, account_type: AccountType, point: GeoPoint) -> RepoResult<Vec<User>> {
        let candidates: Vec<User> = self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.account_type == Some(account_type))
            .cloned()
            .collect();
        Ok(nearest_first(candidates, &point, |u| u.profile.location.coordinates))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert_event(&self, event: &Event) -> RepoResult<()> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn get_events(&self, ids: &[Uuid]) -> RepoResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(ids.iter().filter_map(|id| events.get(id).cloned()).collect())
    }

    async fn replace_event(&self, event: &Event) -> RepoResult<bool> {
        let mut events = self.events.write().await;
        match events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_event(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self.events.write().await.remove(&id).is_some();
        if removed {
            self.participations.write().await.retain(|p| p.event != id);
        }
        Ok(removed)
    }

    async fn add_artist(&self, event_id: Uuid, artist_id: Uuid, artist_name: &str) -> RepoResult<Option<Event>> {
        let mut events = self.events.write().await;
        Ok(events.get_mut(&event_id).map(|event| {
            if !event.artists.contains(&artist_id) {
                event.artists.push(artist_id);
                event.artists_names.push(artist_name.to_string());
            }
            event.clone()
        }))
    }

    async fn events_with_artist(&self, artist_id: Uuid) -> RepoResult<Vec<Event>> {
        let mut found: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.artists.contains(&artist_id))
            .cloned()
            .collect();
        by_date(&mut found, |e| e.date);
        Ok(found)
    }

    async fn events_of_place(&self, place_id: Uuid) -> RepoResult<Vec<Event>> {
        let mut found: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.place == place_id)
            .cloned()
            .collect();
        by_date(&mut found, |e| e.date);
        Ok(found)
    }

    async fn set_place_name(&self, place_id: Uuid, name: &str) -> RepoResult<u64> {
        let mut events = self.events.write().await;
        let mut touched = 0;
        for event in events.values_mut().filter(|e| e.place == place_id) {
            event.place_name = name.to_string();
            touched += 1;
        }
        Ok(touched)
    }

    async fn set_artists_names(&self, event_id: Uuid, names: &[String]) -> RepoResult<bool> {
        let mut events = self.events.write().await;
        Ok(events
            .get_mut(&event_id)
            .map(|event| event.artists_names = names.to_vec())
            .is_some())
    }

    async fn search_events(&self, search: &EventSearch) -> RepoResult<Vec<Event>> {
        let mut found: Vec<Event> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| search.matches(e))
            .cloned()
            .collect();
        by_date(&mut found, |e| e.date);
        Ok(found)
    }

    async fn nearest_events(&self, point: GeoPoint) -> RepoResult<Vec<Event>> {
        let candidates: Vec<Event> = self.events.read().await.values().cloned().collect();
        Ok(nearest_first(candidates, &point, |e| e.location.coordinates))
    }
}

#[async_trait]
impl OfferRepository for MemoryStore {
    async fn insert_offer(&self, offer: &Offer) -> RepoResult<()> {
        self.offers.write().await.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn get_offer(&self, id: Uuid) -> RepoResult<Option<Offer>> {
        Ok(self.offers.read().await.get(&id).cloned())
    }

    async fn list_offers(&self, party: Party, user_id: Uuid, counterparty: Option<Uuid>) -> RepoResult<Vec<Offer>> {
        let mut found: Vec<Offer> = self
            .offers
            .read()
            .await
            .values()
            .filter(|o| o.party_id(party) == user_id)
            .filter(|o| counterparty.map_or(true, |c| o.party_id(party.counterpart()) == c))
            .cloned()
            .collect();
        by_date(&mut found, |o| o.date);
        Ok(found)
    }

    async fn find_event_offer(
        &self,
        party: Party,
        user_id: Uuid,
        counterparty: Uuid,
        event_id: Uuid,
    ) -> RepoResult<Option<Offer>> {
        Ok(self
            .offers
            .read()
            .await
            .values()
            .find(|o| {
                o.party_id(party) == user_id
                    && o.party_id(party.counterpart()) == counterparty
                    && o.event == Some(event_id)
            })
            .cloned())
    }

    async fn revise_offer(&self, id: Uuid, date: DateTime<Utc>, price: f64, event: Option<Uuid>) -> RepoResult<Option<Offer>> {
        let mut offers = self.offers.write().await;
        Ok(offers.get_mut(&id).map(|offer| {
            offer.revise(date, price, event);
            offer.clone()
        }))
    }

    async fn stamp_acceptance(&self, id: Uuid, slot: AcceptanceSlot, at: DateTime<Utc>) -> RepoResult<Option<Offer>> {
        let party = match slot {
            AcceptanceSlot::ArtistAcceptDate => Party::Artist,
            AcceptanceSlot::PlaceAcceptDate => Party::Place,
        };
        let mut offers = self.offers.write().await;
        Ok(offers.get_mut(&id).map(|offer| {
            offer.accept(party, at);
            offer.clone()
        }))
    }

    async fn decline_offer(&self, id: Uuid, author: Uuid, reason: &str, at: DateTime<Utc>) -> RepoResult<Option<Offer>> {
        let mut offers = self.offers.write().await;
        Ok(offers.get_mut(&id).map(|offer| {
            offer.decline(author, reason, at);
            offer.clone()
        }))
    }

    async fn claim_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool> {
        let mut offers = self.offers.write().await;
        match offers.get_mut(&id) {
            Some(offer) if offer.event.is_none() => {
                offer.event = Some(event_id);
                offer.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool> {
        let mut offers = self.offers.write().await;
        match offers.get_mut(&id) {
            Some(offer) if offer.event == Some(event_id) => {
                offer.event = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_conversation(&self, artist: Uuid, place: Uuid) -> RepoResult<Option<Conversation>> {
        Ok(self
            .conversations
            .read()
            .await
            .values()
            .find(|c| c.artist == artist && c.place == place)
            .cloned())
    }

    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<Conversation> {
        let mut conversations = self.conversations.write().await;
        if let Some(existing) = conversations
            .values()
            .find(|c| c.artist == conversation.artist && c.place == conversation.place)
        {
            return Ok(existing.clone());
        }
        conversations.insert(conversation.id, conversation.clone());
        Ok(conversation.clone())
    }

    async fn get_conversation(&self, id: Uuid) -> RepoResult<Option<Conversation>> {
        Ok(self.conversations.read().await.get(&id).cloned())
    }

    async fn list_conversations(&self, party: Party, user_id: Uuid) -> RepoResult<Vec<Conversation>> {
        let mut found: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| match party {
                Party::Artist => c.artist == user_id,
                Party::Place => c.place == user_id,
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(found)
    }

    async fn delete_conversation(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self.conversations.write().await.remove(&id).is_some();
        if removed {
            self.messages.write().await.retain(|m| m.conversation != id);
        }
        Ok(removed)
    }

    async fn append_message(&self, message: &Message) -> RepoResult<()> {
        if let Some(conversation) = self.conversations.write().await.get_mut(&message.conversation) {
            conversation.updated_at = message.created_at;
        }
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, conversation: Uuid) -> RepoResult<Vec<Message>> {
        let mut found: Vec<Message> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.conversation == conversation)
            .cloned()
            .collect();
        by_date(&mut found, |m| m.created_at);
        Ok(found)
    }

    async fn latest_message(&self, conversation: Uuid) -> RepoResult<Option<Message>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| m.conversation == conversation)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    async fn edit_message(&self, conversation: Uuid, message_id: Uuid, author: Uuid, body: &str) -> RepoResult<Option<Message>> {
        let mut messages = self.messages.write().await;
        Ok(messages
            .iter_mut()
            .find(|m| m.id == message_id && m.conversation == conversation && m.author == author)
            .map(|message| {
                message.body = body.to_string();
                message.updated_at = Utc::now();
                message.clone()
            }))
    }
}

#[async_trait]
impl ParticipationRepository for MemoryStore {
    async fn get_participation(&self, event: Uuid, user: Uuid) -> RepoResult<Option<Participation>> {
        Ok(self
            .participations
            .read()
            .await
            .iter()
            .find(|p| p.event == event && p.user == user)
            .cloned())
    }

    async fn join_event(&self, event: Uuid, user: Uuid) -> RepoResult<Participation> {
        let mut participations = self.participations.write().await;
        if let Some(existing) = participations.iter().find(|p| p.event == event && p.user == user) {
            return Ok(existing.clone());
        }
        let participation = Participation::new(event, user);
        participations.push(participation.clone());
        Ok(participation)
    }

    async fn leave_event(&self, event: Uuid, user: Uuid) -> RepoResult<bool> {
        let mut participations = self.participations.write().await;
        let before = participations.len();
        participations.retain(|p| !(p.event == event && p.user == user));
        Ok(participations.len() < before)
    }

    async fn count_participants(&self, event: Uuid) -> RepoResult<i64> {
        let count = self.participations.read().await.iter().filter(|p| p.event == event).count();
        Ok(count as i64)
    }

    async fn participations_of(&self, user: Uuid) -> RepoResult<Vec<Participation>> {
        Ok(self
            .participations
            .read()
            .await
            .iter()
            .filter(|p| p.user == user)
            .cloned()
            .collect())
    }

    async fn unlock_review(&self, event: Uuid, user: Uuid) -> RepoResult<Participation> {
        let mut participations = self.participations.write().await;
        if let Some(existing) = participations.iter_mut().find(|p| p.event == event && p.user == user) {
            existing.can_review = true;
            return Ok(existing.clone());
        }
        let mut participation = Participation::new(event, user);
        participation.can_review = true;
        participations.push(participation.clone());
        Ok(participation)
    }

    async fn set_reviewed(&self, event: Uuid, user: Uuid, reviewed: bool) -> RepoResult<Option<Participation>> {
        let mut participations = self.participations.write().await;
        Ok(participations
            .iter_mut()
            .find(|p| p.event == event && p.user == user)
            .map(|p| {
                p.has_reviewed = reviewed;
                p.clone()
            }))
    }
}

#[async_trait]
impl FeedbackRepository for MemoryStore {
    async fn insert_feedback(&self, feedback: &Feedback) -> RepoResult<()> {
        self.feedbacks.write().await.insert(feedback.id, feedback.clone());
        Ok(())
    }

    async fn get_feedback(&self, id: Uuid) -> RepoResult<Option<Feedback>> {
        Ok(self.feedbacks.read().await.get(&id).cloned())
    }

    async fn delete_feedback(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.feedbacks.write().await.remove(&id).is_some())
    }

    async fn feedbacks_by_author(&self, author: Uuid) -> RepoResult<Vec<Feedback>> {
        let mut found: Vec<Feedback> = self
            .feedbacks
            .read()
            .await
            .values()
            .filter(|f| f.author == author)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn feedbacks_for_receiver(&self, receiver: Uuid) -> RepoResult<Vec<Feedback>> {
        let mut found: Vec<Feedback> = self
            .feedbacks
            .read()
            .await
            .values()
            .filter(|f| f.receiver == receiver)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[async_trait]
impl TourRepository for MemoryStore {
    async fn insert_tour(&self, tour: &Tour) -> RepoResult<()> {
        self.tours.write().await.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>> {
        Ok(self.tours.read().await.get(&id).cloned())
    }

    async fn tours_of(&self, artist: Uuid) -> RepoResult<Vec<Tour>> {
        let mut found: Vec<Tour> = self
            .tours
            .read()
            .await
            .values()
            .filter(|t| t.artist == artist)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool> {
        let mut tours = self.tours.write().await;
        match tours.get_mut(&tour.id) {
            Some(stored) => {
                *stored = tour.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool> {
        let removed = self.tours.write().await.remove(&id).is_some();
        if removed {
            self.stages.write().await.retain(|_, s| s.tour != id);
        }
        Ok(removed)
    }

    async fn insert_stage(&self, stage: &Stage) -> RepoResult<()> {
        self.stages.write().await.insert(stage.id, stage.clone());
        Ok(())
    }

    async fn get_stage(&self, id: Uuid) -> RepoResult<Option<Stage>> {
        Ok(self.stages.read().await.get(&id).cloned())
    }

    async fn stages_of(&self, tour: Uuid) -> RepoResult<Vec<Stage>> {
        let mut found: Vec<Stage> = self
            .stages
            .read()
            .await
            .values()
            .filter(|s| s.tour == tour)
            .cloned()
            .collect();
        by_date(&mut found, |s| s.date);
        Ok(found)
    }

    async fn update_stage(&self, stage: &Stage) -> RepoResult<bool> {
        let mut stages = self.stages.write().await;
        match stages.get_mut(&stage.id) {
            Some(stored) => {
                *stored = stage.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_stage(&self, id: Uuid) -> RepoResult<bool> {
        Ok(self.stages.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use encore_shared::Location;

    fn place(name: &str, lng: f64, lat: f64) -> User {
        let mut user = User::new(format!("{}@encore.test", name.to_lowercase().replace(' ', "")), None);
        user.account_type = Some(AccountType::Place);
        user.profile.fullname = name.to_string();
        user.profile.location = Location::new(GeoPoint::new(lng, lat), "");
        user
    }

    fn offer() -> Offer {
        Offer::propose(
            Party::Artist,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now() + Duration::days(1),
            100.0,
            None,
        )
    }

    #[tokio::test]
    async fn test_claim_event_only_once() {
        let store = MemoryStore::new();
        let offer = offer();
        store.insert_offer(&offer).await.unwrap();

        let first = Uuid::new_v4();
        assert!(store.claim_event(offer.id, first).await.unwrap());
        assert!(!store.claim_event(offer.id, Uuid::new_v4()).await.unwrap());
        assert_eq!(store.get_offer(offer.id).await.unwrap().unwrap().event, Some(first));

        assert!(!store.release_event(offer.id, Uuid::new_v4()).await.unwrap());
        assert!(store.release_event(offer.id, first).await.unwrap());
        assert!(store.get_offer(offer.id).await.unwrap().unwrap().event.is_none());
    }

    #[tokio::test]
    async fn test_stamp_acceptance_is_write_once() {
        let store = MemoryStore::new();
        let offer = offer();
        store.insert_offer(&offer).await.unwrap();

        let first = Utc::now() - Duration::minutes(1);
        let stamped = store
            .stamp_acceptance(offer.id, AcceptanceSlot::PlaceAcceptDate, first)
            .await
            .unwrap()
            .unwrap();
        let stored = store
            .stamp_acceptance(offer.id, AcceptanceSlot::PlaceAcceptDate, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.place_accept_date, Some(first));
        assert_eq!(stored.updated_at, stamped.updated_at);
    }

    #[tokio::test]
    async fn test_revise_keeps_linked_event() {
        let store = MemoryStore::new();
        let offer = offer();
        store.insert_offer(&offer).await.unwrap();
        let event_id = Uuid::new_v4();
        assert!(store.claim_event(offer.id, event_id).await.unwrap());

        let revised = store
            .revise_offer(offer.id, offer.date, 1200.0, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(revised.price, 1200.0);
        assert_eq!(revised.event, Some(event_id));
    }

    #[tokio::test]
    async fn test_one_conversation_per_pair() {
        let store = MemoryStore::new();
        let (artist, place) = (Uuid::new_v4(), Uuid::new_v4());
        let first = store
            .create_conversation(&Conversation::between(Party::Artist, artist, place))
            .await
            .unwrap();
        let second = store
            .create_conversation(&Conversation::between(Party::Place, place, artist))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.list_conversations(Party::Place, place).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_nearest_users_sorted_and_bounded() {
        let store = MemoryStore::new();
        let near = place("Near", 9.190, 45.464);
        let nearer = place("Nearer", 9.1901, 45.4641);
        let far = place("Far", 12.49, 41.90);
        for user in [&near, &nearer, &far] {
            store.insert_user(user).await.unwrap();
        }

        let found = store
            .nearest_users(AccountType::Place, GeoPoint::new(9.1901, 45.4641))
            .await
            .unwrap();
        let names: Vec<&str> = found.iter().map(|u| u.profile.fullname.as_str()).collect();
        assert_eq!(names, vec!["Nearer", "Near"]);
    }

    #[tokio::test]
    async fn test_delete_event_drops_participations() {
        let store = MemoryStore::new();
        let owner = place("Club", 0.0, 0.0);
        let event = Event::new(&owner, "Gig", "Live", Utc::now() + Duration::days(1), Location::default());
        store.insert_event(&event).await.unwrap();
        store.join_event(event.id, Uuid::new_v4()).await.unwrap();
        store.unlock_review(event.id, Uuid::new_v4()).await.unwrap();
        assert_eq!(store.count_participants(event.id).await.unwrap(), 2);

        assert!(store.delete_event(event.id).await.unwrap());
        assert_eq!(store.count_participants(event.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_artist_is_set_like() {
        let store = MemoryStore::new();
        let owner = place("Club", 0.0, 0.0);
        let event = Event::new(&owner, "Gig", "Live", Utc::now() + Duration::days(1), Location::default());
        store.insert_event(&event).await.unwrap();

        let artist = Uuid::new_v4();
        store.add_artist(event.id, artist, "Miles").await.unwrap();
        let stored = store.add_artist(event.id, artist, "Miles").await.unwrap().unwrap();
        assert_eq!(stored.artists, vec![artist]);
        assert_eq!(stored.artists_names, vec!["Miles".to_string()]);
    }
}

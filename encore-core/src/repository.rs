use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use encore_shared::{
    AcceptanceSlot, AccountType, Conversation, Event, Feedback, GeoPoint, Message, Offer, Participation, Party,
    Profile, Stage, Tour, User,
};

use crate::search::{EventSearch, UserSearch};

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for accounts and profiles
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> RepoResult<()>;

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    async fn get_users(&self, ids: &[Uuid]) -> RepoResult<Vec<User>>;

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn list_users_by_type(&self, account_type: AccountType) -> RepoResult<Vec<User>>;

    async fn update_profile(&self, id: Uuid, account_type: AccountType, profile: &Profile) -> RepoResult<Option<User>>;

    async fn update_credentials(&self, id: Uuid, email: &str, password_hash: Option<&str>) -> RepoResult<Option<User>>;

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;

    async fn search_users(&self, search: &UserSearch) -> RepoResult<Vec<User>>;

    async fn nearest_users(&self, account_type: AccountType, point: GeoPoint) -> RepoResult<Vec<User>>;
}

/// Repository trait for events and their denormalized search fields
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn insert_event(&self, event: &Event) -> RepoResult<()>;

    async fn get_event(&self, id: Uuid) -> RepoResult<Option<Event>>;

    async fn get_events(&self, ids: &[Uuid]) -> RepoResult<Vec<Event>>;

    async fn replace_event(&self, event: &Event) -> RepoResult<bool>;

    /// Removes the event together with its participations.
    async fn delete_event(&self, id: Uuid) -> RepoResult<bool>;

    /// Appends the artist unless already listed, in one atomic write.
    async fn add_artist(&self, event_id: Uuid, artist_id: Uuid, artist_name: &str) -> RepoResult<Option<Event>>;

    async fn events_with_artist(&self, artist_id: Uuid) -> RepoResult<Vec<Event>>;

    async fn events_of_place(&self, place_id: Uuid) -> RepoResult<Vec<Event>>;

    async fn set_place_name(&self, place_id: Uuid, name: &str) -> RepoResult<u64>;

    async fn set_artists_names(&self, event_id: Uuid, names: &[String]) -> RepoResult<bool>;

    async fn search_events(&self, search: &EventSearch) -> RepoResult<Vec<Event>>;

    async fn nearest_events(&self, point: GeoPoint) -> RepoResult<Vec<Event>>;
}

/// Repository trait for offers. Every mutation touches one offer atomically.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert_offer(&self, offer: &Offer) -> RepoResult<()>;

    async fn get_offer(&self, id: Uuid) -> RepoResult<Option<Offer>>;

    /// Offers where `user_id` sits on `party`, by ascending date.
    async fn list_offers(&self, party: Party, user_id: Uuid, counterparty: Option<Uuid>) -> RepoResult<Vec<Offer>>;

    async fn find_event_offer(
        &self,
        party: Party,
        user_id: Uuid,
        counterparty: Uuid,
        event_id: Uuid,
    ) -> RepoResult<Option<Offer>>;

    async fn revise_offer(&self, id: Uuid, date: DateTime<Utc>, price: f64, event: Option<Uuid>) -> RepoResult<Option<Offer>>;

    /// Writes the slot only when still empty and clears any previous decline.
    async fn stamp_acceptance(&self, id: Uuid, slot: AcceptanceSlot, at: DateTime<Utc>) -> RepoResult<Option<Offer>>;

    async fn decline_offer(&self, id: Uuid, author: Uuid, reason: &str, at: DateTime<Utc>) -> RepoResult<Option<Offer>>;

    /// Sets `event` only if it is currently empty. True when this call won.
    async fn claim_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool>;

    /// Undoes a claim that still points at `event_id`.
    async fn release_event(&self, id: Uuid, event_id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for conversations and their messages
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_conversation(&self, artist: Uuid, place: Uuid) -> RepoResult<Option<Conversation>>;

    /// Inserts unless the pair already has a thread; returns the stored one.
    async fn create_conversation(&self, conversation: &Conversation) -> RepoResult<Conversation>;

    async fn get_conversation(&self, id: Uuid) -> RepoResult<Option<Conversation>>;

    /// Newest first.
    async fn list_conversations(&self, party: Party, user_id: Uuid) -> RepoResult<Vec<Conversation>>;

    async fn delete_conversation(&self, id: Uuid) -> RepoResult<bool>;

    async fn append_message(&self, message: &Message) -> RepoResult<()>;

    /// Oldest first.
    async fn list_messages(&self, conversation: Uuid) -> RepoResult<Vec<Message>>;

    async fn latest_message(&self, conversation: Uuid) -> RepoResult<Option<Message>>;

    async fn edit_message(&self, conversation: Uuid, message_id: Uuid, author: Uuid, body: &str) -> RepoResult<Option<Message>>;
}

#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    async fn get_participation(&self, event: Uuid, user: Uuid) -> RepoResult<Option<Participation>>;

    /// Idempotent: returns the existing record when already joined.
    async fn join_event(&self, event: Uuid, user: Uuid) -> RepoResult<Participation>;

    async fn leave_event(&self, event: Uuid, user: Uuid) -> RepoResult<bool>;

    async fn count_participants(&self, event: Uuid) -> RepoResult<i64>;

    async fn participations_of(&self, user: Uuid) -> RepoResult<Vec<Participation>>;

    /// Sets `can_review`, joining the event first when needed.
    async fn unlock_review(&self, event: Uuid, user: Uuid) -> RepoResult<Participation>;

    async fn set_reviewed(&self, event: Uuid, user: Uuid, reviewed: bool) -> RepoResult<Option<Participation>>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert_feedback(&self, feedback: &Feedback) -> RepoResult<()>;

    async fn get_feedback(&self, id: Uuid) -> RepoResult<Option<Feedback>>;

    async fn delete_feedback(&self, id: Uuid) -> RepoResult<bool>;

    async fn feedbacks_by_author(&self, author: Uuid) -> RepoResult<Vec<Feedback>>;

    async fn feedbacks_for_receiver(&self, receiver: Uuid) -> RepoResult<Vec<Feedback>>;
}

#[async_trait]
pub trait TourRepository: Send + Sync {
    async fn insert_tour(&self, tour: &Tour) -> RepoResult<()>;

    async fn get_tour(&self, id: Uuid) -> RepoResult<Option<Tour>>;

    async fn tours_of(&self, artist: Uuid) -> RepoResult<Vec<Tour>>;

    async fn update_tour(&self, tour: &Tour) -> RepoResult<bool>;

    /// Removes the tour and its stages.
    async fn delete_tour(&self, id: Uuid) -> RepoResult<bool>;

    async fn insert_stage(&self, stage: &Stage) -> RepoResult<()>;

    async fn get_stage(&self, id: Uuid) -> RepoResult<Option<Stage>>;

    async fn stages_of(&self, tour: Uuid) -> RepoResult<Vec<Stage>>;

    async fn update_stage(&self, stage: &Stage) -> RepoResult<bool>;

    async fn delete_stage(&self, id: Uuid) -> RepoResult<bool>;
}

/// Every repository the services need, shared across request handlers
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub feedbacks: Arc<dyn FeedbackRepository>,
    pub tours: Arc<dyn TourRepository>,
}

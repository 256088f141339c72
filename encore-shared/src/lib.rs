pub mod models;
pub mod pii;

pub use models::{
    AcceptanceSlot, AccountType, Conversation, ConversationRefresh, ConversationView, Event, EventView,
    Feedback, FeedbackAverage, FeedbackView, GeoPoint, Link, Location, Message, Offer, Participation, Party, Profile,
    PublicUser, Stage, Tour, TourView, User,
};

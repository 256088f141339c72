pub mod user;
pub mod offer;
pub mod event;
pub mod chat;
pub mod participation;
pub mod tour;
pub mod events;

pub use user::{AccountType, GeoPoint, Link, Location, Party, Profile, PublicUser, User};
pub use offer::{AcceptanceSlot, Offer};
pub use event::{Event, EventView};
pub use chat::{Conversation, ConversationView, Message};
pub use participation::{Feedback, FeedbackAverage, FeedbackView, Participation};
pub use tour::{Stage, Tour, TourView};
pub use events::ConversationRefresh;

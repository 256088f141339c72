use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Party, PublicUser};

/// The single thread between an artist and a place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub artist: Uuid,
    pub place: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn between(author: Party, author_id: Uuid, recipient_id: Uuid) -> Self {
        let (artist, place) = match author {
            Party::Artist => (author_id, recipient_id),
            Party::Place => (recipient_id, author_id),
        };
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            artist,
            place,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.artist == user_id || self.place == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub conversation: Uuid,
    pub body: String,
    pub author: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation: Uuid, author: Uuid, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            conversation,
            body: body.into(),
            author,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Conversation listing entry: parties resolved plus the latest message as snippet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: Uuid,
    pub artist: Option<PublicUser>,
    pub place: Option<PublicUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

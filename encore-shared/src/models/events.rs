use uuid::Uuid;

/// Tells the members of a conversation channel to re-fetch its state.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ConversationRefresh {
    pub conversation: Uuid,
    /// Connection that triggered the refresh; it is not echoed back to it.
    #[serde(skip)]
    pub origin: Option<Uuid>,
}

use axum::{
    extract::State,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use encore_core::{chat, Actor};
use encore_shared::{ConversationView, Message};

use crate::error::{success, success_with, ApiJson, ApiPath, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub message: Option<String>,
    pub recipient: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub message_id: Option<Uuid>,
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat", get(list_conversations).post(send_message))
        .route(
            "/chat/{id}",
            get(conversation_history)
                .post(reply)
                .patch(edit_message)
                .delete(delete_conversation),
        )
}

async fn list_conversations(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<ConversationView>> {
    success(chat::conversations_of(&state.repos, &actor).await?)
}

async fn send_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<SendRequest>,
) -> ApiResult<Message> {
    let (message, conversation) = chat::send_to(&state.repos, &actor, req.recipient, req.message.as_deref()).await?;
    state.notifier.publish(conversation.id, None).await;
    success_with("Message sent", message)
}

async fn conversation_history(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Vec<Message>> {
    success(chat::history(&state.repos, &actor, id).await?)
}

async fn reply(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReplyRequest>,
) -> ApiResult<Message> {
    let message = chat::reply(&state.repos, &actor, id, req.message.as_deref()).await?;
    state.notifier.publish(id, None).await;
    success_with("Message sent", message)
}

async fn edit_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EditRequest>,
) -> ApiResult<Message> {
    let message = chat::edit_own_message(&state.repos, &actor, id, req.message_id, req.message.as_deref()).await?;
    state.notifier.publish(id, None).await;
    success(message)
}

async fn delete_conversation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    chat::remove(&state.repos, &actor, id).await?;
    success_with("Conversation deleted", ())
}

use tracing::info;
use uuid::Uuid;

use encore_shared::{Conversation, ConversationView, Message};

use crate::directory::{public, require_user, user_index};
use crate::{Actor, CoreError, CoreResult, Repositories, Validator};

async fn require_participant(repos: &Repositories, actor: &Actor, conversation_id: Uuid) -> CoreResult<Conversation> {
    let conversation = repos
        .conversations
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| CoreError::not_found("There is not a conversation with this id"))?;

    if !conversation.has_participant(actor.id) {
        return Err(CoreError::forbidden("You are not part of this conversation"));
    }
    Ok(conversation)
}

fn message_body<'a>(body: Option<&'a str>, field: &str) -> CoreResult<&'a str> {
    let mut v = Validator::new();
    let body = v.required(field, body, "Please enter a message.");
    v.finish()?;
    body.ok_or_else(|| CoreError::invalid(field, "Please enter a message."))
}

/// Sends a message to the counterparty, opening the pair's thread on first contact.
pub async fn send_to(
    repos: &Repositories,
    actor: &Actor,
    recipient: Option<Uuid>,
    body: Option<&str>,
) -> CoreResult<(Message, Conversation)> {
    let mut v = Validator::new();
    let body = v.required("message", body, "Please enter a message.");
    let recipient = v.present("recipient", recipient, "The recipient cannot be empty.");
    v.finish()?;
    let (Some(body), Some(recipient_id)) = (body, recipient) else {
        return Err(CoreError::invalid("recipient", "The recipient cannot be empty."));
    };

    let party = actor.party()?;
    let recipient = require_user(repos, recipient_id).await?;
    if recipient.party() != Some(party.counterpart()) {
        return Err(CoreError::invalid("recipient", "You can only write to the other side of a negotiation"));
    }

    let wanted = Conversation::between(party, actor.id, recipient.id);
    let conversation = match repos.conversations.find_conversation(wanted.artist, wanted.place).await? {
        Some(existing) => existing,
        None => {
            let created = repos.conversations.create_conversation(&wanted).await?;
            info!("Conversation {} opened between artist {} and place {}", created.id, created.artist, created.place);
            created
        }
    };

    let message = Message::new(conversation.id, actor.id, body);
    repos.conversations.append_message(&message).await?;
    Ok((message, conversation))
}

pub async fn reply(repos: &Repositories, actor: &Actor, conversation_id: Uuid, body: Option<&str>) -> CoreResult<Message> {
    let body = message_body(body, "message")?;
    let conversation = require_participant(repos, actor, conversation_id).await?;

    let message = Message::new(conversation.id, actor.id, body);
    repos.conversations.append_message(&message).await?;
    Ok(message)
}

pub async fn history(repos: &Repositories, actor: &Actor, conversation_id: Uuid) -> CoreResult<Vec<Message>> {
    let conversation = require_participant(repos, actor, conversation_id).await?;
    Ok(repos.conversations.list_messages(conversation.id).await?)
}

/// Only the author may rewrite a message.
pub async fn edit_own_message(
    repos: &Repositories,
    actor: &Actor,
    conversation_id: Uuid,
    message_id: Option<Uuid>,
    body: Option<&str>,
) -> CoreResult<Message> {
    let mut v = Validator::new();
    let message_id = v.present("messageId", message_id, "messageId is a required field");
    let body = v.required("message", body, "Please enter a message.");
    v.finish()?;
    let (Some(message_id), Some(body)) = (message_id, body) else {
        return Err(CoreError::invalid("messageId", "messageId is a required field"));
    };

    repos
        .conversations
        .edit_message(conversation_id, message_id, actor.id, body)
        .await?
        .ok_or_else(|| CoreError::not_found("There is not a message of yours with this id"))
}

pub async fn conversations_of(repos: &Repositories, actor: &Actor) -> CoreResult<Vec<ConversationView>> {
    let party = actor.party()?;
    let conversations = repos.conversations.list_conversations(party, actor.id).await?;
    let index = user_index(repos, conversations.iter().flat_map(|c| [c.artist, c.place])).await?;

    let mut views = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let snippet = repos.conversations.latest_message(conversation.id).await?;
        views.push(ConversationView {
            id: conversation.id,
            artist: public(&index, conversation.artist),
            place: public(&index, conversation.place),
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            messages: snippet.into_iter().collect(),
        });
    }
    Ok(views)
}

pub async fn remove(repos: &Repositories, actor: &Actor, conversation_id: Uuid) -> CoreResult<()> {
    let conversation = require_participant(repos, actor, conversation_id).await?;
    repos.conversations.delete_conversation(conversation.id).await?;
    info!("Conversation {} removed by {}", conversation.id, actor.id);
    Ok(())
}

/// Thread of the pair, if they ever talked.
pub async fn thread_between(repos: &Repositories, artist: Uuid, place: Uuid) -> CoreResult<Option<Uuid>> {
    Ok(repos
        .conversations
        .find_conversation(artist, place)
        .await?
        .map(|c| c.id))
}

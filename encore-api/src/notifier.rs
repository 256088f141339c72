//! Conversation channels over WebSocket.
//!
//! A client enters the channel of each conversation it displays. When one
//! member reports a new message or an offer change, every other member gets a
//! `refresh conversation` frame carrying only the conversation id and re-reads
//! the thread over REST.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use encore_core::{Actor, CoreError};
use encore_shared::ConversationRefresh;

use crate::error::{ApiQuery, AppError};
use crate::middleware::auth::authenticate;
use crate::state::AppState;

type Channels = Arc<RwLock<HashMap<Uuid, broadcast::Sender<ConversationRefresh>>>>;

const CHANNEL_CAPACITY: usize = 64;

/// One broadcast channel per conversation id
#[derive(Clone, Default)]
pub struct Notifier {
    channels: Channels,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many connections were reached.
    pub async fn publish(&self, conversation: Uuid, origin: Option<Uuid>) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&conversation) {
            Some(sender) => sender.send(ConversationRefresh { conversation, origin }).unwrap_or(0),
            None => 0,
        }
    }

    pub async fn subscribe(&self, conversation: Uuid) -> broadcast::Receiver<ConversationRefresh> {
        let mut channels = self.channels.write().await;
        channels
            .entry(conversation)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drops channels nobody listens to anymore.
    pub async fn prune(&self) {
        self.channels.write().await.retain(|_, sender| sender.receiver_count() > 0);
    }

    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "enter conversation")]
    Enter { conversation: Uuid },
    #[serde(rename = "leave conversation")]
    Leave { conversation: Uuid },
    #[serde(rename = "new message")]
    NewMessage { conversation: Uuid },
    #[serde(rename = "change offer")]
    ChangeOffer { conversation: Uuid },
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerFrame {
    #[serde(rename = "refresh conversation")]
    Refresh { conversation: Uuid },
}

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    pub token: Option<String>,
}

/// GET /ws?token=
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SocketParams>,
) -> Result<Response, AppError> {
    let Some(token) = params.token else {
        warn!("WebSocket handshake without token");
        return Err(AppError::unauthenticated());
    };
    let user = authenticate(&state, &token).await.inspect_err(|_| {
        warn!("WebSocket handshake with an invalid token");
    })?;

    let actor = Actor::from(&user);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, actor)))
}

async fn may_enter(state: &AppState, actor: &Actor, conversation: Uuid) -> Result<bool, CoreError> {
    Ok(state
        .repos
        .conversations
        .get_conversation(conversation)
        .await?
        .is_some_and(|c| c.has_participant(actor.id)))
}

async fn forward(
    mut rx: broadcast::Receiver<ConversationRefresh>,
    tx: mpsc::Sender<ServerFrame>,
    connection: Uuid,
) {
    loop {
        match rx.recv().await {
            Ok(refresh) => {
                if refresh.origin == Some(connection) {
                    continue;
                }
                let frame = ServerFrame::Refresh {
                    conversation: refresh.conversation,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Connection {} lagging, skipped {} refreshes", connection, skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Forwarders of one connection, keyed by the conversation they relay
#[derive(Default)]
struct Rooms {
    forwarders: JoinSet<()>,
    entered: HashMap<Uuid, AbortHandle>,
}

impl Rooms {
    fn contains(&self, conversation: &Uuid) -> bool {
        self.entered.contains_key(conversation)
    }

    fn enter(
        &mut self,
        conversation: Uuid,
        rx: broadcast::Receiver<ConversationRefresh>,
        tx: mpsc::Sender<ServerFrame>,
        connection: Uuid,
    ) {
        self.reap();
        let handle = self.forwarders.spawn(forward(rx, tx, connection));
        self.entered.insert(conversation, handle);
    }

    fn leave(&mut self, conversation: &Uuid) -> bool {
        let Some(handle) = self.entered.remove(conversation) else {
            return false;
        };
        handle.abort();
        self.reap();
        true
    }

    /// Joins forwarders that already stopped so the set does not grow.
    fn reap(&mut self) {
        while self.forwarders.try_join_next().is_some() {}
    }

    fn len(&self) -> usize {
        self.forwarders.len()
    }

    /// Resolves once every forwarder has dropped its receiver.
    async fn close(mut self) {
        self.entered.clear();
        self.forwarders.shutdown().await;
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, actor: Actor) {
    let connection = Uuid::new_v4();
    let notifier = state.notifier.clone();
    info!("WebSocket {} opened for user {}", connection, actor.id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerFrame>(CHANNEL_CAPACITY);
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Ok(json) = serde_json::to_string(&frame) else {
                continue;
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_notifier = notifier.clone();
    let mut recv_task = tokio::spawn(async move {
        let mut rooms = Rooms::default();

        loop {
            let next = tokio::select! {
                next = receiver.next() => next,
                _ = &mut stop_rx => break,
            };
            let text = match next {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            };

            match serde_json::from_str::<ClientFrame>(text.as_str()) {
                Ok(ClientFrame::Enter { conversation }) => {
                    if rooms.contains(&conversation) {
                        continue;
                    }
                    match may_enter(&state, &actor, conversation).await {
                        Ok(true) => {
                            let rx = recv_notifier.subscribe(conversation).await;
                            rooms.enter(conversation, rx, tx.clone(), connection);
                            debug!("Connection {} entered conversation {}", connection, conversation);
                        }
                        Ok(false) => warn!("User {} may not enter conversation {}", actor.id, conversation),
                        Err(e) => warn!("Could not check conversation {}: {}", conversation, e),
                    }
                }
                Ok(ClientFrame::Leave { conversation }) => {
                    if rooms.leave(&conversation) {
                        debug!(
                            "Connection {} left conversation {}, {} forwarders left",
                            connection,
                            conversation,
                            rooms.len()
                        );
                    }
                }
                Ok(ClientFrame::NewMessage { conversation }) | Ok(ClientFrame::ChangeOffer { conversation }) => {
                    if rooms.contains(&conversation) {
                        recv_notifier.publish(conversation, Some(connection)).await;
                    }
                }
                Err(e) => debug!("Ignoring malformed frame on {}: {}", connection, e),
            }
        }
        rooms
    });

    let rooms = tokio::select! {
        _ = (&mut send_task) => {
            let _ = stop_tx.send(());
            recv_task.await
        }
        rooms = (&mut recv_task) => {
            send_task.abort();
            rooms
        }
    };

    // channels can only be pruned once the forwarders let go of them
    match rooms {
        Ok(rooms) => rooms.close().await,
        Err(e) => warn!("Receive loop of {} ended abnormally: {}", connection, e),
    }
    notifier.prune().await;
    info!("WebSocket {} closed", connection);
}

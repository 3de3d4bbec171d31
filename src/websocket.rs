use crate::error::{AppError, AppResult};
use crate::repositories::GroupRepository;
use crate::services::ChatService;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::RwLock;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "subscribe")]
    Subscribe {
        channel: String, // "group:{id}", "user:{id}"
        user_id: Uuid,
    },
    #[serde(rename = "unsubscribe")]
    Unsubscribe {
        channel: String,
    },
    #[serde(rename = "chat_message")]
    ChatMessage {
        group_id: Uuid,
        user_id: Uuid,
        user_name: String,
        body: String,
        message_id: String,
        timestamp: i64,
    },
    #[serde(rename = "typing")]
    Typing {
        group_id: Uuid,
        user_name: String,
        is_typing: bool,
    },
    #[serde(rename = "member_joined")]
    MemberJoined {
        group_id: Uuid,
        user_name: String,
    },
    #[serde(rename = "member_left")]
    MemberLeft {
        group_id: Uuid,
        user_name: String,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
    },
}

impl WsMessage {
    /// The channel a message is delivered on, if any
    fn channel(&self) -> Option<String> {
        match self {
            WsMessage::ChatMessage { group_id, .. }
            | WsMessage::Typing { group_id, .. }
            | WsMessage::MemberJoined { group_id, .. }
            | WsMessage::MemberLeft { group_id, .. } => Some(group_channel(*group_id)),
            _ => None,
        }
    }

    fn group_id(&self) -> Option<Uuid> {
        match self {
            WsMessage::ChatMessage { group_id, .. }
            | WsMessage::Typing { group_id, .. }
            | WsMessage::MemberJoined { group_id, .. }
            | WsMessage::MemberLeft { group_id, .. } => Some(*group_id),
            _ => None,
        }
    }
}

pub fn group_channel(group_id: Uuid) -> String {
    format!("group:{}", group_id)
}

/// WebSocket gateway for the real-time chat surface.
///
/// Delivery is scoped to a group's current membership: subscribing to a
/// group channel requires being a participant, and membership is checked
/// again against the group store before every delivery, so a removed member
/// stops receiving traffic immediately.
pub struct ChatGateway {
    /// Broadcast sender fanning messages out to connection tasks
    tx: broadcast::Sender<WsMessage>,
    /// Active subscriptions: channel -> client IDs
    subscriptions: Arc<RwLock<HashMap<String, Vec<Uuid>>>>,
    /// Client subscriptions: client_id -> channels
    client_channels: Arc<RwLock<HashMap<Uuid, Vec<String>>>>,
    /// Which user each client authenticated as at subscribe time
    client_users: Arc<RwLock<HashMap<Uuid, Uuid>>>,
    groups: Arc<GroupRepository>,
    chat: Arc<ChatService>,
}

impl ChatGateway {
    pub fn new(groups: Arc<GroupRepository>, chat: Arc<ChatService>) -> Self {
        let (tx, _) = broadcast::channel(1000); // Buffer up to 1000 messages

        Self {
            tx,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            client_channels: Arc::new(RwLock::new(HashMap::new())),
            client_users: Arc::new(RwLock::new(HashMap::new())),
            groups,
            chat,
        }
    }

    /// Get broadcast sender
    pub fn sender(&self) -> broadcast::Sender<WsMessage> {
        self.tx.clone()
    }

    /// Subscribe a client to a channel after verifying it may listen there
    pub async fn subscribe(&self, client_id: Uuid, user_id: Uuid, channel: String) -> AppResult<()> {
        match parse_channel(&channel)? {
            Channel::Group(group_id) => {
                let group = self
                    .groups
                    .find_by_id(group_id)
                    .await
                    .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;
                if !group.is_participant(user_id) {
                    return Err(AppError::Forbidden(
                        "You are not a member of this group".to_string(),
                    ));
                }
            }
            Channel::User(channel_user) => {
                if channel_user != user_id {
                    return Err(AppError::Forbidden(
                        "Cannot subscribe to another user's channel".to_string(),
                    ));
                }
            }
        }

        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;
        let mut client_users = self.client_users.write().await;

        subscriptions
            .entry(channel.clone())
            .or_insert_with(Vec::new)
            .push(client_id);
        client_channels
            .entry(client_id)
            .or_insert_with(Vec::new)
            .push(channel.clone());
        client_users.insert(client_id, user_id);

        info!("Client {} subscribed to {}", client_id, channel);
        Ok(())
    }

    /// Unsubscribe a client from a channel
    pub async fn unsubscribe(&self, client_id: Uuid, channel: &str) {
        let mut subscriptions = self.subscriptions.write().await;
        let mut client_channels = self.client_channels.write().await;

        if let Some(subscribers) = subscriptions.get_mut(channel) {
            subscribers.retain(|&id| id != client_id);
        }
        if let Some(channels) = client_channels.get_mut(&client_id) {
            channels.retain(|c| c != channel);
        }

        info!("Client {} unsubscribed from {}", client_id, channel);
    }

    /// Get all channels a client is subscribed to
    pub async fn get_client_channels(&self, client_id: Uuid) -> Vec<String> {
        let client_channels = self.client_channels.read().await;
        client_channels.get(&client_id).cloned().unwrap_or_default()
    }

    /// Announce a membership event on a group's channel
    pub async fn broadcast_member_event(&self, message: WsMessage) {
        if let Some(channel) = message.channel() {
            self.broadcast_to_channel(&channel, message).await;
        }
    }

    /// Broadcast a message to all subscribers of a channel
    async fn broadcast_to_channel(&self, channel: &str, message: WsMessage) {
        let subscriptions = self.subscriptions.read().await;

        if let Some(subscribers) = subscriptions.get(channel) {
            if !subscribers.is_empty() {
                info!(
                    "Broadcasting to {} subscribers on channel {}",
                    subscribers.len(),
                    channel
                );
                if let Err(e) = self.tx.send(message) {
                    warn!("Failed to broadcast message: {}", e);
                }
            }
        }
    }

    /// Whether a message should be sent to a client: the client must be
    /// subscribed to the channel and, for group traffic, must still be a
    /// participant of the group at delivery time.
    async fn should_deliver(&self, client_id: Uuid, message: &WsMessage) -> bool {
        let Some(channel) = message.channel() else {
            return false;
        };
        if !self.is_client_subscribed(client_id, &channel).await {
            return false;
        }
        let Some(group_id) = message.group_id() else {
            return true;
        };

        let user_id = match self.client_users.read().await.get(&client_id) {
            Some(&user_id) => user_id,
            None => return false,
        };
        match self.groups.find_by_id(group_id).await {
            Some(group) => group.is_participant(user_id),
            None => false, // group deleted after subscription
        }
    }

    /// Check if client is subscribed to a channel
    async fn is_client_subscribed(&self, client_id: Uuid, channel: &str) -> bool {
        let subscriptions = self.subscriptions.read().await;
        subscriptions
            .get(channel)
            .map(|subscribers| subscribers.contains(&client_id))
            .unwrap_or(false)
    }

    /// Handle a new WebSocket connection
    pub async fn handle_connection(&self, stream: tokio::net::TcpStream) -> AppResult<()> {
        let ws_stream = accept_async(stream)
            .await
            .map_err(|e| AppError::Message(format!("WebSocket handshake failed: {}", e)))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let mut rx = self.tx.subscribe();
        let client_id = Uuid::new_v4();

        info!("New WebSocket connection: {}", client_id);

        let welcome = serde_json::json!({
            "type": "connected",
            "client_id": client_id.to_string(),
            "message": "Connected to Huddle chat server"
        });
        if let Err(e) = ws_sender.send(Message::Text(welcome.to_string())).await {
            warn!("Failed to send welcome message: {}", e);
        }

        // The sink is shared between the reader task (acks/errors) and the
        // broadcast-forwarding task
        let ws_sender = Arc::new(tokio::sync::Mutex::new(ws_sender));
        let ws_sender_for_receiver = ws_sender.clone();

        let gateway = self.clone();
        tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        let parsed = match serde_json::from_str::<WsMessage>(&text) {
                            Ok(parsed) => parsed,
                            Err(_) => {
                                warn!("Failed to parse message from client {}: {}", client_id, text);
                                let err = serde_json::json!({
                                    "type": "error",
                                    "message": "Invalid message format"
                                });
                                let mut sender = ws_sender_for_receiver.lock().await;
                                let _ = sender.send(Message::Text(err.to_string())).await;
                                continue;
                            }
                        };
                        let reply = gateway.handle_client_message(client_id, parsed).await;
                        if let Some(reply) = reply {
                            let mut sender = ws_sender_for_receiver.lock().await;
                            if let Err(e) = sender.send(Message::Text(reply.to_string())).await {
                                warn!("Failed to reply to client {}: {}", client_id, e);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("WebSocket connection closed: {}", client_id);
                        break;
                    }
                    Err(e) => {
                        error!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            // Clean up all subscriptions for this client
            let channels = gateway.get_client_channels(client_id).await;
            for channel in channels {
                gateway.unsubscribe(client_id, &channel).await;
            }
            gateway.client_users.write().await.remove(&client_id);
        });

        // Forward broadcast traffic this client is allowed to see
        let gateway = self.clone();
        let ws_sender_for_broadcast = ws_sender.clone();
        tokio::spawn(async move {
            while let Ok(msg) = rx.recv().await {
                if !gateway.should_deliver(client_id, &msg).await {
                    continue;
                }
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize message: {}", e);
                        continue;
                    }
                };
                let mut sender = ws_sender_for_broadcast.lock().await;
                if let Err(e) = sender.send(Message::Text(json)).await {
                    error!("Failed to send message to client {}: {}", client_id, e);
                    break;
                }
            }
        });

        Ok(())
    }

    /// Process one inbound client frame, returning the JSON reply to send
    /// back on this connection (ack or error), if any
    async fn handle_client_message(
        &self,
        client_id: Uuid,
        message: WsMessage,
    ) -> Option<serde_json::Value> {
        match message {
            WsMessage::Subscribe { channel, user_id } => {
                match self.subscribe(client_id, user_id, channel.clone()).await {
                    Ok(()) => Some(serde_json::json!({
                        "type": "subscribed",
                        "channel": channel
                    })),
                    Err(e) => Some(serde_json::json!({
                        "type": "error",
                        "message": e.to_string()
                    })),
                }
            }
            WsMessage::Unsubscribe { channel } => {
                self.unsubscribe(client_id, &channel).await;
                Some(serde_json::json!({
                    "type": "unsubscribed",
                    "channel": channel
                }))
            }
            WsMessage::ChatMessage {
                group_id,
                user_id,
                body,
                ..
            } => {
                // Persist through the chat service, which owns the
                // membership gate, then fan out
                match self.chat.send_group_message(group_id, user_id, body).await {
                    Ok(stored) => {
                        self.broadcast_to_channel(
                            &group_channel(group_id),
                            WsMessage::ChatMessage {
                                group_id,
                                user_id,
                                user_name: stored.sender_name.clone(),
                                body: stored.body.clone(),
                                message_id: stored.id.to_string(),
                                timestamp: stored.sent_at.timestamp(),
                            },
                        )
                        .await;
                        None
                    }
                    Err(e) => Some(serde_json::json!({
                        "type": "error",
                        "message": e.to_string()
                    })),
                }
            }
            WsMessage::Typing {
                group_id,
                user_name,
                is_typing,
            } => {
                self.broadcast_to_channel(
                    &group_channel(group_id),
                    WsMessage::Typing {
                        group_id,
                        user_name,
                        is_typing,
                    },
                )
                .await;
                None
            }
            _ => {
                warn!("Unexpected message type from client {}", client_id);
                None
            }
        }
    }
}

impl Clone for ChatGateway {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            subscriptions: Arc::clone(&self.subscriptions),
            client_channels: Arc::clone(&self.client_channels),
            client_users: Arc::clone(&self.client_users),
            groups: Arc::clone(&self.groups),
            chat: Arc::clone(&self.chat),
        }
    }
}

enum Channel {
    Group(Uuid),
    User(Uuid),
}

fn parse_channel(channel: &str) -> AppResult<Channel> {
    let (kind, id) = channel
        .split_once(':')
        .ok_or_else(|| AppError::Validation(format!("Malformed channel: {}", channel)))?;
    let id = Uuid::parse_str(id)
        .map_err(|_| AppError::Validation(format!("Malformed channel id: {}", channel)))?;
    match kind {
        "group" => Ok(Channel::Group(id)),
        "user" => Ok(Channel::User(id)),
        _ => Err(AppError::Validation(format!(
            "Unknown channel kind: {}",
            channel
        ))),
    }
}

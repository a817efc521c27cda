//! # Messaging Data Transfer Objects
//!
//! Request, response and event-channel payload structures for the messaging
//! endpoints: peer directory, message history, sending, read acknowledgment,
//! typing signals and unread counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A conversation counterpart (customer or agent) as listed by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Peer {
    pub id: i64,
    pub name: String,
    /// Presence flag; the only peer field that changes within a session.
    pub is_active: bool,
}

/// Peer directory response for the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeersResponse {
    pub peers: Vec<Peer>,
}

/// Kind of message payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    File,
    /// Structured reference to a property listing.
    PropertyRef,
}

/// A message as stored by the server.
///
/// Messages are never mutated locally after creation; the cached history is
/// invalidated and replaced wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_ref: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Set by the server once the receiver acknowledges the conversation.
    pub read_at: Option<DateTime<Utc>>,
}

impl Message {
    /// True when this message was sent *to* `user_id` rather than by them.
    pub fn is_inbound_for(&self, user_id: i64) -> bool {
        self.receiver_id == user_id
    }
}

/// Full conversation history with one peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHistoryResponse {
    pub messages: Vec<Message>,
}

/// Body for `POST /messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_ref: Option<i64>,
}

impl SendMessageRequest {
    /// Plain text message to a peer.
    pub fn text(receiver_id: i64, message: impl Into<String>) -> Self {
        Self {
            receiver_id,
            message_type: MessageType::Text,
            message: message.into(),
            attachment: None,
            property_ref: None,
        }
    }
}

/// Body for `POST /typing/{peerId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingRequest {
    pub is_typing: bool,
}

/// Response for `GET /messages/unread-counts`: peer id → unread inbound count.
///
/// A peer absent from the map has zero unread messages.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnreadCountsResponse {
    pub counts: HashMap<i64, u32>,
}

/// Payload of the `message.sent` event on `private-send-message.{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSentEvent {
    pub sender_user_id: i64,
    /// The message itself, when the server includes it; the client refetches
    /// history rather than trusting this copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

/// Payload of the `is-typing` event on `private-is-typing.{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingSignalEvent {
    pub sender_user_id: i64,
    /// Absent on legacy senders that only ever signal "start".
    #[serde(default = "default_is_typing")]
    pub is_typing: bool,
}

fn default_is_typing() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&MessageType::PropertyRef).unwrap(),
            "\"property_ref\""
        );
        assert_eq!(
            serde_json::from_str::<MessageType>("\"text\"").unwrap(),
            MessageType::Text
        );
    }

    #[test]
    fn send_request_omits_empty_optionals() {
        let req = SendMessageRequest::text(7, "hello");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"receiver_id\":7"));
        assert!(json.contains("\"type\":\"text\""));
        assert!(!json.contains("attachment"));
        assert!(!json.contains("property_ref"));
    }

    #[test]
    fn typing_event_defaults_to_started() {
        let event: TypingSignalEvent =
            serde_json::from_str("{\"sender_user_id\":3}").unwrap();
        assert_eq!(event.sender_user_id, 3);
        assert!(event.is_typing);

        let stop: TypingSignalEvent =
            serde_json::from_str("{\"sender_user_id\":3,\"is_typing\":false}").unwrap();
        assert!(!stop.is_typing);
    }
}

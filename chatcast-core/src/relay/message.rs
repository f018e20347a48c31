use serde::{Deserialize, Serialize};

use crate::upstream::RoomState;

/// Message pushed to every attached subscriber.
///
/// Serialized with a `type` tag so viewers can dispatch on the message kind;
/// exists only for the duration of a broadcast, nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    Connected {
        message: String,
        state: RoomState,
    },
    Disconnected {
        message: String,
    },
    Error {
        message: String,
        error: String,
    },
    ChatMessage {
        user_id: String,
        display_name: String,
        comment: String,
    },
    GiftMessage {
        user_id: String,
        display_name: String,
        gift_name: String,
        repeat_count: u64,
        diamond_count: u64,
        total_value: u64,
        summary: String,
    },
    LikeMessage {
        user_id: String,
        display_name: String,
        like_count: u64,
        total_like_count: u64,
    },
    /// Greeting sent to a single subscriber on attach.
    Status {
        message: String,
    },
}

impl OutboundMessage {
    /// Wire-level message kind, for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Disconnected { .. } => "disconnected",
            Self::Error { .. } => "error",
            Self::ChatMessage { .. } => "chatMessage",
            Self::GiftMessage { .. } => "giftMessage",
            Self::LikeMessage { .. } => "likeMessage",
            Self::Status { .. } => "status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_serialize_with_type_tag() {
        let message = OutboundMessage::ChatMessage {
            user_id: "u1".to_string(),
            display_name: "Alice".to_string(),
            comment: "hi".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "chatMessage");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["displayName"], "Alice");
        assert_eq!(json["comment"], "hi");
    }

    #[test]
    fn test_gift_message_field_names() {
        let message = OutboundMessage::GiftMessage {
            user_id: "u2".to_string(),
            display_name: "u2".to_string(),
            gift_name: "Rose".to_string(),
            repeat_count: 3,
            diamond_count: 5,
            total_value: 15,
            summary: "u2 sent Rose x3 (Total: 15 coins)".to_string(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "giftMessage");
        assert_eq!(json["totalValue"], 15);
        assert_eq!(json["summary"], "u2 sent Rose x3 (Total: 15 coins)");
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let message = OutboundMessage::Status {
            message: "hello".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], message.kind());
    }
}

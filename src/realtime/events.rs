//! Typed realtime events, parsed from wire rows at the adapter boundary.

use serde::Deserialize;
use uuid::Uuid;

use crate::api::notifications::Notification;
use crate::api::sessions::SupportSession;
use crate::error::AppResult;
use crate::models::chat::ChatRow;
use crate::models::message::{Message, MessageRow};

/// Parse a raw message payload pushed by the transport into the domain
/// shape. The transport makes no ordering or uniqueness promises, so the
/// result goes straight into reconciliation.
pub fn parse_message_event(payload: &str) -> AppResult<Message> {
    let row: MessageRow = serde_json::from_str(payload)?;
    Ok(row.into_message())
}

#[derive(Debug, Clone)]
pub enum ChatEvent {
    Upserted(Box<crate::models::chat::Chat>),
    Deleted(Uuid),
}

impl ChatEvent {
    pub fn parse(payload: &str) -> AppResult<Self> {
        #[derive(Deserialize)]
        #[serde(tag = "op", rename_all = "lowercase")]
        enum Wire {
            Upsert { chat: ChatRow },
            Delete { chat_id: Uuid },
        }

        Ok(match serde_json::from_str::<Wire>(payload)? {
            Wire::Upsert { chat } => ChatEvent::Upserted(Box::new(chat.into_chat())),
            Wire::Delete { chat_id } => ChatEvent::Deleted(chat_id),
        })
    }
}

pub type NotificationEvent = Notification;

pub type SessionEvent = SupportSession;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileEvent {
    pub user_id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_event_accepts_wire_row() {
        let payload = r#"{
            "id": "m1",
            "chat_id": "9f1c2b7e-0000-0000-0000-0000000000aa",
            "sender_id": "9f1c2b7e-0000-0000-0000-0000000000bb",
            "content": "checking in",
            "is_read": false,
            "created_at": "2026-01-10T09:30:00Z"
        }"#;

        let message = parse_message_event(payload).unwrap();
        assert_eq!(message.content, "checking in");
        assert!(!message.id.is_local());
    }

    #[test]
    fn test_parse_message_event_rejects_garbage() {
        assert!(parse_message_event("{\"id\": 42}").is_err());
    }

    #[test]
    fn test_chat_event_delete_op() {
        let payload = r#"{"op":"delete","chat_id":"9f1c2b7e-0000-0000-0000-0000000000aa"}"#;
        assert!(matches!(
            ChatEvent::parse(payload).unwrap(),
            ChatEvent::Deleted(_)
        ));
    }
}

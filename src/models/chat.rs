use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::message::{Message, MessageRow};

/// Conversation summary shown in the chat list view.
///
/// `unread_count` is a denormalized counter mutated optimistically on the
/// client; it is forced to 0 whenever the viewing user authored the last
/// message or is the active viewer of the chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub counselor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape from the store (snake_case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub counselor_id: Uuid,
    #[serde(default)]
    pub last_message: Option<MessageRow>,
    #[serde(default)]
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatRow {
    pub fn into_chat(self) -> Chat {
        Chat {
            id: self.id,
            patient_id: self.patient_id,
            counselor_id: self.counselor_id,
            last_message: self.last_message.map(MessageRow::into_message),
            unread_count: self.unread_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mapping_carries_preview() {
        let json = r#"{
            "id": "9f1c2b7e-0000-0000-0000-0000000000aa",
            "patient_id": "9f1c2b7e-0000-0000-0000-0000000000bb",
            "counselor_id": "9f1c2b7e-0000-0000-0000-0000000000cc",
            "unread_count": 3,
            "last_message": {
                "id": "m1",
                "chat_id": "9f1c2b7e-0000-0000-0000-0000000000aa",
                "sender_id": "9f1c2b7e-0000-0000-0000-0000000000bb",
                "content": "see you tomorrow",
                "created_at": "2026-01-10T09:30:00Z"
            },
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-10T09:30:00Z"
        }"#;

        let chat = serde_json::from_str::<ChatRow>(json).unwrap().into_chat();
        assert_eq!(chat.unread_count, 3);
        assert_eq!(
            chat.last_message.unwrap().content,
            "see you tomorrow"
        );
    }
}

//! # Message model
//!
//! A message id is either a durable identifier issued by the backing store or
//! a locally generated placeholder carrying the `temp-` marker. Placeholder
//! entries exist only between an optimistic send and its confirmation; within
//! one chat's in-memory list no two entries ever share a durable id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Prefix marking a client-generated placeholder id.
pub const TEMP_ID_MARKER: &str = "temp-";

/// Content substituted for soft-deleted messages.
pub const DELETED_MESSAGE_PLACEHOLDER: &str = "This message was deleted";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// New unconfirmed local id, marked so it can never collide with a
    /// durable id from the store.
    pub fn local() -> Self {
        Self(format!("{TEMP_ID_MARKER}{}", Uuid::new_v4()))
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(TEMP_ID_MARKER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    File,
    Image,
    System,
}

/// Client-facing message shape (camelCase on the wire to the UI layer).
///
/// `client_ref` is the send-correlation id: every send stamps one so the
/// realtime echo of an own message can be matched to its optimistic
/// placeholder without relying on content heuristics alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactions: Option<HashMap<String, Vec<Uuid>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<MessageId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        self.id.is_local()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Row shape as stored and pushed by the backend (snake_case).
///
/// The same shape arrives over REST and over the realtime channel, so one
/// row type covers both; realtime payloads may omit `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Option<HashMap<String, Vec<Uuid>>>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_ref: Option<String>,
}

impl MessageRow {
    pub fn into_message(self) -> Message {
        Message {
            id: MessageId::from(self.id),
            chat_id: self.chat_id,
            sender_id: self.sender_id,
            content: self.content,
            kind: self.kind,
            file_url: self.file_url,
            is_read: self.is_read,
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
            reactions: self.reactions,
            reply_to_id: self.reply_to_id.map(MessageId::from),
            edited_at: self.edited_at,
            deleted_at: self.deleted_at,
            client_ref: self.client_ref,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_id_carries_marker() {
        let id = MessageId::local();
        assert!(id.is_local());
        assert!(id.as_str().starts_with(TEMP_ID_MARKER));

        let durable = MessageId::from(Uuid::new_v4());
        assert!(!durable.is_local());
    }

    #[test]
    fn test_row_mapping_defaults_updated_at() {
        let json = r#"{
            "id": "9f1c2b7e-0000-0000-0000-000000000001",
            "chat_id": "9f1c2b7e-0000-0000-0000-0000000000aa",
            "sender_id": "9f1c2b7e-0000-0000-0000-0000000000bb",
            "content": "hello",
            "created_at": "2026-01-10T09:30:00Z"
        }"#;

        let row: MessageRow = serde_json::from_str(json).unwrap();
        let message = row.into_message();

        assert_eq!(message.kind, MessageKind::Text);
        assert_eq!(message.updated_at, message.created_at);
        assert!(!message.is_read);
        assert!(message.reactions.is_none());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let row: MessageRow = serde_json::from_str(
            r#"{
                "id": "m1",
                "chat_id": "9f1c2b7e-0000-0000-0000-0000000000aa",
                "sender_id": "9f1c2b7e-0000-0000-0000-0000000000bb",
                "content": "hi",
                "type": "file",
                "file_url": "https://files.test/a.pdf",
                "created_at": "2026-01-10T09:30:00Z"
            }"#,
        )
        .unwrap();

        let value = serde_json::to_value(row.into_message()).unwrap();
        assert_eq!(value["chatId"], "9f1c2b7e-0000-0000-0000-0000000000aa");
        assert_eq!(value["type"], "file");
        assert_eq!(value["fileUrl"], "https://files.test/a.pdf");
        assert!(value.get("deletedAt").is_none());
    }
}

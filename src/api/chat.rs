//! Chat API client.
//!
//! The trait seam exists so the reconciliation session can be exercised
//! against a scripted backend; `HttpChatApi` is the production impl.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::AppResult;
use crate::models::chat::{Chat, ChatRow};
use crate::models::message::{Message, MessageId, MessageKind, MessageRow};

#[derive(Debug, Clone, Default)]
pub struct ChatListQuery {
    pub participant: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ChatPage {
    pub chats: Vec<Chat>,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SendMessage {
    pub chat_id: Uuid,
    pub content: String,
    pub kind: MessageKind,
    pub file_url: Option<String>,
    pub reply_to_id: Option<MessageId>,
}

impl SendMessage {
    pub fn text(chat_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: content.into(),
            kind: MessageKind::Text,
            file_url: None,
            reply_to_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateChat {
    pub patient_id: Uuid,
    pub counselor_id: Uuid,
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn list_chats(&self, query: &ChatListQuery) -> AppResult<ChatPage>;
    async fn get_messages(&self, chat_id: Uuid, query: &HistoryQuery) -> AppResult<Vec<Message>>;
    async fn send_message(&self, draft: &SendMessage, client_ref: &str) -> AppResult<Message>;
    async fn mark_messages_read(
        &self,
        chat_id: Uuid,
        message_ids: Option<&[MessageId]>,
    ) -> AppResult<()>;
    async fn react_to_message(&self, id: &MessageId, emoji: &str) -> AppResult<Message>;
    async fn edit_message(&self, id: &MessageId, content: &str) -> AppResult<Message>;
    async fn delete_message(&self, id: &MessageId) -> AppResult<()>;
    async fn delete_chat(&self, chat_id: Uuid) -> AppResult<()>;
    async fn create_chat(&self, data: &CreateChat) -> AppResult<Chat>;
}

#[derive(Deserialize)]
struct ChatListResponse {
    chats: Vec<ChatRow>,
    total: u64,
}

#[derive(Deserialize)]
struct MessagesResponse {
    messages: Vec<MessageRow>,
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    chat_id: Uuid,
    content: &'a str,
    #[serde(rename = "type")]
    kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_id: Option<&'a str>,
    client_ref: &'a str,
}

#[derive(Serialize)]
struct MarkReadBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    message_ids: Option<Vec<String>>,
    mark_all: bool,
}

#[derive(Serialize)]
struct ReactBody<'a> {
    emoji: &'a str,
}

#[derive(Serialize)]
struct EditBody<'a> {
    content: &'a str,
}

#[derive(Clone)]
pub struct HttpChatApi {
    rest: RestClient,
}

impl HttpChatApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_chats(&self, query: &ChatListQuery) -> AppResult<ChatPage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(participant) = query.participant {
            params.push(("participant", participant.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        let per_page = query.per_page.unwrap_or(self.rest.default_page_size());
        params.push(("per_page", per_page.to_string()));

        let response: ChatListResponse = self.rest.get_json("chats", &params).await?;
        Ok(ChatPage {
            chats: response.chats.into_iter().map(ChatRow::into_chat).collect(),
            total: response.total,
        })
    }

    async fn get_messages(&self, chat_id: Uuid, query: &HistoryQuery) -> AppResult<Vec<Message>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        let limit = query.limit.unwrap_or(self.rest.default_page_size());
        params.push(("limit", limit.to_string()));
        if let Some(before) = query.before {
            params.push(("before", before.to_rfc3339()));
        }

        let response: MessagesResponse = self
            .rest
            .get_json(&format!("chats/{chat_id}/messages"), &params)
            .await?;
        Ok(response
            .messages
            .into_iter()
            .map(MessageRow::into_message)
            .collect())
    }

    async fn send_message(&self, draft: &SendMessage, client_ref: &str) -> AppResult<Message> {
        let body = SendMessageBody {
            chat_id: draft.chat_id,
            content: &draft.content,
            kind: draft.kind,
            file_url: draft.file_url.as_deref(),
            reply_to_id: draft.reply_to_id.as_ref().map(MessageId::as_str),
            client_ref,
        };
        let row: MessageRow = self.rest.post_json("messages", &body).await?;
        Ok(row.into_message())
    }

    async fn mark_messages_read(
        &self,
        chat_id: Uuid,
        message_ids: Option<&[MessageId]>,
    ) -> AppResult<()> {
        let body = MarkReadBody {
            mark_all: message_ids.is_none(),
            message_ids: message_ids
                .map(|ids| ids.iter().map(|id| id.as_str().to_string()).collect()),
        };
        self.rest
            .post_unit(&format!("chats/{chat_id}/read"), &body)
            .await
    }

    async fn react_to_message(&self, id: &MessageId, emoji: &str) -> AppResult<Message> {
        let row: MessageRow = self
            .rest
            .post_json(&format!("messages/{id}/reactions"), &ReactBody { emoji })
            .await?;
        Ok(row.into_message())
    }

    async fn edit_message(&self, id: &MessageId, content: &str) -> AppResult<Message> {
        let row: MessageRow = self
            .rest
            .patch_json(&format!("messages/{id}"), &EditBody { content })
            .await?;
        Ok(row.into_message())
    }

    async fn delete_message(&self, id: &MessageId) -> AppResult<()> {
        self.rest.delete(&format!("messages/{id}")).await
    }

    async fn delete_chat(&self, chat_id: Uuid) -> AppResult<()> {
        self.rest.delete(&format!("chats/{chat_id}")).await
    }

    async fn create_chat(&self, data: &CreateChat) -> AppResult<Chat> {
        let row: ChatRow = self.rest.post_json("chats", data).await?;
        Ok(row.into_chat())
    }
}

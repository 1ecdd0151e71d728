//! # Chat session
//!
//! One `ChatSession` instance owns the complete conversation state for a
//! signed-in user: the chat summary list, the in-memory message list of the
//! single active conversation, and the live subscription feeding it. All of
//! it is instance state behind one lock; every mutation reads whatever the
//! state holds at the moment it runs, so interleaved completions (a send
//! response, a realtime push, a history fetch) cannot clobber each other
//! with stale snapshots.
//!
//! Failure split follows the API contract: send/edit/react/delete failures
//! surface to the caller, read receipts and chat-list refreshes are
//! best-effort and only logged.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::chat::{ChatApi, ChatListQuery, CreateChat, HistoryQuery, SendMessage};
use crate::chat::merge;
use crate::error::AppResult;
use crate::models::chat::Chat;
use crate::models::message::{Message, MessageId, DELETED_MESSAGE_PLACEHOLDER};
use crate::realtime::{EventHub, SubscriberId};

#[derive(Default)]
struct SessionState {
    chats: Vec<Chat>,
    messages: Vec<Message>,
    active_chat: Option<Uuid>,
    loaded_chats: HashSet<Uuid>,
}

/// State plus collaborators shared with spawned tasks (the event pump and
/// fire-and-forget side effects).
struct SessionCore {
    api: Arc<dyn ChatApi>,
    user_id: Uuid,
    state: RwLock<SessionState>,
}

struct LiveFeed {
    chat_id: Uuid,
    subscriber: SubscriberId,
    pump: JoinHandle<()>,
}

pub struct ChatSession {
    core: Arc<SessionCore>,
    hub: EventHub,
    live: Mutex<Option<LiveFeed>>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn ChatApi>, hub: EventHub, user_id: Uuid) -> Self {
        Self {
            core: Arc::new(SessionCore {
                api,
                user_id,
                state: RwLock::new(SessionState::default()),
            }),
            hub,
            live: Mutex::new(None),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.core.user_id
    }

    /// Fetch the conversation summary list from the server.
    pub async fn refresh_chats(&self) -> AppResult<()> {
        SessionCore::refresh_chats_inner(&self.core).await
    }

    /// Switch the active conversation: tear down the old subscription,
    /// subscribe to the new chat, load its history, and clear its unread
    /// badge if it had one. Switching away from a different chat drops that
    /// chat's in-memory messages.
    pub async fn select_chat(&self, chat_id: Uuid) -> AppResult<()> {
        {
            let mut state = self.core.state.write().await;
            if state.active_chat != Some(chat_id) {
                state.messages.clear();
                state.loaded_chats.remove(&chat_id);
            }
            state.active_chat = Some(chat_id);
        }

        {
            let mut live = self.live.lock().await;
            let keep = live.as_ref().is_some_and(|feed| feed.chat_id == chat_id);
            if !keep {
                if let Some(old) = live.take() {
                    old.pump.abort();
                    self.hub.unsubscribe_messages(old.chat_id, old.subscriber).await;
                }

                let mut subscription = self.hub.subscribe_messages(chat_id).await;
                let subscriber = subscription.id;
                let core = Arc::clone(&self.core);
                let pump = tokio::spawn(async move {
                    while let Some(event) = subscription.recv().await {
                        SessionCore::apply_incoming(&core, event).await;
                    }
                });
                *live = Some(LiveFeed {
                    chat_id,
                    subscriber,
                    pump,
                });
            }
        }

        self.load_messages(chat_id, HistoryQuery::default(), false)
            .await?;

        let unread = {
            let state = self.core.state.read().await;
            state
                .chats
                .iter()
                .find(|c| c.id == chat_id)
                .map(|c| c.unread_count)
                .unwrap_or(0)
        };
        if unread > 0 {
            self.mark_messages_read(chat_id, None).await;
        }

        Ok(())
    }

    /// Fetch a page of history for `chat_id`. No-op when the chat is active
    /// and already loaded, unless `force_reload` is set. The fetched page is
    /// merged into the current list (realtime arrivals may already be in it);
    /// a result arriving after the user navigated away is discarded. The
    /// loaded-chat set doubles as the single in-flight gate per chat.
    pub async fn load_messages(
        &self,
        chat_id: Uuid,
        query: HistoryQuery,
        force_reload: bool,
    ) -> AppResult<()> {
        {
            let mut state = self.core.state.write().await;
            if state.active_chat == Some(chat_id)
                && state.loaded_chats.contains(&chat_id)
                && !force_reload
            {
                return Ok(());
            }
            state.loaded_chats.insert(chat_id);
        }

        match self.core.api.get_messages(chat_id, &query).await {
            Ok(fetched) => {
                let mut state = self.core.state.write().await;
                if state.active_chat != Some(chat_id) {
                    tracing::debug!(%chat_id, "discarding history for chat no longer active");
                    return Ok(());
                }
                let current = std::mem::take(&mut state.messages);
                state.messages = merge::merge_history(current, fetched);
                Ok(())
            }
            Err(err) => {
                let mut state = self.core.state.write().await;
                state.loaded_chats.remove(&chat_id);
                Err(err)
            }
        }
    }

    /// Send a message with optimistic local feedback: a temp-id entry appears
    /// in the active list synchronously and the summary preview updates
    /// before the request is issued. On success the temp entry gives way to
    /// the durable message (skipped if the realtime echo beat the response);
    /// on failure the insertion is rolled back and the error surfaces.
    pub async fn send_message(&self, draft: SendMessage) -> AppResult<Message> {
        let client_ref = Uuid::new_v4().to_string();
        let now = Utc::now();
        let temp = Message {
            id: MessageId::local(),
            chat_id: draft.chat_id,
            sender_id: self.core.user_id,
            content: draft.content.clone(),
            kind: draft.kind,
            file_url: draft.file_url.clone(),
            is_read: false,
            created_at: now,
            updated_at: now,
            reactions: None,
            reply_to_id: draft.reply_to_id.clone(),
            edited_at: None,
            deleted_at: None,
            client_ref: Some(client_ref.clone()),
        };
        let temp_id = temp.id.clone();

        let previous_preview = {
            let mut state = self.core.state.write().await;
            if state.active_chat == Some(draft.chat_id) {
                state.messages.push(temp.clone());
            }
            match state.chats.iter_mut().find(|c| c.id == draft.chat_id) {
                Some(chat) => {
                    let previous = chat.last_message.take();
                    chat.last_message = Some(temp.clone());
                    chat.unread_count = 0;
                    chat.updated_at = now;
                    Some(previous)
                }
                None => None,
            }
        };

        match self.core.api.send_message(&draft, &client_ref).await {
            Ok(sent) => {
                let mut state = self.core.state.write().await;
                state.messages.retain(|m| m.id != temp_id);
                if state.active_chat == Some(draft.chat_id)
                    && !state.messages.iter().any(|m| m.id == sent.id)
                {
                    state.messages.push(sent.clone());
                }
                state.messages = merge::reconcile(std::mem::take(&mut state.messages));
                if let Some(chat) = state.chats.iter_mut().find(|c| c.id == draft.chat_id) {
                    if chat.last_message.as_ref().is_some_and(|m| m.id == temp_id) {
                        chat.last_message = Some(sent.clone());
                    }
                }
                Ok(sent)
            }
            Err(err) => {
                let mut state = self.core.state.write().await;
                state.messages.retain(|m| m.id != temp_id);
                if let Some(previous) = previous_preview {
                    if let Some(chat) = state.chats.iter_mut().find(|c| c.id == draft.chat_id) {
                        if chat.last_message.as_ref().is_some_and(|m| m.id == temp_id) {
                            chat.last_message = previous;
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Feed one realtime message event into the session. The subscription
    /// pump calls this for the active chat; it is public so a transport
    /// driver can hand events over directly.
    pub async fn handle_message_event(&self, event: Message) {
        SessionCore::apply_incoming(&self.core, event).await;
    }

    /// Mark a chat's messages read. Non-critical background operation:
    /// failures are logged, never raised.
    pub async fn mark_messages_read(&self, chat_id: Uuid, message_ids: Option<Vec<MessageId>>) {
        if let Err(err) = SessionCore::mark_read_inner(&self.core, chat_id, message_ids).await {
            tracing::warn!(error = %err, %chat_id, "mark messages read failed");
        }
    }

    pub async fn react_to_message(&self, id: &MessageId, emoji: &str) -> AppResult<Message> {
        let updated = self.core.api.react_to_message(id, emoji).await?;
        let mut state = self.core.state.write().await;
        merge::splice_by_id(&mut state.messages, updated.clone());
        Ok(updated)
    }

    pub async fn edit_message(&self, id: &MessageId, content: &str) -> AppResult<Message> {
        let updated = self.core.api.edit_message(id, content).await?;
        {
            let mut state = self.core.state.write().await;
            merge::splice_by_id(&mut state.messages, updated.clone());
            if let Some(chat) = state.chats.iter_mut().find(|c| c.id == updated.chat_id) {
                if chat.last_message.as_ref().is_some_and(|m| m.id == updated.id) {
                    chat.last_message = Some(updated.clone());
                }
            }
        }
        self.spawn_chat_list_refresh();
        Ok(updated)
    }

    /// Soft delete: the entry stays in the list at its position with its
    /// content swapped for the placeholder and `deleted_at` stamped.
    pub async fn delete_message(&self, id: &MessageId) -> AppResult<()> {
        self.core.api.delete_message(id).await?;
        {
            let mut state = self.core.state.write().await;
            if let Some(message) = state.messages.iter_mut().find(|m| &m.id == id) {
                message.content = DELETED_MESSAGE_PLACEHOLDER.to_string();
                message.deleted_at = Some(Utc::now());
            }
        }
        self.spawn_chat_list_refresh();
        Ok(())
    }

    pub async fn delete_chat(&self, chat_id: Uuid) -> AppResult<()> {
        self.core.api.delete_chat(chat_id).await?;
        let was_active = {
            let mut state = self.core.state.write().await;
            state.chats.retain(|c| c.id != chat_id);
            state.loaded_chats.remove(&chat_id);
            if state.active_chat == Some(chat_id) {
                state.active_chat = None;
                state.messages.clear();
                true
            } else {
                false
            }
        };
        if was_active {
            self.release_feed().await;
        }
        self.spawn_chat_list_refresh();
        Ok(())
    }

    pub async fn create_chat(&self, data: &CreateChat) -> AppResult<Chat> {
        let chat = self.core.api.create_chat(data).await?;
        let mut state = self.core.state.write().await;
        if !state.chats.iter().any(|c| c.id == chat.id) {
            state.chats.insert(0, chat.clone());
        }
        Ok(chat)
    }

    /// Release the live subscription. Called on shutdown; chat switches do
    /// their own swap.
    pub async fn shutdown(&self) {
        self.release_feed().await;
    }

    // -- snapshots for the presentation layer --

    pub async fn messages(&self) -> Vec<Message> {
        self.core.state.read().await.messages.clone()
    }

    pub async fn chats(&self) -> Vec<Chat> {
        self.core.state.read().await.chats.clone()
    }

    pub async fn active_chat(&self) -> Option<Uuid> {
        self.core.state.read().await.active_chat
    }

    async fn release_feed(&self) {
        let mut live = self.live.lock().await;
        if let Some(old) = live.take() {
            old.pump.abort();
            self.hub.unsubscribe_messages(old.chat_id, old.subscriber).await;
        }
    }

    fn spawn_chat_list_refresh(&self) {
        let core = Arc::clone(&self.core);
        tokio::spawn(async move {
            if let Err(err) = SessionCore::refresh_chats_inner(&core).await {
                tracing::warn!(error = %err, "chat list refresh failed");
            }
        });
    }
}

impl SessionCore {
    async fn refresh_chats_inner(core: &Arc<SessionCore>) -> AppResult<()> {
        let page = core.api.list_chats(&ChatListQuery::default()).await?;
        let mut state = core.state.write().await;
        state.chats = page.chats;

        // Server counters can lag the client's view; the invariant is that
        // the active chat and chats whose preview the user authored show
        // zero unread.
        let active = state.active_chat;
        for chat in &mut state.chats {
            let own_preview = chat
                .last_message
                .as_ref()
                .is_some_and(|m| m.sender_id == core.user_id);
            if own_preview || active == Some(chat.id) {
                chat.unread_count = 0;
            }
        }
        Ok(())
    }

    /// Reconcile one pushed event into the message list and the summary
    /// list. Events for the active chat from other users trigger a
    /// fire-and-forget read receipt.
    async fn apply_incoming(core: &Arc<SessionCore>, incoming: Message) {
        let chat_id = incoming.chat_id;
        let sender_id = incoming.sender_id;
        let message_id = incoming.id.clone();
        let created_at = incoming.created_at;
        let from_self = sender_id == core.user_id;

        let is_active = {
            let mut state = core.state.write().await;
            let is_active = state.active_chat == Some(chat_id);
            if is_active {
                merge::apply_event(&mut state.messages, incoming.clone());
            }
            if let Some(chat) = state.chats.iter_mut().find(|c| c.id == chat_id) {
                chat.last_message = Some(incoming);
                chat.updated_at = created_at;
                if from_self || is_active {
                    chat.unread_count = 0;
                } else {
                    chat.unread_count += 1;
                }
            }
            is_active
        };

        if is_active && !from_self {
            let core = Arc::clone(core);
            tokio::spawn(async move {
                if let Err(err) =
                    SessionCore::mark_read_inner(&core, chat_id, Some(vec![message_id])).await
                {
                    tracing::warn!(error = %err, %chat_id, "best-effort read receipt failed");
                }
            });
        }
    }

    async fn mark_read_inner(
        core: &Arc<SessionCore>,
        chat_id: Uuid,
        message_ids: Option<Vec<MessageId>>,
    ) -> AppResult<()> {
        core.api
            .mark_messages_read(chat_id, message_ids.as_deref())
            .await?;

        // Local state flips only after the server acknowledged.
        let mut state = core.state.write().await;
        if let Some(chat) = state.chats.iter_mut().find(|c| c.id == chat_id) {
            chat.unread_count = 0;
        }
        for message in state
            .messages
            .iter_mut()
            .filter(|m| m.chat_id == chat_id && !m.is_read)
        {
            let targeted = message_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&message.id));
            if targeted {
                message.is_read = true;
            }
        }
        Ok(())
    }
}

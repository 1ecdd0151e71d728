//! Typed realtime subscription adapter.
//!
//! Wraps the external pub/sub transport behind per-topic registries: a
//! subscriber gets a `(stream, cancel)` pair scoped to one identifier, and
//! the hub owns fanout and cleanup. The transport guarantees neither ordering
//! nor deduplication; imposing both is the reconciliation layer's job.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::message::Message;

pub mod events;

pub use events::{parse_message_event, ChatEvent, NotificationEvent, ProfileEvent, SessionEvent};

/// Unique identifier for a hub subscriber.
///
/// Each subscription gets its own id so teardown can remove exactly one
/// entry when several listeners share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

struct Subscriber<E> {
    id: SubscriberId,
    sender: UnboundedSender<E>,
}

/// Receiving half of a subscription, paired with the id needed to cancel it.
pub struct Subscription<E> {
    pub id: SubscriberId,
    receiver: UnboundedReceiver<E>,
}

impl<E> Subscription<E> {
    pub async fn recv(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    pub fn into_stream(self) -> UnboundedReceiverStream<E> {
        UnboundedReceiverStream::new(self.receiver)
    }
}

/// One event family fanned out per key (chat id or user id).
struct Topic<E> {
    inner: Arc<RwLock<HashMap<Uuid, Vec<Subscriber<E>>>>>,
}

impl<E> Clone for Topic<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<E: Clone + Send + 'static> Topic<E> {
    async fn subscribe(&self, key: Uuid) -> Subscription<E> {
        let (tx, rx) = unbounded_channel();
        let id = SubscriberId::new();

        let mut guard = self.inner.write().await;
        guard
            .entry(key)
            .or_default()
            .push(Subscriber { id, sender: tx });

        tracing::debug!(
            "added subscriber {:?} for {}, total: {}",
            id,
            key,
            guard.get(&key).map(|v| v.len()).unwrap_or(0)
        );

        Subscription { id, receiver: rx }
    }

    async fn unsubscribe(&self, key: Uuid, id: SubscriberId) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&key) {
            subscribers.retain(|s| s.id != id);
            if subscribers.is_empty() {
                guard.remove(&key);
            }
        }
    }

    /// Fan out to every live subscriber of `key`; dead senders are dropped.
    async fn publish(&self, key: Uuid, event: E) {
        let mut guard = self.inner.write().await;
        if let Some(subscribers) = guard.get_mut(&key) {
            let before = subscribers.len();
            subscribers.retain(|s| s.sender.send(event.clone()).is_ok());
            let after = subscribers.len();
            if before != after {
                tracing::debug!(
                    "publish to {}: {} dead subscribers cleaned up, {} active",
                    key,
                    before - after,
                    after
                );
            }
            if subscribers.is_empty() {
                guard.remove(&key);
            }
        }
    }

    async fn subscriber_count(&self, key: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&key).map(|v| v.len()).unwrap_or(0)
    }
}

/// Fanout hub for the five realtime event families: messages per chat, and
/// chat / notification / session / profile updates per user.
#[derive(Clone, Default)]
pub struct EventHub {
    messages: Topic<Message>,
    chats: Topic<ChatEvent>,
    notifications: Topic<NotificationEvent>,
    sessions: Topic<SessionEvent>,
    profiles: Topic<ProfileEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    // -- messages (keyed by chat id) --

    pub async fn subscribe_messages(&self, chat_id: Uuid) -> Subscription<Message> {
        self.messages.subscribe(chat_id).await
    }

    pub async fn unsubscribe_messages(&self, chat_id: Uuid, id: SubscriberId) {
        self.messages.unsubscribe(chat_id, id).await
    }

    pub async fn publish_message(&self, chat_id: Uuid, message: Message) {
        self.messages.publish(chat_id, message).await
    }

    /// Entry point for the transport driver: raw row payload in, validated
    /// domain event fanned out.
    pub async fn publish_message_payload(&self, chat_id: Uuid, payload: &str) -> AppResult<()> {
        let message = parse_message_event(payload)?;
        self.publish_message(chat_id, message).await;
        Ok(())
    }

    pub async fn message_subscriber_count(&self, chat_id: Uuid) -> usize {
        self.messages.subscriber_count(chat_id).await
    }

    // -- chat summary updates (keyed by user id) --

    pub async fn subscribe_chat_updates(&self, user_id: Uuid) -> Subscription<ChatEvent> {
        self.chats.subscribe(user_id).await
    }

    pub async fn unsubscribe_chat_updates(&self, user_id: Uuid, id: SubscriberId) {
        self.chats.unsubscribe(user_id, id).await
    }

    pub async fn publish_chat_update(&self, user_id: Uuid, event: ChatEvent) {
        self.chats.publish(user_id, event).await
    }

    // -- notifications (keyed by user id) --

    pub async fn subscribe_notifications(&self, user_id: Uuid) -> Subscription<NotificationEvent> {
        self.notifications.subscribe(user_id).await
    }

    pub async fn unsubscribe_notifications(&self, user_id: Uuid, id: SubscriberId) {
        self.notifications.unsubscribe(user_id, id).await
    }

    pub async fn publish_notification(&self, user_id: Uuid, event: NotificationEvent) {
        self.notifications.publish(user_id, event).await
    }

    // -- session updates (keyed by user id) --

    pub async fn subscribe_sessions(&self, user_id: Uuid) -> Subscription<SessionEvent> {
        self.sessions.subscribe(user_id).await
    }

    pub async fn unsubscribe_sessions(&self, user_id: Uuid, id: SubscriberId) {
        self.sessions.unsubscribe(user_id, id).await
    }

    pub async fn publish_session(&self, user_id: Uuid, event: SessionEvent) {
        self.sessions.publish(user_id, event).await
    }

    // -- profile changes (keyed by user id) --

    pub async fn subscribe_profile(&self, user_id: Uuid) -> Subscription<ProfileEvent> {
        self.profiles.subscribe(user_id).await
    }

    pub async fn unsubscribe_profile(&self, user_id: Uuid, id: SubscriberId) {
        self.profiles.unsubscribe(user_id, id).await
    }

    pub async fn publish_profile(&self, user_id: Uuid, event: ProfileEvent) {
        self.profiles.publish(user_id, event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::message::{MessageId, MessageKind};

    fn sample_message(chat_id: Uuid) -> Message {
        Message {
            id: MessageId::from(Uuid::new_v4()),
            chat_id,
            sender_id: Uuid::new_v4(),
            content: "hi".into(),
            kind: MessageKind::Text,
            file_url: None,
            is_read: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            reactions: None,
            reply_to_id: None,
            edited_at: None,
            deleted_at: None,
            client_ref: None,
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = EventHub::new();
        let chat_id = Uuid::new_v4();
        let mut sub = hub.subscribe_messages(chat_id).await;

        hub.publish_message(chat_id, sample_message(chat_id)).await;

        let event = sub.recv().await.unwrap();
        assert_eq!(event.content, "hi");
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_entry() {
        let hub = EventHub::new();
        let chat_id = Uuid::new_v4();
        let sub = hub.subscribe_messages(chat_id).await;
        assert_eq!(hub.message_subscriber_count(chat_id).await, 1);

        hub.unsubscribe_messages(chat_id, sub.id).await;
        assert_eq!(hub.message_subscriber_count(chat_id).await, 0);
    }

    #[tokio::test]
    async fn test_dead_subscriber_cleaned_on_publish() {
        let hub = EventHub::new();
        let chat_id = Uuid::new_v4();
        let sub = hub.subscribe_messages(chat_id).await;
        drop(sub);

        hub.publish_message(chat_id, sample_message(chat_id)).await;
        assert_eq!(hub.message_subscriber_count(chat_id).await, 0);
    }

    #[tokio::test]
    async fn test_subscriptions_are_scoped_per_chat() {
        let hub = EventHub::new();
        let chat_a = Uuid::new_v4();
        let chat_b = Uuid::new_v4();
        let mut sub_a = hub.subscribe_messages(chat_a).await;

        hub.publish_message(chat_b, sample_message(chat_b)).await;
        hub.publish_message(chat_a, sample_message(chat_a)).await;

        let event = sub_a.recv().await.unwrap();
        assert_eq!(event.chat_id, chat_a);
    }
}

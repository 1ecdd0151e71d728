use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::chat::{ChatApi, ChatListQuery};
use crate::models::chat::Chat;
use crate::views::Loadable;

/// Chat list widget state for the dashboard: the summaries plus the total
/// unread count across them.
pub struct ChatSummaryView {
    api: Arc<dyn ChatApi>,
    user_id: Uuid,
    state: RwLock<Loadable<Vec<Chat>>>,
}

impl ChatSummaryView {
    pub fn new(api: Arc<dyn ChatApi>, user_id: Uuid) -> Self {
        Self {
            api,
            user_id,
            state: RwLock::new(Loadable::default()),
        }
    }

    pub async fn refresh(&self) {
        self.state.write().await.begin();
        let query = ChatListQuery {
            participant: Some(self.user_id),
            ..ChatListQuery::default()
        };
        let result = self.api.list_chats(&query).await.map(|page| page.chats);
        self.state.write().await.resolve(result);
    }

    pub async fn snapshot(&self) -> Loadable<Vec<Chat>> {
        self.state.read().await.clone()
    }

    pub async fn total_unread(&self) -> u32 {
        self.state
            .read()
            .await
            .data
            .as_ref()
            .map(|chats| chats.iter().map(|c| c.unread_count).sum())
            .unwrap_or(0)
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::sessions::{SessionStats, SessionsApi};
use crate::error::AppResult;
use crate::views::Loadable;

#[async_trait]
pub trait SessionStatsSource: Send + Sync {
    async fn session_stats(&self, user_id: Uuid) -> AppResult<SessionStats>;
}

#[async_trait]
impl SessionStatsSource for SessionsApi {
    async fn session_stats(&self, user_id: Uuid) -> AppResult<SessionStats> {
        SessionsApi::session_stats(self, user_id).await
    }
}

pub struct SessionStatsView<S: SessionStatsSource> {
    source: Arc<S>,
    user_id: Uuid,
    state: RwLock<Loadable<SessionStats>>,
}

impl<S: SessionStatsSource> SessionStatsView<S> {
    pub fn new(source: Arc<S>, user_id: Uuid) -> Self {
        Self {
            source,
            user_id,
            state: RwLock::new(Loadable::default()),
        }
    }

    pub async fn refresh(&self) {
        self.state.write().await.begin();
        let result = self.source.session_stats(self.user_id).await;
        self.state.write().await.resolve(result);
    }

    pub async fn snapshot(&self) -> Loadable<SessionStats> {
        self.state.read().await.clone()
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::progress::{ProgressApi, ProgressSummary};
use crate::error::AppResult;
use crate::views::Loadable;

#[async_trait]
pub trait ProgressSource: Send + Sync {
    async fn progress_summary(&self, user_id: Uuid) -> AppResult<ProgressSummary>;
}

#[async_trait]
impl ProgressSource for ProgressApi {
    async fn progress_summary(&self, user_id: Uuid) -> AppResult<ProgressSummary> {
        ProgressApi::progress_summary(self, user_id).await
    }
}

pub struct ProgressView<S: ProgressSource> {
    source: Arc<S>,
    user_id: Uuid,
    state: RwLock<Loadable<ProgressSummary>>,
}

impl<S: ProgressSource> ProgressView<S> {
    pub fn new(source: Arc<S>, user_id: Uuid) -> Self {
        Self {
            source,
            user_id,
            state: RwLock::new(Loadable::default()),
        }
    }

    pub async fn refresh(&self) {
        self.state.write().await.begin();
        let result = self.source.progress_summary(self.user_id).await;
        self.state.write().await.resolve(result);
    }

    pub async fn snapshot(&self) -> Loadable<ProgressSummary> {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubSource {
        fail: AtomicBool,
    }

    #[async_trait]
    impl ProgressSource for StubSource {
        async fn progress_summary(&self, _user_id: Uuid) -> AppResult<ProgressSummary> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Api {
                    status: 500,
                    message: "summary unavailable".into(),
                });
            }
            Ok(ProgressSummary {
                streak_days: 4,
                average_mood: 6.5,
                entries_this_week: 5,
            })
        }
    }

    #[tokio::test]
    async fn test_refresh_resolves_data_then_keeps_it_on_error() {
        let source = Arc::new(StubSource {
            fail: AtomicBool::new(false),
        });
        let view = ProgressView::new(Arc::clone(&source), Uuid::new_v4());

        view.refresh().await;
        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.data.as_ref().unwrap().streak_days, 4);
        assert!(snapshot.error.is_none());

        source.fail.store(true, Ordering::SeqCst);
        view.refresh().await;
        let snapshot = view.snapshot().await;
        assert!(snapshot.data.is_some());
        assert!(snapshot.error.as_deref().unwrap().contains("summary unavailable"));
    }
}

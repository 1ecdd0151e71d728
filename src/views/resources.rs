use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::resources::{ResourceMetrics, ResourcesApi};
use crate::error::AppResult;
use crate::views::Loadable;

#[async_trait]
pub trait ResourceMetricsSource: Send + Sync {
    async fn resource_metrics(&self) -> AppResult<ResourceMetrics>;
}

#[async_trait]
impl ResourceMetricsSource for ResourcesApi {
    async fn resource_metrics(&self) -> AppResult<ResourceMetrics> {
        ResourcesApi::resource_metrics(self).await
    }
}

pub struct ResourceMetricsView<S: ResourceMetricsSource> {
    source: Arc<S>,
    state: RwLock<Loadable<ResourceMetrics>>,
}

impl<S: ResourceMetricsSource> ResourceMetricsView<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: RwLock::new(Loadable::default()),
        }
    }

    pub async fn refresh(&self) {
        self.state.write().await.begin();
        let result = self.source.resource_metrics().await;
        self.state.write().await.resolve(result);
    }

    pub async fn snapshot(&self) -> Loadable<ResourceMetrics> {
        self.state.read().await.clone()
    }
}

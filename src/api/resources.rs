use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::AppResult;

/// Entry in the self-help resource library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub kind: ResourceKind,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Article,
    Video,
    Audio,
    Worksheet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub total: u64,
    pub views: u64,
    pub by_category: HashMap<String, u64>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResourceRow {
    id: Uuid,
    title: String,
    category: String,
    kind: ResourceKind,
    url: String,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct MetricsRow {
    total: u64,
    views: u64,
    #[serde(default)]
    by_category: HashMap<String, u64>,
}

impl ResourceRow {
    fn into_resource(self) -> Resource {
        Resource {
            id: self.id,
            title: self.title,
            category: self.category,
            kind: self.kind,
            url: self.url,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ResourcesApi {
    rest: RestClient,
}

impl ResourcesApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn list_resources(&self, query: &ResourceQuery) -> AppResult<Vec<Resource>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        params.push(("per_page", self.rest.default_page_size().to_string()));

        let rows: Vec<ResourceRow> = self.rest.get_json("resources", &params).await?;
        Ok(rows.into_iter().map(ResourceRow::into_resource).collect())
    }

    pub async fn get_resource(&self, id: Uuid) -> AppResult<Resource> {
        let row: ResourceRow = self.rest.get_json(&format!("resources/{id}"), &[]).await?;
        Ok(row.into_resource())
    }

    pub async fn resource_metrics(&self) -> AppResult<ResourceMetrics> {
        let row: MetricsRow = self.rest.get_json("resources/metrics", &[]).await?;
        Ok(ResourceMetrics {
            total: row.total,
            views: row.views,
            by_category: row.by_category,
        })
    }
}

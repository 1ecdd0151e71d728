use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Counselor,
    Admin,
}

impl UserRole {
    fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Counselor => "counselor",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: u64,
    pub active_chats: u64,
    pub sessions_this_week: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct AdminUserRow {
    id: Uuid,
    email: String,
    display_name: String,
    role: UserRole,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct PlatformStatsRow {
    total_users: u64,
    active_chats: u64,
    sessions_this_week: u64,
}

#[derive(Clone)]
pub struct AdminApi {
    rest: RestClient,
}

impl AdminApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn list_users(
        &self,
        role: Option<UserRole>,
        page: Option<u32>,
    ) -> AppResult<Vec<AdminUserSummary>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(role) = role {
            params.push(("role", role.as_str().to_string()));
        }
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        params.push(("per_page", self.rest.default_page_size().to_string()));

        let rows: Vec<AdminUserRow> = self.rest.get_json("admin/users", &params).await?;
        Ok(rows
            .into_iter()
            .map(|row| AdminUserSummary {
                id: row.id,
                email: row.email,
                display_name: row.display_name,
                role: row.role,
                created_at: row.created_at,
            })
            .collect())
    }

    pub async fn platform_stats(&self) -> AppResult<PlatformStats> {
        let row: PlatformStatsRow = self.rest.get_json("admin/stats", &[]).await?;
        Ok(PlatformStats {
            total_users: row.total_users,
            active_chats: row.active_chats,
            sessions_this_week: row.sessions_this_week,
        })
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    body: String,
    kind: String,
    #[serde(default)]
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            body: self.body,
            kind: self.kind,
            is_read: self.is_read,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Clone)]
pub struct NotificationsApi {
    rest: RestClient,
}

impl NotificationsApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let mut params = vec![("user", user_id.to_string())];
        if unread_only {
            params.push(("unread", "true".to_string()));
        }
        let rows: Vec<NotificationRow> = self.rest.get_json("notifications", &params).await?;
        Ok(rows
            .into_iter()
            .map(NotificationRow::into_notification)
            .collect())
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> AppResult<()> {
        self.rest
            .post_unit(&format!("notifications/{id}/read"), &Empty {})
            .await
    }

    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> AppResult<()> {
        self.rest
            .post_unit(
                "notifications/read-all",
                &serde_json::json!({ "user_id": user_id }),
            )
            .await
    }
}

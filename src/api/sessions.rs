use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A scheduled counseling session between a patient and a counselor.
/// `video_url` is filled in by the conferencing provider once the room exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportSession {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub counselor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub upcoming: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookSession {
    pub counselor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionRow {
    id: Uuid,
    patient_id: Uuid,
    counselor_id: Uuid,
    scheduled_at: DateTime<Utc>,
    status: SessionStatus,
    #[serde(default)]
    video_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SessionStatsRow {
    upcoming: u64,
    completed: u64,
    cancelled: u64,
}

impl SessionRow {
    fn into_session(self) -> SupportSession {
        SupportSession {
            id: self.id,
            patient_id: self.patient_id,
            counselor_id: self.counselor_id,
            scheduled_at: self.scheduled_at,
            status: self.status,
            video_url: self.video_url,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SessionsApi {
    rest: RestClient,
}

impl SessionsApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn list_sessions(&self, user_id: Uuid) -> AppResult<Vec<SupportSession>> {
        let rows: Vec<SessionRow> = self
            .rest
            .get_json("sessions", &[("user", user_id.to_string())])
            .await?;
        Ok(rows.into_iter().map(SessionRow::into_session).collect())
    }

    pub async fn book_session(&self, booking: &BookSession) -> AppResult<SupportSession> {
        let row: SessionRow = self.rest.post_json("sessions", booking).await?;
        Ok(row.into_session())
    }

    pub async fn cancel_session(&self, id: Uuid) -> AppResult<()> {
        self.rest.delete(&format!("sessions/{id}")).await
    }

    pub async fn session_stats(&self, user_id: Uuid) -> AppResult<SessionStats> {
        let row: SessionStatsRow = self
            .rest
            .get_json(&format!("sessions/{user_id}/stats"), &[])
            .await?;
        Ok(SessionStats {
            upcoming: row.upcoming,
            completed: row.completed,
            cancelled: row.cancelled,
        })
    }
}

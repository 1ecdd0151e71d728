use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::{AppError, AppResult};

/// A single mood check-in recorded by a patient. Scores run 1..=10.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub streak_days: u32,
    pub average_mood: f32,
    pub entries_this_week: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct MoodEntryRow {
    id: Uuid,
    user_id: Uuid,
    score: i16,
    #[serde(default)]
    note: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ProgressSummaryRow {
    streak_days: u32,
    average_mood: f32,
    entries_this_week: u32,
}

#[derive(Serialize)]
struct RecordMoodBody<'a> {
    score: i16,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

impl MoodEntryRow {
    fn into_entry(self) -> MoodEntry {
        MoodEntry {
            id: self.id,
            user_id: self.user_id,
            score: self.score,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ProgressApi {
    rest: RestClient,
}

impl ProgressApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub async fn list_mood_entries(&self, user_id: Uuid) -> AppResult<Vec<MoodEntry>> {
        let rows: Vec<MoodEntryRow> = self
            .rest
            .get_json("mood-entries", &[("user", user_id.to_string())])
            .await?;
        Ok(rows.into_iter().map(MoodEntryRow::into_entry).collect())
    }

    pub async fn record_mood(&self, score: i16, note: Option<&str>) -> AppResult<MoodEntry> {
        if !(1..=10).contains(&score) {
            return Err(AppError::BadRequest(format!(
                "mood score must be between 1 and 10, got {score}"
            )));
        }
        let row: MoodEntryRow = self
            .rest
            .post_json("mood-entries", &RecordMoodBody { score, note })
            .await?;
        Ok(row.into_entry())
    }

    pub async fn progress_summary(&self, user_id: Uuid) -> AppResult<ProgressSummary> {
        let row: ProgressSummaryRow = self
            .rest
            .get_json(&format!("progress/{user_id}/summary"), &[])
            .await?;
        Ok(ProgressSummary {
            streak_days: row.streak_days,
            average_mood: row.average_mood,
            entries_this_week: row.entries_this_week,
        })
    }
}

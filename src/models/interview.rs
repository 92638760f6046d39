use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Interviews per candidate are capped at two rounds.
pub const MAX_INTERVIEW_ORDER: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_progress", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterviewProgress {
    Waiting,
    Done,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateInterview {
    pub id: Uuid,
    pub candidate_id: Uuid,
    #[sqlx(rename = "interview_order")]
    #[serde(rename = "order")]
    pub order: i32,
    pub progress: InterviewProgress,
    pub interview_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

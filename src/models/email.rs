use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per dispatched communication.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateEmail {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub template: String,
    pub date_time: DateTime<Utc>,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

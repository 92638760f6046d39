use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::candidate::CandidateStatus;

/// Append-only audit trail of candidate status changes. Rows are written in
/// the same transaction as the status update and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateInterviewHistory {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub status: CandidateStatus,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

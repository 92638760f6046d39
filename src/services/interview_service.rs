use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::interview_dto::UpdateInterviewPayload;
use crate::error::{Error, Result};
use crate::models::interview::{CandidateInterview, MAX_INTERVIEW_ORDER};

/// Owns the interview sequence of a candidate: a gapless order starting at 1
/// and capped at `MAX_INTERVIEW_ORDER`. New interviews are only ever created
/// through `schedule_next`, inside the dispatch transaction.
#[derive(Clone)]
pub struct InterviewService {
    pool: PgPool,
}

impl InterviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn most_recent(&self, candidate_id: Uuid) -> Result<Option<CandidateInterview>> {
        let interview = sqlx::query_as::<_, CandidateInterview>(
            r#"SELECT * FROM candidate_interviews
               WHERE candidate_id = $1 AND deleted_at IS NULL
               ORDER BY interview_order DESC, created_at DESC
               LIMIT 1"#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(interview)
    }

    /// The order the next interview would take, or `OverLimit` when the
    /// candidate already sits at the cap. Used by the coordinator to refuse
    /// a dispatch before any external call is made.
    pub async fn next_order(&self, candidate_id: Uuid) -> Result<i32> {
        let order = self
            .most_recent(candidate_id)
            .await?
            .map(|interview| interview.order + 1)
            .unwrap_or(1);
        if order > MAX_INTERVIEW_ORDER {
            return Err(Error::OverLimit(format!(
                "Candidate {} already has {} scheduled interviews",
                candidate_id, MAX_INTERVIEW_ORDER
            )));
        }
        Ok(order)
    }

    /// Inserts the next interview for the candidate inside the caller's
    /// transaction. The order is recomputed here so the bound holds even if
    /// a concurrent dispatch slipped in after the pre-check.
    pub async fn schedule_next(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        candidate_id: Uuid,
        interview_at: DateTime<Utc>,
        note: Option<String>,
        actor: Option<Uuid>,
    ) -> Result<CandidateInterview> {
        let last: Option<i32> = sqlx::query_scalar(
            r#"SELECT interview_order FROM candidate_interviews
               WHERE candidate_id = $1 AND deleted_at IS NULL
               ORDER BY interview_order DESC, created_at DESC
               LIMIT 1"#,
        )
        .bind(candidate_id)
        .fetch_optional(&mut **tx)
        .await?;

        let order = last.map(|o| o + 1).unwrap_or(1);
        if order > MAX_INTERVIEW_ORDER {
            return Err(Error::OverLimit(format!(
                "Candidate {} already has {} scheduled interviews",
                candidate_id, MAX_INTERVIEW_ORDER
            )));
        }

        let interview = sqlx::query_as::<_, CandidateInterview>(
            r#"INSERT INTO candidate_interviews
                   (candidate_id, interview_order, interview_at, note, created_by, updated_by)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING *"#,
        )
        .bind(candidate_id)
        .bind(order)
        .bind(interview_at)
        .bind(note)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await?;
        Ok(interview)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: UpdateInterviewPayload,
        actor: Option<Uuid>,
    ) -> Result<CandidateInterview> {
        let interview = sqlx::query_as::<_, CandidateInterview>(
            r#"UPDATE candidate_interviews
               SET progress = COALESCE($1, progress),
                   interview_at = COALESCE($2, interview_at),
                   note = COALESCE($3, note),
                   updated_by = $4,
                   updated_at = NOW()
               WHERE id = $5 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(payload.progress)
        .bind(payload.interview_at)
        .bind(payload.note)
        .bind(actor)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        interview.ok_or_else(|| Error::NotFound("Interview not found".to_string()))
    }

    pub async fn list_for_candidate(&self, candidate_id: Uuid) -> Result<Vec<CandidateInterview>> {
        let interviews = sqlx::query_as::<_, CandidateInterview>(
            r#"SELECT * FROM candidate_interviews
               WHERE candidate_id = $1 AND deleted_at IS NULL
               ORDER BY interview_order ASC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(interviews)
    }
}

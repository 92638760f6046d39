use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::candidate_dto::CreateCandidatePayload;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::email::CandidateEmail;
use crate::models::history::CandidateInterviewHistory;
use crate::workflow::transitions::TransitionTable;

/// Persistence boundary for candidates and the rows they own. All active-row
/// reads filter soft-deleted records; history rows are exempt from deletion.
#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
    transitions: Arc<TransitionTable>,
}

impl CandidateService {
    pub fn new(pool: PgPool, transitions: Arc<TransitionTable>) -> Self {
        Self { pool, transitions }
    }

    pub async fn create(
        &self,
        payload: CreateCandidatePayload,
        actor: Option<Uuid>,
    ) -> Result<Candidate> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"
            INSERT INTO candidates
                (name, email, phone, birthday, cv_file_id, avatar_id,
                 gender, level, resource, applied_position, note,
                 created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.phone)
        .bind(payload.birthday)
        .bind(payload.cv_file_id)
        .bind(payload.avatar_id)
        .bind(payload.gender)
        .bind(payload.level)
        .bind(payload.resource)
        .bind(payload.applied_position)
        .bind(payload.note)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;
        Ok(candidate)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"SELECT * FROM candidates WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    pub async fn list(&self) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(
            r#"SELECT * FROM candidates WHERE deleted_at IS NULL ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(candidates)
    }

    /// Direct status update. The transition is checked against the adjacency
    /// table; the new status and its history row commit together.
    pub async fn update_status(
        &self,
        id: Uuid,
        next: CandidateStatus,
        note: Option<String>,
        actor: Option<Uuid>,
    ) -> Result<Candidate> {
        let candidate = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        if !self.transitions.is_allowed(candidate.status, next) {
            return Err(Error::StateConflict(format!(
                "Transition {} -> {} is not allowed",
                candidate.status.as_str(),
                next.as_str()
            )));
        }

        let mut tx = self.pool.begin().await?;
        let updated = self.set_status(&mut tx, id, next, actor).await?;
        self.insert_history(&mut tx, id, next, note, actor).await?;
        tx.commit().await?;

        tracing::info!(
            "Candidate {} moved {} -> {}",
            id,
            candidate.status.as_str(),
            next.as_str()
        );
        Ok(updated)
    }

    /// Soft-deletes the candidate together with its interviews and emails in
    /// one transaction. History rows are left untouched: the audit trail
    /// outlives the candidate.
    pub async fn soft_delete(&self, id: Uuid, actor: Option<Uuid>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE candidates
               SET deleted_at = NOW(), deleted_by = $1, updated_at = NOW()
               WHERE id = $2 AND deleted_at IS NULL"#,
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Candidate not found".to_string()));
        }

        sqlx::query(
            r#"UPDATE candidate_interviews
               SET deleted_at = NOW(), deleted_by = $1, updated_at = NOW()
               WHERE candidate_id = $2 AND deleted_at IS NULL"#,
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"UPDATE candidate_emails
               SET deleted_at = NOW(), deleted_by = $1, updated_at = NOW()
               WHERE candidate_id = $2 AND deleted_at IS NULL"#,
        )
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn history(&self, candidate_id: Uuid) -> Result<Vec<CandidateInterviewHistory>> {
        let rows = sqlx::query_as::<_, CandidateInterviewHistory>(
            r#"SELECT * FROM candidate_interview_histories
               WHERE candidate_id = $1
               ORDER BY created_at DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn emails(&self, candidate_id: Uuid) -> Result<Vec<CandidateEmail>> {
        let rows = sqlx::query_as::<_, CandidateEmail>(
            r#"SELECT * FROM candidate_emails
               WHERE candidate_id = $1 AND deleted_at IS NULL
               ORDER BY date_time DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Transaction-scoped writers shared with the dispatch coordinator.

    pub async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: CandidateStatus,
        actor: Option<Uuid>,
    ) -> Result<Candidate> {
        let candidate = sqlx::query_as::<_, Candidate>(
            r#"UPDATE candidates
               SET status = $1, updated_by = $2, updated_at = NOW()
               WHERE id = $3 AND deleted_at IS NULL
               RETURNING *"#,
        )
        .bind(status)
        .bind(actor)
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(candidate)
    }

    pub async fn insert_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        candidate_id: Uuid,
        status: CandidateStatus,
        note: Option<String>,
        actor: Option<Uuid>,
    ) -> Result<CandidateInterviewHistory> {
        let row = sqlx::query_as::<_, CandidateInterviewHistory>(
            r#"INSERT INTO candidate_interview_histories (candidate_id, status, note, created_by)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(candidate_id)
        .bind(status)
        .bind(note)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn insert_email(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        candidate_id: Uuid,
        template: &str,
        date_time: DateTime<Utc>,
        note: Option<String>,
        actor: Option<Uuid>,
    ) -> Result<CandidateEmail> {
        let row = sqlx::query_as::<_, CandidateEmail>(
            r#"INSERT INTO candidate_emails (candidate_id, template, date_time, note, created_by, updated_by)
               VALUES ($1, $2, $3, $4, $5, $5)
               RETURNING *"#,
        )
        .bind(candidate_id)
        .bind(template)
        .bind(date_time)
        .bind(note)
        .bind(actor)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }
}

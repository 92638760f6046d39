use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// Periodic bulk progress transition: waiting interviews whose scheduled
/// time has passed become done. One conditional UPDATE, no per-row logic;
/// re-running with no newly eligible rows changes nothing, and cancelled
/// interviews are never touched.
#[derive(Clone)]
pub struct InterviewSweepService {
    pool: PgPool,
}

impl InterviewSweepService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_once(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE candidate_interviews
               SET progress = 'done', updated_at = NOW()
               WHERE progress = 'waiting'
                 AND interview_at <= NOW()
                 AND deleted_at IS NULL"#,
        )
        .execute(&self.pool)
        .await?;

        let swept = result.rows_affected();
        if swept > 0 {
            info!("Interview sweep marked {} interview(s) as done", swept);
        }
        Ok(swept)
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use hr_workflow_backend::dto::candidate_dto::{CreateCandidatePayload, DispatchPayload};
use hr_workflow_backend::error::{Error, Result};
use hr_workflow_backend::models::candidate::CandidateStatus;
use hr_workflow_backend::models::interview::InterviewProgress;
use hr_workflow_backend::services::delivery_service::{
    DeliveryConfirmation, DeliveryRequest, TemplateDelivery,
};
use hr_workflow_backend::workflow::templates::EmailTemplateKind;
use hr_workflow_backend::AppState;

struct StubDelivery {
    sent: AtomicUsize,
    fail: bool,
}

#[axum::async_trait]
impl TemplateDelivery for StubDelivery {
    async fn send(&self, _request: DeliveryRequest) -> Result<DeliveryConfirmation> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Delivery("mail gateway unavailable".to_string()));
        }
        Ok(DeliveryConfirmation {
            message_id: Some(format!("msg-{}", self.sent.load(Ordering::SeqCst))),
            accepted_at: Utc::now(),
        })
    }
}

/// Connects to the database named by DATABASE_URL, or returns None so the
/// test skips on machines without one.
async fn try_state(fail_delivery: bool) -> Option<(AppState, Arc<StubDelivery>)> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let delivery = Arc::new(StubDelivery {
        sent: AtomicUsize::new(0),
        fail: fail_delivery,
    });
    let state = AppState::with_delivery(pool, "hr@example.com".to_string(), delivery.clone());
    Some((state, delivery))
}

fn intake_payload() -> CreateCandidatePayload {
    CreateCandidatePayload {
        name: "Test Candidate".to_string(),
        email: format!("candidate_{}@example.com", Uuid::new_v4()),
        phone: Some("+1 555 0100".to_string()),
        birthday: None,
        cv_file_id: Some(Uuid::new_v4()),
        avatar_id: None,
        gender: None,
        level: Some("middle".to_string()),
        resource: Some("referral".to_string()),
        applied_position: Some("Backend Engineer".to_string()),
        note: None,
    }
}

fn invite_payload(interview_at: chrono::DateTime<Utc>) -> DispatchPayload {
    DispatchPayload {
        template: EmailTemplateKind::InviteInterview,
        interview_at: Some(interview_at),
        note: Some("first round".to_string()),
        data: None,
        attachment_id: None,
    }
}

#[tokio::test]
async fn invite_dispatch_commits_email_status_history_and_interview() {
    let Some((state, delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");
    assert_eq!(candidate.status, CandidateStatus::CvReviewing);

    state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::CvApproved, None, actor)
        .await
        .expect("approve cv");

    let interview_at = Utc::now() + Duration::days(3);
    let outcome = state
        .dispatch_service
        .dispatch(candidate.id, invite_payload(interview_at), actor)
        .await
        .expect("dispatch invite");

    assert_eq!(delivery.sent.load(Ordering::SeqCst), 1);
    assert_eq!(
        outcome.candidate.status,
        CandidateStatus::WaitingReplyFirstInterview
    );

    let interviews = state
        .interview_service
        .list_for_candidate(candidate.id)
        .await
        .expect("interviews");
    assert_eq!(interviews.len(), 1);
    assert_eq!(interviews[0].order, 1);
    assert_eq!(interviews[0].progress, InterviewProgress::Waiting);
    assert_eq!(interviews[0].created_by, actor);

    let emails = state
        .candidate_service
        .emails(candidate.id)
        .await
        .expect("emails");
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].template, "invite_interview");

    let history = state
        .candidate_service
        .history(candidate.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, CandidateStatus::WaitingReplyFirstInterview);
    assert_eq!(history[1].status, CandidateStatus::CvApproved);
}

#[tokio::test]
async fn second_invite_targets_second_round_and_third_is_refused() {
    let Some((state, _delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");
    state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::CvApproved, None, actor)
        .await
        .expect("approve cv");
    state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(2)),
            actor,
        )
        .await
        .expect("first invite");

    // candidate confirmed and sat the first interview
    state
        .candidate_service
        .update_status(
            candidate.id,
            CandidateStatus::FirstInterview,
            None,
            actor,
        )
        .await
        .expect("first interview");

    let outcome = state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(9)),
            actor,
        )
        .await
        .expect("second invite");
    assert_eq!(
        outcome.candidate.status,
        CandidateStatus::WaitingReplySecondInterview
    );

    let interviews = state
        .interview_service
        .list_for_candidate(candidate.id)
        .await
        .expect("interviews");
    assert_eq!(interviews.len(), 2);
    assert_eq!(interviews[1].order, 2);

    // cap reached: no third interview can ever be scheduled
    let err = state
        .interview_service
        .next_order(candidate.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::OverLimit(_)), "{:?}", err);

    // and the invite template is no longer applicable from this status
    let err = state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(12)),
            actor,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StateConflict(_)), "{:?}", err);
}

#[tokio::test]
async fn direct_update_to_non_adjacent_status_writes_nothing() {
    let Some((state, _delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");

    let err = state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::Onboard, None, actor)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StateConflict(_)), "{:?}", err);

    let refreshed = state
        .candidate_service
        .get(candidate.id)
        .await
        .expect("get")
        .expect("still present");
    assert_eq!(refreshed.status, CandidateStatus::CvReviewing);

    let history = state
        .candidate_service
        .history(candidate.id)
        .await
        .expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn failed_delivery_commits_nothing() {
    let Some((state, delivery)) = try_state(true).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");
    state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::CvApproved, None, actor)
        .await
        .expect("approve cv");

    let err = state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(1)),
            actor,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Delivery(_)), "{:?}", err);
    assert_eq!(delivery.sent.load(Ordering::SeqCst), 1);

    let refreshed = state
        .candidate_service
        .get(candidate.id)
        .await
        .expect("get")
        .expect("still present");
    assert_eq!(refreshed.status, CandidateStatus::CvApproved);
    assert!(state
        .interview_service
        .list_for_candidate(candidate.id)
        .await
        .expect("interviews")
        .is_empty());
    assert!(state
        .candidate_service
        .emails(candidate.id)
        .await
        .expect("emails")
        .is_empty());
    let history = state
        .candidate_service
        .history(candidate.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1, "only the cv_approved row");
}

#[tokio::test]
async fn sweep_marks_past_waiting_interviews_done_and_is_idempotent() {
    let Some((state, _delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");

    let insert = |order: i32, progress: InterviewProgress, at: chrono::DateTime<Utc>| {
        let pool = state.pool.clone();
        let candidate_id = candidate.id;
        async move {
            sqlx::query_scalar::<_, Uuid>(
                r#"INSERT INTO candidate_interviews
                       (candidate_id, interview_order, progress, interview_at)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id"#,
            )
            .bind(candidate_id)
            .bind(order)
            .bind(progress)
            .bind(at)
            .fetch_one(&pool)
            .await
            .expect("seed interview")
        }
    };

    let past_waiting = insert(1, InterviewProgress::Waiting, Utc::now() - Duration::hours(2)).await;
    let future_waiting = insert(2, InterviewProgress::Waiting, Utc::now() + Duration::days(30)).await;
    let past_cancelled = insert(1, InterviewProgress::Cancel, Utc::now() - Duration::hours(2)).await;

    let swept = state.sweep_service.run_once().await.expect("first sweep");
    assert!(swept >= 1);

    let progress_of = |id: Uuid| {
        let pool = state.pool.clone();
        async move {
            sqlx::query_scalar::<_, InterviewProgress>(
                r#"SELECT progress FROM candidate_interviews WHERE id = $1"#,
            )
            .bind(id)
            .fetch_one(&pool)
            .await
            .expect("fetch progress")
        }
    };

    assert_eq!(progress_of(past_waiting).await, InterviewProgress::Done);
    assert_eq!(progress_of(future_waiting).await, InterviewProgress::Waiting);
    assert_eq!(progress_of(past_cancelled).await, InterviewProgress::Cancel);

    state.sweep_service.run_once().await.expect("second sweep");

    assert_eq!(progress_of(past_waiting).await, InterviewProgress::Done);
    assert_eq!(progress_of(future_waiting).await, InterviewProgress::Waiting);
    assert_eq!(progress_of(past_cancelled).await, InterviewProgress::Cancel);
}

#[tokio::test]
async fn soft_delete_cascades_to_interviews_and_emails_but_not_history() {
    let Some((state, _delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };
    let actor = Some(Uuid::new_v4());

    let candidate = state
        .candidate_service
        .create(intake_payload(), actor)
        .await
        .expect("create");
    state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::CvApproved, None, actor)
        .await
        .expect("approve cv");
    state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(2)),
            actor,
        )
        .await
        .expect("first invite");
    state
        .candidate_service
        .update_status(candidate.id, CandidateStatus::FirstInterview, None, actor)
        .await
        .expect("first interview");
    state
        .dispatch_service
        .dispatch(
            candidate.id,
            invite_payload(Utc::now() + Duration::days(9)),
            actor,
        )
        .await
        .expect("second invite");

    let history_before = state
        .candidate_service
        .history(candidate.id)
        .await
        .expect("history");

    state
        .candidate_service
        .soft_delete(candidate.id, actor)
        .await
        .expect("delete");

    assert!(state
        .candidate_service
        .get(candidate.id)
        .await
        .expect("get")
        .is_none());

    let deleted_interviews: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM candidate_interviews
           WHERE candidate_id = $1 AND deleted_at IS NOT NULL AND deleted_by = $2"#,
    )
    .bind(candidate.id)
    .bind(actor)
    .fetch_one(&state.pool)
    .await
    .expect("count interviews");
    assert_eq!(deleted_interviews, 2);

    let deleted_emails: i64 = sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM candidate_emails
           WHERE candidate_id = $1 AND deleted_at IS NOT NULL AND deleted_by = $2"#,
    )
    .bind(candidate.id)
    .bind(actor)
    .fetch_one(&state.pool)
    .await
    .expect("count emails");
    assert_eq!(deleted_emails, 2);

    // the audit trail survives the candidate
    let history_after = state
        .candidate_service
        .history(candidate.id)
        .await
        .expect("history");
    assert_eq!(history_after.len(), history_before.len());
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let Some((state, _delivery)) = try_state(false).await else {
        eprintln!("skipping: DATABASE_URL not set");
        return;
    };

    let candidate = state
        .candidate_service
        .create(intake_payload(), None)
        .await
        .expect("create");
    state
        .candidate_service
        .soft_delete(candidate.id, None)
        .await
        .expect("delete");

    let err = state
        .candidate_service
        .soft_delete(candidate.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);
}

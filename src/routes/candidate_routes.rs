use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::{CreateCandidatePayload, DispatchPayload, UpdateStatusPayload},
    error::{Error, Result},
    models::candidate::CandidateStatus,
    AppState,
};

/// Authentication lives in front of this service; handlers only pick up the
/// already-authenticated actor id for the audit columns.
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}

pub async fn create_candidate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let actor = actor_from_headers(&headers);
    let candidate = state.candidate_service.create(payload, actor).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub async fn list_candidates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let candidates = state.candidate_service.list().await?;
    Ok(Json(candidates))
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state
        .candidate_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    Ok(Json(candidate))
}

pub async fn update_candidate_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_headers(&headers);
    let candidate = state
        .candidate_service
        .update_status(id, payload.status, payload.note, actor)
        .await?;
    Ok(Json(candidate))
}

pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let actor = actor_from_headers(&headers);
    state.candidate_service.soft_delete(id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dispatch_communication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<DispatchPayload>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_headers(&headers);
    let outcome = state.dispatch_service.dispatch(id, payload, actor).await?;
    Ok(Json(outcome))
}

pub async fn get_candidate_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    let history = state.candidate_service.history(id).await?;
    Ok(Json(history))
}

pub async fn get_candidate_emails(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    let emails = state.candidate_service.emails(id).await?;
    Ok(Json(emails))
}

pub async fn get_candidate_interviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .candidate_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    let interviews = state.interview_service.list_for_candidate(id).await?;
    Ok(Json(interviews))
}

pub async fn list_candidate_statuses() -> impl IntoResponse {
    let statuses: Vec<&str> = CandidateStatus::ALL.iter().map(|s| s.as_str()).collect();
    Json(statuses)
}

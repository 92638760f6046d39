use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    dto::interview_dto::UpdateInterviewPayload, error::Result,
    routes::candidate_routes::actor_from_headers, AppState,
};

pub async fn update_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateInterviewPayload>,
) -> Result<impl IntoResponse> {
    let actor = actor_from_headers(&headers);
    let interview = state.interview_service.update(id, payload, actor).await?;
    Ok(Json(interview))
}

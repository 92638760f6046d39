use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::candidate::CandidateStatus;
use crate::workflow::templates::EmailTemplateKind;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub cv_file_id: Option<Uuid>,
    pub avatar_id: Option<Uuid>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub resource: Option<String>,
    pub applied_position: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: CandidateStatus,
    pub note: Option<String>,
}

/// Request body for `POST /candidates/:id/dispatch`. `interview_at` is
/// required for interview invitations; `data` carries template-specific
/// structured values (offer dates and the like) passed through to the
/// delivery collaborator untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchPayload {
    pub template: EmailTemplateKind,
    pub interview_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub data: Option<JsonValue>,
    pub attachment_id: Option<Uuid>,
}

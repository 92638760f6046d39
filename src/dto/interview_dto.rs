use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::interview::InterviewProgress;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInterviewPayload {
    pub progress: Option<InterviewProgress>,
    pub interview_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

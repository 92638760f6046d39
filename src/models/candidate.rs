use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recruiting pipeline stage. Transitions between stages are governed by
/// the adjacency table in `workflow::transitions`; this type only names the
/// members and their wire/database spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "candidate_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    CvReviewing,
    CvApproved,
    CvRejected,
    WaitingReplyFirstInterview,
    FirstInterview,
    WaitingReplySecondInterview,
    SecondInterview,
    InterviewFail,
    Offering,
    Onboard,
    NotOnboard,
    CandidateReject,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 12] = [
        CandidateStatus::CvReviewing,
        CandidateStatus::CvApproved,
        CandidateStatus::CvRejected,
        CandidateStatus::WaitingReplyFirstInterview,
        CandidateStatus::FirstInterview,
        CandidateStatus::WaitingReplySecondInterview,
        CandidateStatus::SecondInterview,
        CandidateStatus::InterviewFail,
        CandidateStatus::Offering,
        CandidateStatus::Onboard,
        CandidateStatus::NotOnboard,
        CandidateStatus::CandidateReject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::CvReviewing => "cv_reviewing",
            CandidateStatus::CvApproved => "cv_approved",
            CandidateStatus::CvRejected => "cv_rejected",
            CandidateStatus::WaitingReplyFirstInterview => "waiting_reply_first_interview",
            CandidateStatus::FirstInterview => "first_interview",
            CandidateStatus::WaitingReplySecondInterview => "waiting_reply_second_interview",
            CandidateStatus::SecondInterview => "second_interview",
            CandidateStatus::InterviewFail => "interview_fail",
            CandidateStatus::Offering => "offering",
            CandidateStatus::Onboard => "onboard",
            CandidateStatus::NotOnboard => "not_onboard",
            CandidateStatus::CandidateReject => "candidate_reject",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub cv_file_id: Option<Uuid>,
    pub avatar_id: Option<Uuid>,
    pub status: CandidateStatus,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub resource: Option<String>,
    pub applied_position: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_wire_spelling() {
        for status in CandidateStatus::ALL {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire, serde_json::json!(status.as_str()));
        }
    }

    #[test]
    fn all_lists_every_member_once() {
        let mut seen = std::collections::HashSet::new();
        for status in CandidateStatus::ALL {
            assert!(seen.insert(status), "{:?} listed twice", status);
        }
        assert_eq!(seen.len(), 12);
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateStatus;

/// The communications a recruiter can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplateKind {
    InviteInterview,
    RejectCv,
    RejectCandidate,
    InterviewFail,
    Offer,
}

impl EmailTemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailTemplateKind::InviteInterview => "invite_interview",
            EmailTemplateKind::RejectCv => "reject_cv",
            EmailTemplateKind::RejectCandidate => "reject_candidate",
            EmailTemplateKind::InterviewFail => "interview_fail",
            EmailTemplateKind::Offer => "offer",
        }
    }
}

/// Descriptor resolved for a dispatch: the status the candidate moves to and
/// the statuses the candidate must currently be in for the template to make
/// sense. `next_status` for interview invitations is the first-round value;
/// the coordinator overrides it for second rounds.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub kind: EmailTemplateKind,
    pub subject: &'static str,
    pub sender: String,
    pub next_status: CandidateStatus,
    pub required_prior: Vec<CandidateStatus>,
}

/// Keyed template lookup, built once at startup from configuration.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: HashMap<EmailTemplateKind, EmailTemplate>,
}

impl TemplateRegistry {
    pub fn new(sender: String) -> Self {
        let descriptors = [
            EmailTemplate {
                kind: EmailTemplateKind::InviteInterview,
                subject: "Interview invitation",
                sender: sender.clone(),
                next_status: CandidateStatus::WaitingReplyFirstInterview,
                required_prior: vec![
                    CandidateStatus::CvApproved,
                    CandidateStatus::FirstInterview,
                ],
            },
            EmailTemplate {
                kind: EmailTemplateKind::RejectCv,
                subject: "Your application",
                sender: sender.clone(),
                next_status: CandidateStatus::CvRejected,
                required_prior: vec![CandidateStatus::CvReviewing],
            },
            EmailTemplate {
                kind: EmailTemplateKind::RejectCandidate,
                subject: "Your application",
                sender: sender.clone(),
                next_status: CandidateStatus::CandidateReject,
                required_prior: vec![
                    CandidateStatus::CvApproved,
                    CandidateStatus::WaitingReplyFirstInterview,
                    CandidateStatus::WaitingReplySecondInterview,
                ],
            },
            EmailTemplate {
                kind: EmailTemplateKind::InterviewFail,
                subject: "Interview result",
                sender: sender.clone(),
                next_status: CandidateStatus::InterviewFail,
                required_prior: vec![
                    CandidateStatus::FirstInterview,
                    CandidateStatus::SecondInterview,
                ],
            },
            EmailTemplate {
                kind: EmailTemplateKind::Offer,
                subject: "Offer of employment",
                sender,
                next_status: CandidateStatus::Offering,
                required_prior: vec![
                    CandidateStatus::FirstInterview,
                    CandidateStatus::SecondInterview,
                ],
            },
        ];

        let mut templates = HashMap::new();
        for descriptor in descriptors {
            templates.insert(descriptor.kind, descriptor);
        }

        Self { templates }
    }

    pub fn get(&self, kind: EmailTemplateKind) -> Option<&EmailTemplate> {
        self.templates.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmailTemplate> {
        self.templates.values()
    }
}

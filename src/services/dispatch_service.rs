use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::dto::candidate_dto::DispatchPayload;
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::services::candidate_service::CandidateService;
use crate::services::delivery_service::{DeliveryConfirmation, DeliveryRequest, TemplateDelivery};
use crate::services::interview_service::InterviewService;
use crate::workflow::templates::{EmailTemplate, EmailTemplateKind, TemplateRegistry};

/// Orchestrates a candidate communication: resolves the template's target
/// status, schedules the interview for invitations, calls the external
/// delivery collaborator, and commits email + status + history (+ interview)
/// as one transaction only after delivery succeeded.
#[derive(Clone)]
pub struct DispatchService {
    pool: PgPool,
    candidates: CandidateService,
    interviews: InterviewService,
    templates: Arc<TemplateRegistry>,
    delivery: Arc<dyn TemplateDelivery>,
}

#[derive(Debug, Serialize)]
pub struct DispatchOutcome {
    pub delivery: DeliveryConfirmation,
    pub candidate: Candidate,
}

impl DispatchService {
    pub fn new(
        pool: PgPool,
        candidates: CandidateService,
        interviews: InterviewService,
        templates: Arc<TemplateRegistry>,
        delivery: Arc<dyn TemplateDelivery>,
    ) -> Self {
        Self {
            pool,
            candidates,
            interviews,
            templates,
            delivery,
        }
    }

    pub async fn dispatch(
        &self,
        candidate_id: Uuid,
        payload: DispatchPayload,
        actor: Option<Uuid>,
    ) -> Result<DispatchOutcome> {
        let candidate = self
            .candidates
            .get(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

        let template = self.templates.get(payload.template).ok_or_else(|| {
            Error::NotFound(format!(
                "Template '{}' is not registered",
                payload.template.as_str()
            ))
        })?;

        if !template.required_prior.contains(&candidate.status) {
            return Err(Error::StateConflict(format!(
                "Template '{}' cannot be sent while the candidate is '{}'",
                template.kind.as_str(),
                candidate.status.as_str()
            )));
        }

        let target_status = resolve_target_status(template, candidate.status);

        let interview_at = if template.kind == EmailTemplateKind::InviteInterview {
            let at = payload.interview_at.ok_or_else(|| {
                Error::BadRequest("interview_at is required for interview invitations".to_string())
            })?;
            // refuse before contacting the candidate when the cap is hit
            self.interviews.next_order(candidate_id).await?;
            Some(at)
        } else {
            None
        };

        let request = DeliveryRequest {
            recipient: candidate.email.clone(),
            sender: template.sender.clone(),
            template: template.kind.as_str().to_string(),
            subject: template.subject.to_string(),
            data: payload.data,
            attachment_file_id: payload.attachment_id,
        };

        // External call first. A failure here aborts with nothing committed;
        // a failure after this point means the recipient was already told.
        let confirmation = self.delivery.send(request).await?;

        match self
            .commit_dispatch(
                &candidate,
                template,
                target_status,
                interview_at,
                payload.note,
                actor,
                confirmation.accepted_at,
            )
            .await
        {
            Ok(updated) => {
                info!(
                    "Dispatched '{}' to candidate {}: {} -> {}",
                    template.kind.as_str(),
                    candidate_id,
                    candidate.status.as_str(),
                    target_status.as_str()
                );
                Ok(DispatchOutcome {
                    delivery: confirmation,
                    candidate: updated,
                })
            }
            Err(err) => {
                error!(
                    "Candidate {} was sent '{}' but no state was recorded: {}",
                    candidate_id,
                    template.kind.as_str(),
                    err
                );
                Err(Error::DeliveredNotRecorded(err.to_string()))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn commit_dispatch(
        &self,
        candidate: &Candidate,
        template: &EmailTemplate,
        target_status: CandidateStatus,
        interview_at: Option<DateTime<Utc>>,
        note: Option<String>,
        actor: Option<Uuid>,
        sent_at: DateTime<Utc>,
    ) -> Result<Candidate> {
        let mut tx = self.pool.begin().await?;

        self.candidates
            .insert_email(
                &mut tx,
                candidate.id,
                template.kind.as_str(),
                sent_at,
                note.clone(),
                actor,
            )
            .await?;

        let updated = self
            .candidates
            .set_status(&mut tx, candidate.id, target_status, actor)
            .await?;

        self.candidates
            .insert_history(&mut tx, candidate.id, target_status, note.clone(), actor)
            .await?;

        if let Some(at) = interview_at {
            self.interviews
                .schedule_next(&mut tx, candidate.id, at, note, actor)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }
}

/// A template's default target status, with one override: inviting a
/// candidate who already sat the first interview starts the second round.
pub fn resolve_target_status(
    template: &EmailTemplate,
    current: CandidateStatus,
) -> CandidateStatus {
    if template.kind == EmailTemplateKind::InviteInterview
        && current == CandidateStatus::FirstInterview
    {
        return CandidateStatus::WaitingReplySecondInterview;
    }
    template.next_status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::transitions::TransitionTable;

    #[test]
    fn invite_from_first_interview_targets_second_round() {
        let registry = TemplateRegistry::new("hr@example.com".to_string());
        let invite = registry.get(EmailTemplateKind::InviteInterview).unwrap();

        assert_eq!(
            resolve_target_status(invite, CandidateStatus::FirstInterview),
            CandidateStatus::WaitingReplySecondInterview
        );
        assert_eq!(
            resolve_target_status(invite, CandidateStatus::CvApproved),
            CandidateStatus::WaitingReplyFirstInterview
        );
    }

    #[test]
    fn non_invite_templates_keep_their_default_target() {
        let registry = TemplateRegistry::new("hr@example.com".to_string());
        let offer = registry.get(EmailTemplateKind::Offer).unwrap();

        assert_eq!(
            resolve_target_status(offer, CandidateStatus::FirstInterview),
            CandidateStatus::Offering
        );
        assert_eq!(
            resolve_target_status(offer, CandidateStatus::SecondInterview),
            CandidateStatus::Offering
        );
    }

    #[test]
    fn every_template_target_is_adjacent_to_its_prior_statuses() {
        let registry = TemplateRegistry::new("hr@example.com".to_string());
        let table = TransitionTable::new();

        for template in registry.iter() {
            for &prior in &template.required_prior {
                let target = resolve_target_status(template, prior);
                assert!(
                    table.is_allowed(prior, target),
                    "template {:?}: {:?} -> {:?}",
                    template.kind,
                    prior,
                    target
                );
            }
        }
    }
}

pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod workflow;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{
    candidate_service::CandidateService,
    delivery_service::{TemplateDelivery, WebhookDeliveryService},
    dispatch_service::DispatchService,
    interview_service::InterviewService,
    sweep_service::InterviewSweepService,
};
use crate::workflow::{templates::TemplateRegistry, transitions::TransitionTable};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub transitions: Arc<TransitionTable>,
    pub templates: Arc<TemplateRegistry>,
    pub candidate_service: CandidateService,
    pub interview_service: InterviewService,
    pub dispatch_service: DispatchService,
    pub sweep_service: InterviewSweepService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let delivery: Arc<dyn TemplateDelivery> = Arc::new(WebhookDeliveryService::new(
            config.mail_webhook_url.clone(),
        ));
        Self::with_delivery(pool, config.mail_sender.clone(), delivery)
    }

    /// Wires the state with a caller-supplied delivery collaborator; used by
    /// the test suite to substitute the external mail gateway.
    pub fn with_delivery(
        pool: PgPool,
        mail_sender: String,
        delivery: Arc<dyn TemplateDelivery>,
    ) -> Self {
        let transitions = Arc::new(TransitionTable::new());
        let templates = Arc::new(TemplateRegistry::new(mail_sender));

        let candidate_service = CandidateService::new(pool.clone(), transitions.clone());
        let interview_service = InterviewService::new(pool.clone());
        let dispatch_service = DispatchService::new(
            pool.clone(),
            candidate_service.clone(),
            interview_service.clone(),
            templates.clone(),
            delivery,
        );
        let sweep_service = InterviewSweepService::new(pool.clone());

        Self {
            pool,
            transitions,
            templates,
            candidate_service,
            interview_service,
            dispatch_service,
            sweep_service,
        }
    }
}

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRequest {
    pub recipient: String,
    pub sender: String,
    pub template: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfirmation {
    pub message_id: Option<String>,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DeliveryResponse {
    success: bool,
    message_id: Option<String>,
    message: Option<String>,
}

/// Contract for the external mail collaborator. Called at most once per
/// dispatch attempt; the coordinator commits nothing when this fails.
#[axum::async_trait]
pub trait TemplateDelivery: Send + Sync {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryConfirmation>;
}

/// Production delivery: posts the request to the mail gateway webhook. The
/// client timeout bounds the one blocking external dependency of a dispatch.
#[derive(Clone)]
pub struct WebhookDeliveryService {
    client: Client,
    webhook_url: String,
}

impl WebhookDeliveryService {
    pub fn new(webhook_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for mail delivery");
        Self {
            client,
            webhook_url,
        }
    }
}

#[axum::async_trait]
impl TemplateDelivery for WebhookDeliveryService {
    async fn send(&self, request: DeliveryRequest) -> Result<DeliveryConfirmation> {
        info!(
            "Sending template '{}' to {}",
            request.template, request.recipient
        );

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mail gateway returned {}: {}", status, body);
            return Err(Error::Delivery(format!("HTTP error {}: {}", status, body)));
        }

        let parsed = response
            .json::<DeliveryResponse>()
            .await
            .unwrap_or(DeliveryResponse {
                success: true,
                message_id: None,
                message: None,
            });

        if !parsed.success {
            return Err(Error::Delivery(
                parsed
                    .message
                    .unwrap_or_else(|| "delivery rejected by gateway".to_string()),
            ));
        }

        Ok(DeliveryConfirmation {
            message_id: parsed.message_id,
            accepted_at: Utc::now(),
        })
    }
}

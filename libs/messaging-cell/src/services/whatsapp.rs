use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, error, info, instrument};

use shared_config::AppConfig;
use shared_utils::signature::verify_signature;
use shared_utils::validation::clean_phone_number;

use crate::error::GatewayError;
use crate::models::{GatewayStatus, InteractiveMessage, OutboundMessage};
use crate::services::gateway::MessagingGateway;
use crate::services::stats::DeliveryStats;

/// WhatsApp Cloud API client.
pub struct WhatsAppClient {
    client: Client,
    api_url: String,
    api_version: String,
    access_token: String,
    phone_number_id: String,
    verify_token: String,
    app_secret: String,
    stats: DeliveryStats,
}

impl WhatsAppClient {
    pub fn new(config: &AppConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.whatsapp_api_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.whatsapp_api_url.trim_end_matches('/').to_string(),
            api_version: config.whatsapp_api_version.clone(),
            access_token: config.whatsapp_access_token.clone(),
            phone_number_id: config.whatsapp_phone_number_id.clone(),
            verify_token: config.whatsapp_verify_token.clone(),
            app_secret: config.whatsapp_app_secret.clone(),
            stats: DeliveryStats::new(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.access_token.is_empty() && !self.phone_number_id.is_empty()
    }

    /// Token the platform echoes back during the subscription handshake.
    pub fn verify_token(&self) -> &str {
        &self.verify_token
    }

    pub fn verify_signature(&self, body: &[u8], header: Option<&str>) -> bool {
        verify_signature(&self.app_secret, body, header)
    }

    /// Delivery counters. Session counts are filled in by the caller.
    pub async fn status(&self) -> GatewayStatus {
        GatewayStatus {
            enabled: self.is_configured(),
            last_message_sent: self.stats.last_sent().await,
            message_count_today: self.stats.sent_today(Utc::now()).await,
            total_messages_sent: self.stats.total_sent(),
            active_sessions: 0,
        }
    }

    async fn send(&self, payload: &OutboundMessage) -> Result<(), GatewayError> {
        if !self.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let url = format!(
            "{}/{}/{}/messages",
            self.api_url, self.api_version, self.phone_number_id
        );
        debug!("Sending {} message to {} via {}", payload.kind, payload.to, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("WhatsApp API error ({}): {}", status, body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        self.stats.record_sent().await;
        info!("WhatsApp {} message sent to {}", payload.kind, payload.to);
        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppClient {
    #[instrument(skip(self, body))]
    async fn send_text(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        if body.trim().is_empty() {
            return Err(GatewayError::InvalidMessage("text body is empty".to_string()));
        }

        self.send(&OutboundMessage::text(clean_phone_number(to), body))
            .await
    }

    #[instrument(skip(self, message))]
    async fn send_interactive(
        &self,
        to: &str,
        message: &InteractiveMessage,
    ) -> Result<(), GatewayError> {
        message.validate().map_err(GatewayError::InvalidMessage)?;

        self.send(&OutboundMessage::interactive(
            clean_phone_number(to),
            message.clone(),
        ))
        .await
    }
}

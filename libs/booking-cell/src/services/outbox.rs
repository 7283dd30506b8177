use std::sync::Arc;

use tracing::error;

use messaging_cell::models::InteractiveMessage;
use messaging_cell::MessagingGateway;

use crate::services::render;

/// Fire-and-log wrapper around the gateway. A failed send never stops the
/// dialogue.
#[derive(Clone)]
pub struct Outbox {
    gateway: Arc<dyn MessagingGateway>,
}

impl Outbox {
    pub fn new(gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { gateway }
    }

    pub async fn text(&self, to: &str, body: &str) {
        if let Err(e) = self.gateway.send_text(to, body).await {
            error!("Failed to send text to {}: {}", to, e);
        }
    }

    pub async fn interactive(&self, to: &str, message: &InteractiveMessage) {
        if let Err(e) = self.gateway.send_interactive(to, message).await {
            error!("Failed to send interactive message to {}: {}", to, e);
        }
    }

    pub async fn main_menu(&self, to: &str) {
        self.interactive(to, &render::main_menu()).await;
    }
}

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::InteractiveMessage;

/// Outbound side of a chat platform.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), GatewayError>;

    async fn send_interactive(
        &self,
        to: &str,
        message: &InteractiveMessage,
    ) -> Result<(), GatewayError>;
}

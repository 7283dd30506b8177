use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("WhatsApp is not configured")]
    NotConfigured,

    #[error("WhatsApp request failed: {0}")]
    Transport(String),

    #[error("WhatsApp API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

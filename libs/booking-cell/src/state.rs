use std::sync::Arc;

use directory_cell::DirectoryClient;
use messaging_cell::WhatsAppClient;
use shared_config::AppConfig;

use crate::error::BookingError;
use crate::services::{InMemorySessionStore, MessageRouter, SessionStore};

/// Everything the webhook handlers need, shared across requests.
#[derive(Clone)]
pub struct WebhookState {
    pub config: Arc<AppConfig>,
    pub whatsapp: Arc<WhatsAppClient>,
    pub store: Arc<dyn SessionStore>,
    pub router: Arc<MessageRouter>,
}

impl WebhookState {
    pub fn new(
        config: Arc<AppConfig>,
        whatsapp: Arc<WhatsAppClient>,
        store: Arc<dyn SessionStore>,
        router: Arc<MessageRouter>,
    ) -> Self {
        Self {
            config,
            whatsapp,
            store,
            router,
        }
    }

    /// Wires the production clients and an in-memory session store.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, BookingError> {
        let whatsapp = Arc::new(WhatsAppClient::new(&config)?);
        let directory = Arc::new(DirectoryClient::new(&config)?);
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

        let router = Arc::new(MessageRouter::new(
            store.clone(),
            directory,
            whatsapp.clone(),
            config.contact_text.clone(),
        ));

        Ok(Self::new(config, whatsapp, store, router))
    }
}

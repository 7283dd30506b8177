use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use directory_cell::{DirectoryApi, DirectoryError};
use messaging_cell::models::{InboundMessage, WebhookPayload};
use messaging_cell::MessagingGateway;
use shared_utils::validation::is_valid_phone;

use crate::models::{
    UserInput, ViewState, MENU_CONTACT_US, MENU_MY_APPOINTMENT, MENU_NEW_APPOINTMENT,
};
use crate::services::flow::BookingFlowService;
use crate::services::outbox::Outbox;
use crate::services::prompts::*;
use crate::services::render;
use crate::services::session_store::SessionStore;

/// Entry point for every inbound chat message.
///
/// Greetings win over everything, then an open booking dialogue, then a
/// pending "my appointment" phone prompt, then menu buttons and list picks.
pub struct MessageRouter {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn DirectoryApi>,
    outbox: Outbox,
    booking: BookingFlowService,
    contact_text: String,
}

impl MessageRouter {
    pub fn new(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn DirectoryApi>,
        gateway: Arc<dyn MessagingGateway>,
        contact_text: impl Into<String>,
    ) -> Self {
        let outbox = Outbox::new(gateway);
        let booking = BookingFlowService::new(store.clone(), directory.clone(), outbox.clone());

        Self {
            store,
            directory,
            outbox,
            booking,
            contact_text: contact_text.into(),
        }
    }

    /// Logs delivery statuses, then handles each message in payload order.
    pub async fn process_payload(&self, payload: &WebhookPayload) {
        for status in payload.statuses() {
            debug!(
                "Message {} to {} is {}",
                status.id, status.recipient_id, status.status
            );
            for err in &status.errors {
                warn!(
                    "Delivery error for message {}: {} {} {}",
                    status.id,
                    err.code,
                    err.title,
                    err.message.as_deref().unwrap_or_default()
                );
            }
        }

        for message in payload.messages() {
            self.handle_message(message).await;
        }
    }

    #[instrument(skip(self, message), fields(from = %message.from, kind = %message.kind))]
    pub async fn handle_message(&self, message: &InboundMessage) {
        let user = message.from.as_str();
        if user.is_empty() {
            warn!("Ignoring message {} with no sender", message.id);
            return;
        }

        let _guard = self.store.lock_user(user).await;
        let input = UserInput::from_message(message);
        info!("Handling {:?} from {}", input, user);

        if input.is_greeting() {
            self.outbox.main_menu(user).await;
            return;
        }

        if let Some(session) = self.store.booking_session(user).await {
            self.booking.handle(user, Some(session), &input).await;
            return;
        }

        if let UserInput::Text(phone) = &input {
            if self.store.view_state(user).await == Some(ViewState::AwaitingPhone) {
                self.store.clear_view_state(user).await;
                self.show_appointments_for(user, phone).await;
                return;
            }
        }

        match &input {
            UserInput::ButtonReply { id, .. } if id == MENU_MY_APPOINTMENT => {
                self.store.set_view_state(user, ViewState::AwaitingPhone).await;
                self.outbox.text(user, ASK_VIEW_PHONE).await;
            }
            UserInput::ButtonReply { id, .. } if id == MENU_NEW_APPOINTMENT => {
                self.booking.handle(user, None, &input).await;
            }
            UserInput::ButtonReply { id, .. } if id == MENU_CONTACT_US => {
                self.outbox.text(user, &self.contact_text).await;
                self.outbox.main_menu(user).await;
            }
            UserInput::ListReply { id, .. } => self.show_appointment(user, id).await,
            _ => {
                self.outbox.text(user, NOT_UNDERSTOOD).await;
                self.outbox.main_menu(user).await;
            }
        }
    }

    async fn show_appointments_for(&self, user: &str, phone: &str) {
        if !is_valid_phone(phone) {
            self.outbox.text(user, INVALID_VIEW_PHONE).await;
            self.outbox.main_menu(user).await;
            return;
        }

        match self.directory.search_appointments(phone.trim()).await {
            Ok(appointments) => match appointments.as_slice() {
                [] => {
                    self.outbox.text(user, NO_APPOINTMENTS).await;
                    self.outbox.main_menu(user).await;
                }
                [appointment] => {
                    self.outbox
                        .text(user, &render::appointment_summary(appointment))
                        .await;
                    self.outbox.main_menu(user).await;
                }
                _ => {
                    self.outbox
                        .interactive(user, &render::appointment_list(&appointments))
                        .await;
                }
            },
            Err(DirectoryError::Rejected(message)) if !message.trim().is_empty() => {
                self.outbox.text(user, &message).await;
                self.outbox.main_menu(user).await;
            }
            Err(e) => {
                warn!("Appointment search failed: {}", e);
                self.outbox.text(user, APPOINTMENTS_UNAVAILABLE).await;
                self.outbox.main_menu(user).await;
            }
        }
    }

    async fn show_appointment(&self, user: &str, appointment_id: &str) {
        let reply = match self.directory.get_appointment(appointment_id).await {
            Ok(Some(appointment)) => render::appointment_details(&appointment),
            Ok(None) => APPOINTMENT_NOT_FOUND.to_string(),
            Err(e) => {
                warn!("Appointment {} lookup failed: {}", appointment_id, e);
                APPOINTMENT_DETAILS_FAILED.to_string()
            }
        };

        self.outbox.text(user, &reply).await;
        self.outbox.main_menu(user).await;
    }
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::models::{BookingSession, BookingStep, MENU_MY_APPOINTMENT};
use booking_cell::{InMemorySessionStore, MessageRouter};
use directory_cell::DirectoryClient;
use messaging_cell::models::{InboundMessage, InteractiveKind, InteractiveMessage};
use messaging_cell::{GatewayError, MessagingGateway};
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

pub const USER: &str = "15551234567";
pub const CONTACT: &str = "📞 Call the front desk";

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text(String),
    Interactive(InteractiveMessage),
}

impl Sent {
    pub fn is_menu(&self) -> bool {
        match self {
            Sent::Interactive(message) => {
                message.kind == InteractiveKind::Button
                    && message
                        .action
                        .buttons
                        .first()
                        .is_some_and(|button| button.reply.id == MENU_MY_APPOINTMENT)
            }
            Sent::Text(_) => false,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Sent::Text(body) => body,
            Sent::Interactive(message) => panic!("expected text, got {:?}", message),
        }
    }

    pub fn interactive(&self) -> &InteractiveMessage {
        match self {
            Sent::Interactive(message) => message,
            Sent::Text(body) => panic!("expected interactive message, got text {:?}", body),
        }
    }

    /// Row ids of a list message.
    pub fn row_ids(&self) -> Vec<String> {
        self.interactive().rows().map(|row| row.id.clone()).collect()
    }
}

/// Gateway double that keeps every outbound message in order.
#[derive(Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<(String, Sent)>>,
}

impl RecordingGateway {
    /// Returns and forgets everything sent so far.
    pub fn take(&self) -> Vec<Sent> {
        let mut sent = self.sent.lock().unwrap();
        sent.drain(..).map(|(_, message)| message).collect()
    }

    pub fn recipients(&self) -> Vec<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().map(|(to, _)| to.clone()).collect()
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), Sent::Text(body.to_string())));
        Ok(())
    }

    async fn send_interactive(
        &self,
        to: &str,
        message: &InteractiveMessage,
    ) -> Result<(), GatewayError> {
        message.validate().map_err(GatewayError::InvalidMessage)?;
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), Sent::Interactive(message.clone())));
        Ok(())
    }
}

pub struct Harness {
    pub clinic: MockServer,
    pub gateway: Arc<RecordingGateway>,
    pub store: Arc<InMemorySessionStore>,
    pub router: MessageRouter,
}

impl Harness {
    pub async fn start() -> Self {
        let clinic = MockServer::start().await;
        let config = TestConfig::default()
            .with_clinic_url(&clinic.uri())
            .to_app_config();

        let directory = Arc::new(DirectoryClient::new(&config).unwrap());
        let gateway = Arc::new(RecordingGateway::default());
        let store = Arc::new(InMemorySessionStore::new());
        let router = MessageRouter::new(store.clone(), directory, gateway.clone(), CONTACT);

        Self {
            clinic,
            gateway,
            store,
            router,
        }
    }

    pub async fn send(&self, message: Value) -> Vec<Sent> {
        let message: InboundMessage = serde_json::from_value(message).unwrap();
        self.router.handle_message(&message).await;
        self.gateway.take()
    }

    pub async fn mount_get(&self, api_path: &str, query: &[(&str, &str)], body: Value) {
        let mut mock = Mock::given(method("GET")).and(path(api_path));
        for (key, value) in query {
            mock = mock.and(query_param(*key, *value));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.clinic)
            .await;
    }

    pub async fn mount_departments(&self) {
        self.mount_get(
            "/api/department/list",
            &[],
            MockClinicResponses::envelope(serde_json::json!([
                MockClinicResponses::department(3, "Cardiology"),
                MockClinicResponses::department(4, "Dermatology"),
            ])),
        )
        .await;
    }
}

/// Session that has answered everything up to the doctor choice.
pub fn session_at(step: BookingStep) -> BookingSession {
    let mut session = BookingSession::new(USER);
    session.step = step;
    session.patient_id = Some(11);
    session.patient_code = "P-0011".to_string();
    session.patient_name = "Ravi Kumar".to_string();
    session.phone_number = "9876543210".to_string();
    session.date_of_birth = "1990-05-17".to_string();
    session.address = "12 Lake Road".to_string();
    session.department_id = Some(3);
    session.appointment_date = "2025-03-14".to_string();
    match step {
        BookingStep::ChooseDepartment => session.offered_ids = vec!["3".into(), "4".into()],
        BookingStep::ChooseDoctor => session.offered_ids = vec!["7".into()],
        BookingStep::ChooseSlot => {
            session.doctor_id = Some(7);
            session.doctor_name = "Dr. Asha Rao".to_string();
            session.offered_slots = vec!["09:00 AM".into()];
        }
        _ => {}
    }
    session
}

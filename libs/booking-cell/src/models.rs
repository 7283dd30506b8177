use serde::{Deserialize, Serialize};

use directory_cell::models::{CreateAppointmentRequest, Patient};
use messaging_cell::models::InboundMessage;

pub const MENU_MY_APPOINTMENT: &str = "my_appointment";
pub const MENU_NEW_APPOINTMENT: &str = "new_appointment";
pub const MENU_CONTACT_US: &str = "contact_us";
pub const MORE_SLOTS_ID: &str = "more";
pub const CANCEL_KEYWORD: &str = "cancel";

// ==============================================================================
// BOOKING SESSION
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    #[default]
    AskReturning,
    AwaitCode,
    ChoosePatient,
    AwaitName,
    AwaitAddress,
    AwaitPhone,
    AwaitDob,
    ChooseDepartment,
    AwaitDate,
    ChooseDoctor,
    ChooseSlot,
}

/// Answers collected so far in one user's new-appointment dialogue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingSession {
    pub step: BookingStep,
    pub patient_id: Option<i64>,
    pub patient_code: String,
    pub patient_name: String,
    pub address: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub department_id: Option<i64>,
    pub appointment_date: String,
    pub doctor_id: Option<i64>,
    pub doctor_name: String,
    pub time_slot: String,
    pub online_temp_token: Option<i64>,
    pub created_from: String,
    /// Row ids of the patient, department or doctor list last sent.
    pub offered_ids: Vec<String>,
    /// Free slots for the chosen doctor and date. A slot row's id is its
    /// 1-based position here.
    pub offered_slots: Vec<String>,
}

impl BookingSession {
    pub fn new(user: &str) -> Self {
        Self {
            created_from: user.to_string(),
            ..Default::default()
        }
    }

    pub fn fill_patient(&mut self, patient: &Patient) {
        self.patient_id = Some(patient.id);
        self.patient_code = patient.code.clone();
        self.patient_name = patient.full_name();
        self.phone_number = patient.mobile_number.clone();
        self.address = patient.address.clone();
        self.date_of_birth = patient.date_of_birth.clone();
    }

    pub fn offers(&self, id: &str) -> bool {
        self.offered_ids.iter().any(|offered| offered == id)
    }

    /// Token for a slot row, if the row is one of the offered slots.
    pub fn offered_slot(&self, id: &str, title: &str) -> Option<i64> {
        let token: usize = id.parse().ok()?;
        let label = self.offered_slots.get(token.checked_sub(1)?)?;
        (label == title).then_some(token as i64)
    }

    /// Booking payload, once department and doctor are known.
    pub fn appointment_request(&self) -> Option<CreateAppointmentRequest> {
        Some(CreateAppointmentRequest {
            patient_id: self.patient_id.unwrap_or_default(),
            patient_code: self.patient_code.clone(),
            patient_name: self.patient_name.clone(),
            address: self.address.clone(),
            phone_number: self.phone_number.clone(),
            date_of_birth: self.date_of_birth.clone(),
            department_id: self.department_id?,
            appointment_date: self.appointment_date.clone(),
            doctor_id: self.doctor_id?,
            doctor_name: self.doctor_name.clone(),
            online_temp_token: self.online_temp_token.unwrap_or_default(),
            time_slot: self.time_slot.clone(),
            created_from: self.created_from.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    AwaitingPhone,
}

// ==============================================================================
// SLOT PAGINATION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPage {
    pub slots: Vec<String>,
    pub page: usize,
    pub page_size: usize,
}

// ==============================================================================
// USER INPUT
// ==============================================================================

/// What the user sent, reduced to the shapes the dialogue cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    Text(String),
    ButtonReply { id: String, title: String },
    ListReply { id: String, title: String },
    Unsupported(String),
}

impl UserInput {
    pub fn from_message(message: &InboundMessage) -> Self {
        match message.kind.as_str() {
            "text" => match &message.text {
                Some(text) => UserInput::Text(text.body.clone()),
                None => UserInput::Unsupported(message.kind.clone()),
            },
            "interactive" => {
                let Some(interactive) = &message.interactive else {
                    return UserInput::Unsupported(message.kind.clone());
                };
                if let Some(reply) = &interactive.list_reply {
                    UserInput::ListReply {
                        id: reply.id.clone(),
                        title: reply.title.clone(),
                    }
                } else if let Some(reply) = &interactive.button_reply {
                    UserInput::ButtonReply {
                        id: reply.id.clone(),
                        title: reply.title.clone(),
                    }
                } else {
                    UserInput::Unsupported(format!("interactive:{}", interactive.kind))
                }
            }
            "button" => match &message.button {
                Some(button) => UserInput::ButtonReply {
                    id: button.payload.clone(),
                    title: button.text.clone(),
                },
                None => UserInput::Unsupported(message.kind.clone()),
            },
            other => UserInput::Unsupported(other.to_string()),
        }
    }

    fn normalized_text(&self) -> Option<String> {
        match self {
            UserInput::Text(text) => Some(text.trim().to_lowercase()),
            _ => None,
        }
    }

    pub fn is_greeting(&self) -> bool {
        matches!(self.normalized_text().as_deref(), Some("hi" | "hello"))
    }

    pub fn is_cancel(&self) -> bool {
        self.normalized_text().as_deref() == Some(CANCEL_KEYWORD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inbound(value: serde_json::Value) -> InboundMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_each_message_kind() {
        let text = inbound(json!({ "from": "1", "type": "text", "text": { "body": "Hello " } }));
        assert_eq!(UserInput::from_message(&text), UserInput::Text("Hello ".to_string()));

        let list = inbound(json!({
            "from": "1", "type": "interactive",
            "interactive": { "type": "list_reply", "list_reply": { "id": "3", "title": "Cardiology" } }
        }));
        assert_eq!(
            UserInput::from_message(&list),
            UserInput::ListReply { id: "3".to_string(), title: "Cardiology".to_string() }
        );

        let template = inbound(json!({
            "from": "1", "type": "button", "button": { "payload": "contact_us", "text": "Contact" }
        }));
        assert_eq!(
            UserInput::from_message(&template),
            UserInput::ButtonReply { id: "contact_us".to_string(), title: "Contact".to_string() }
        );

        let image = inbound(json!({ "from": "1", "type": "image" }));
        assert_eq!(UserInput::from_message(&image), UserInput::Unsupported("image".to_string()));
    }

    #[test]
    fn greeting_is_trimmed_and_case_insensitive() {
        assert!(UserInput::Text("  HeLLo ".to_string()).is_greeting());
        assert!(UserInput::Text("hi".to_string()).is_greeting());
        assert!(!UserInput::Text("hi there".to_string()).is_greeting());
        assert!(!UserInput::ButtonReply { id: "hi".to_string(), title: "hi".to_string() }.is_greeting());
    }

    #[test]
    fn offered_slot_matches_position_and_label() {
        let mut session = BookingSession::new("15551234567");
        session.offered_slots = vec!["09:00 AM".to_string(), "09:15 AM".to_string()];

        assert_eq!(session.offered_slot("2", "09:15 AM"), Some(2));
        assert_eq!(session.offered_slot("2", "09:00 AM"), None);
        assert_eq!(session.offered_slot("3", "Cardiology"), None);
        assert_eq!(session.offered_slot("0", "09:00 AM"), None);
        assert_eq!(session.offered_slot("more", "➡ Next Slots"), None);
    }

    #[test]
    fn request_needs_department_and_doctor() {
        let mut session = BookingSession::new("15551234567");
        session.department_id = Some(3);
        assert_eq!(session.appointment_request(), None);

        session.doctor_id = Some(7);
        session.online_temp_token = Some(2);
        let request = session.appointment_request().unwrap();
        assert_eq!(request.patient_id, 0);
        assert_eq!(request.online_temp_token, 2);
        assert_eq!(request.created_from, "15551234567");
    }
}

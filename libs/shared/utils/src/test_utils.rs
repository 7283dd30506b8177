use std::sync::Arc;

use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;

use shared_config::AppConfig;

use crate::signature::SIGNATURE_PREFIX;

pub struct TestConfig {
    pub whatsapp_api_url: String,
    pub access_token: String,
    pub phone_number_id: String,
    pub verify_token: String,
    pub app_secret: String,
    pub admin_token: String,
    pub clinic_api_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            whatsapp_api_url: "http://localhost:9090".to_string(),
            access_token: "test-access-token".to_string(),
            phone_number_id: "1234567890".to_string(),
            verify_token: "test-verify-token".to_string(),
            app_secret: "test-app-secret".to_string(),
            admin_token: "test-admin-token".to_string(),
            clinic_api_url: "http://localhost:8082".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_whatsapp_url(mut self, url: &str) -> Self {
        self.whatsapp_api_url = url.to_string();
        self
    }

    pub fn with_clinic_url(mut self, url: &str) -> Self {
        self.clinic_api_url = url.to_string();
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            port: 0,
            whatsapp_api_url: self.whatsapp_api_url.clone(),
            whatsapp_api_version: "v18.0".to_string(),
            whatsapp_access_token: self.access_token.clone(),
            whatsapp_phone_number_id: self.phone_number_id.clone(),
            whatsapp_verify_token: self.verify_token.clone(),
            whatsapp_app_secret: self.app_secret.clone(),
            admin_api_token: self.admin_token.clone(),
            clinic_api_base_url: self.clinic_api_url.clone(),
            whatsapp_api_timeout_secs: 5,
            clinic_api_timeout_secs: 5,
            session_idle_minutes: 30,
            session_sweep_secs: 60,
            contact_text: "📞 Contact us at: +91-98765-43210".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Signs `body` the way the WhatsApp platform does.
pub fn sign_body(app_secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes()))
}

pub struct WebhookPayloads;

impl WebhookPayloads {
    fn wrap_messages(messages: Vec<Value>) -> Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA_ID",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "15550001111",
                            "phone_number_id": "1234567890"
                        },
                        "contacts": [{
                            "profile": { "name": "Test Patient" },
                            "wa_id": messages
                                .first()
                                .and_then(|m| m.get("from"))
                                .cloned()
                                .unwrap_or(Value::Null)
                        }],
                        "messages": messages
                    }
                }]
            }]
        })
    }

    pub fn text_message(from: &str, body: &str) -> Value {
        Self::wrap_messages(vec![Self::text(from, body)])
    }

    pub fn button_reply(from: &str, id: &str, title: &str) -> Value {
        Self::wrap_messages(vec![Self::button(from, id, title)])
    }

    pub fn list_reply(from: &str, id: &str, title: &str) -> Value {
        Self::wrap_messages(vec![Self::list(from, id, title)])
    }

    pub fn batch(messages: Vec<Value>) -> Value {
        Self::wrap_messages(messages)
    }

    pub fn text(from: &str, body: &str) -> Value {
        json!({
            "from": from,
            "id": format!("wamid.{}", body.len()),
            "timestamp": "1700000000",
            "type": "text",
            "text": { "body": body }
        })
    }

    pub fn button(from: &str, id: &str, title: &str) -> Value {
        json!({
            "from": from,
            "id": format!("wamid.{}", id),
            "timestamp": "1700000000",
            "type": "interactive",
            "interactive": {
                "type": "button_reply",
                "button_reply": { "id": id, "title": title }
            }
        })
    }

    pub fn list(from: &str, id: &str, title: &str) -> Value {
        json!({
            "from": from,
            "id": format!("wamid.{}", id),
            "timestamp": "1700000000",
            "type": "interactive",
            "interactive": {
                "type": "list_reply",
                "list_reply": { "id": id, "title": title }
            }
        })
    }

    pub fn status_update(recipient: &str, status: &str) -> Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "WABA_ID",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "statuses": [{
                            "id": "wamid.status",
                            "recipient_id": recipient,
                            "status": status,
                            "timestamp": "1700000000",
                            "errors": [{
                                "code": 131047,
                                "title": "Re-engagement message",
                                "message": "More than 24 hours have passed"
                            }]
                        }]
                    }
                }]
            }]
        })
    }
}

pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn envelope(data: Value) -> Value {
        json!({
            "status": true,
            "statusCode": 200,
            "message": "Success",
            "data": data
        })
    }

    pub fn failure(message: &str) -> Value {
        json!({
            "status": false,
            "statusCode": 400,
            "message": message,
            "data": null
        })
    }

    pub fn patient(id: i64, code: &str, first: &str, last: &str) -> Value {
        json!({
            "patientId": id,
            "patientCode": code,
            "salutation": "Mr.",
            "firstName": first,
            "lastName": last,
            "dateOfBirth": "1990-05-17",
            "mobileNumber": "9876543210",
            "address": "12 Lake Road"
        })
    }

    pub fn department(id: i64, name: &str) -> Value {
        json!({ "departmentId": id, "departmentName": name })
    }

    pub fn doctor(id: i64, first: &str, last: &str, on_leave: bool) -> Value {
        json!({
            "employeeId": id,
            "firstName": first,
            "lastName": last,
            "isOnLeave": on_leave
        })
    }

    pub fn availability(start: &str, end: &str, booked: &[&str]) -> Value {
        let booked: Vec<Value> = booked.iter().map(|s| json!({ "timeSlot": s })).collect();
        json!({
            "availabilityId": 1,
            "dayOfWeek": "Monday",
            "weekType": "All",
            "availableTimeStart": start,
            "availableTimeEnd": end,
            "bookedSlots": booked
        })
    }

    pub fn appointment(id: i64, doctor: &str, date_time: &str, slot: &str, token: i64) -> Value {
        json!({
            "appointmentId": id,
            "doctorId": 7,
            "doctorName": doctor,
            "appointmentDateTime": date_time,
            "timeSlot": slot,
            "tokenNumber": token
        })
    }

    pub fn created(temp_id: i64) -> Value {
        json!({
            "status": true,
            "statusCode": 201,
            "message": "Appointment created",
            "data": [{ "tempAppointmentId": temp_id }]
        })
    }
}

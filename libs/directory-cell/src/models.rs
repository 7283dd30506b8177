use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==============================================================================
// RESPONSE ENVELOPE
// ==============================================================================

/// Every clinic endpoint wraps its payload in this envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub message: String,
    pub data: Option<Vec<T>>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

// ==============================================================================
// DIRECTORY RECORDS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "patientId")]
    pub id: i64,
    #[serde(rename = "patientCode", default)]
    pub code: String,
    #[serde(default)]
    pub salutation: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub address: String,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(rename = "departmentId")]
    pub id: i64,
    #[serde(rename = "departmentName", default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    #[serde(rename = "employeeId")]
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_on_leave: bool,
}

impl Doctor {
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    #[serde(default)]
    pub time_slot: String,
}

/// One working window of a doctor on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default)]
    pub availability_id: i64,
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub week_type: String,
    pub available_time_start: String,
    pub available_time_end: String,
    #[serde(default)]
    pub booked_slots: Vec<BookedSlot>,
}

/// Appointment as the clinic API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub appointment_id: i64,
    #[serde(default)]
    pub doctor_id: i64,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub appointment_date_time: String,
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub token_number: i64,
}

/// Appointment with the date split out of the timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub date: String,
    pub time_slot: String,
    pub token_number: i64,
}

impl From<AppointmentRecord> for Appointment {
    fn from(record: AppointmentRecord) -> Self {
        let parsed = NaiveDateTime::parse_from_str(&record.appointment_date_time, "%Y-%m-%dT%H:%M:%S").ok();

        let date = match parsed {
            Some(dt) => dt.date().format("%Y-%m-%d").to_string(),
            None => record
                .appointment_date_time
                .split('T')
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        let time_slot = match (record.time_slot.trim().is_empty(), parsed) {
            (true, Some(dt)) => dt.time().format("%I:%M %p").to_string(),
            _ => record.time_slot,
        };

        Self {
            id: record.appointment_id,
            doctor_id: record.doctor_id,
            doctor_name: record.doctor_name,
            date,
            time_slot,
            token_number: record.token_number,
        }
    }
}

// ==============================================================================
// APPOINTMENT CREATION
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    pub patient_code: String,
    pub patient_name: String,
    pub address: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub department_id: i64,
    pub appointment_date: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub online_temp_token: i64,
    pub time_slot: String,
    pub created_from: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempAppointment {
    pub temp_appointment_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created {
        temp_appointment_id: Option<i64>,
        message: String,
    },
    /// The API answered but refused the booking.
    Rejected { message: String },
}

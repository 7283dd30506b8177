use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error, info, instrument, warn};

use shared_config::AppConfig;

use crate::error::DirectoryError;
use crate::models::{
    ApiEnvelope, Appointment, AppointmentRecord, Availability, CreateAppointmentRequest,
    CreateOutcome, Department, Doctor, Patient, TempAppointment,
};

/// Doctors are employees of type 1 in the clinic API.
const DOCTOR_EMPLOYEE_TYPE: &str = "1";

/// Read and write access to the clinic's patient, staff and appointment data.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// Looks patients up by patient code, phone number or patient id.
    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, DirectoryError>;

    async fn list_departments(&self) -> Result<Vec<Department>, DirectoryError>;

    async fn list_doctors(
        &self,
        department_id: i64,
        date: &str,
    ) -> Result<Vec<Doctor>, DirectoryError>;

    async fn doctor_availability(
        &self,
        doctor_id: i64,
        date: &str,
    ) -> Result<Vec<Availability>, DirectoryError>;

    async fn search_appointments(&self, phone: &str) -> Result<Vec<Appointment>, DirectoryError>;

    async fn get_appointment(&self, appointment_id: &str)
        -> Result<Option<Appointment>, DirectoryError>;

    async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateOutcome, DirectoryError>;
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for the clinic management API.
pub struct DirectoryClient {
    client: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(config: &AppConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.clinic_api_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.clinic_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, DirectoryError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let response = self.client.get(&url).query(query).send().await?;
        let envelope: ApiEnvelope<T> = Self::read_envelope(path, response).await?;

        if !envelope.status {
            warn!("Clinic API refused {}: {}", path, envelope.message);
            return Err(DirectoryError::Rejected(envelope.message));
        }

        Ok(envelope.into_data())
    }

    /// Accepts 200 and 201. Any other status becomes `DirectoryError::Status`
    /// carrying the body's `message` when one can be read.
    async fn read_envelope<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<ApiEnvelope<T>, DirectoryError> {
        let status = response.status();
        let response_text = response.text().await?;

        debug!("Clinic API response for {}: {} - {}", path, status, response_text);

        if status != StatusCode::OK && status != StatusCode::CREATED {
            error!("Clinic API error ({}): {}", status, response_text);
            return Err(Self::status_error(status, &response_text));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            DirectoryError::Parse(format!("Failed to parse {} response: {}", path, e))
        })
    }

    fn status_error(status: StatusCode, body: &str) -> DirectoryError {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|error_body| error_body.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("API error: {} (status {})", body, status.as_u16()));

        DirectoryError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl DirectoryApi for DirectoryClient {
    #[instrument(skip(self))]
    async fn search_patients(&self, query: &str) -> Result<Vec<Patient>, DirectoryError> {
        let patients: Vec<Patient> = self
            .get("/api/patient/search", &[("userInput", query.trim())])
            .await?;

        debug!("Patient search returned {} record(s)", patients.len());
        Ok(patients)
    }

    #[instrument(skip(self))]
    async fn list_departments(&self) -> Result<Vec<Department>, DirectoryError> {
        self.get("/api/department/list", &[]).await
    }

    #[instrument(skip(self))]
    async fn list_doctors(
        &self,
        department_id: i64,
        date: &str,
    ) -> Result<Vec<Doctor>, DirectoryError> {
        let department_id = department_id.to_string();
        self.get(
            "/api/doctor/list",
            &[
                ("employeeType", DOCTOR_EMPLOYEE_TYPE),
                ("departmentId", department_id.as_str()),
                ("inputDate", date),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn doctor_availability(
        &self,
        doctor_id: i64,
        date: &str,
    ) -> Result<Vec<Availability>, DirectoryError> {
        let doctor_id = doctor_id.to_string();
        self.get(
            "/api/doctorAvailability/byDate",
            &[("doctorId", doctor_id.as_str()), ("inputDate", date)],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn search_appointments(&self, phone: &str) -> Result<Vec<Appointment>, DirectoryError> {
        let records: Vec<AppointmentRecord> = self
            .get("/api/appointment/search", &[("phoneNumber", phone)])
            .await?;

        Ok(records.into_iter().map(Appointment::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, DirectoryError> {
        let records: Vec<AppointmentRecord> = self
            .get("/api/appointment/get-by-id", &[("appointmentId", appointment_id)])
            .await?;

        Ok(records.into_iter().next().map(Appointment::from))
    }

    #[instrument(skip(self, request), fields(doctor_id = request.doctor_id, slot = %request.time_slot))]
    async fn create_appointment(
        &self,
        request: &CreateAppointmentRequest,
    ) -> Result<CreateOutcome, DirectoryError> {
        let path = "/api/tempAppointment/create";
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let envelope: ApiEnvelope<TempAppointment> = Self::read_envelope(path, response).await?;

        if !envelope.status {
            warn!("Appointment creation refused: {}", envelope.message);
            return Ok(CreateOutcome::Rejected {
                message: envelope.message,
            });
        }

        let message = envelope.message.clone();
        let temp_appointment_id = envelope
            .into_data()
            .first()
            .map(|temp| temp.temp_appointment_id);

        info!("Temporary appointment created: {:?}", temp_appointment_id);
        Ok(CreateOutcome::Created {
            temp_appointment_id,
            message,
        })
    }
}

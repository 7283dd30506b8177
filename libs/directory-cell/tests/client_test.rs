use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use directory_cell::models::{CreateAppointmentRequest, CreateOutcome};
use directory_cell::{DirectoryApi, DirectoryClient, DirectoryError};
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

async fn setup() -> (MockServer, DirectoryClient) {
    let mock_server = MockServer::start().await;
    let config = TestConfig::default()
        .with_clinic_url(&mock_server.uri())
        .to_app_config();
    let client = DirectoryClient::new(&config).unwrap();
    (mock_server, client)
}

fn booking_request() -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id: 11,
        patient_code: "P-0011".to_string(),
        patient_name: "Ravi Kumar".to_string(),
        address: "12 Lake Road".to_string(),
        phone_number: "9876543210".to_string(),
        date_of_birth: "1990-05-17".to_string(),
        department_id: 3,
        appointment_date: "2025-03-14".to_string(),
        doctor_id: 7,
        doctor_name: "Dr. Asha Rao".to_string(),
        online_temp_token: 2,
        time_slot: "09:15 AM".to_string(),
        created_from: "15551234567".to_string(),
    }
}

#[tokio::test]
async fn search_patients_maps_records() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/patient/search"))
        .and(query_param("userInput", "P-0011"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::envelope(
            json!([MockClinicResponses::patient(11, "P-0011", "Ravi", "Kumar")]),
        )))
        .mount(&mock_server)
        .await;

    let patients = client.search_patients(" P-0011 ").await.unwrap();

    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0].id, 11);
    assert_eq!(patients[0].full_name(), "Ravi Kumar");
    assert_eq!(patients[0].mobile_number, "9876543210");
}

#[tokio::test]
async fn doctor_list_sends_expected_query() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/doctor/list"))
        .and(query_param("employeeType", "1"))
        .and(query_param("departmentId", "3"))
        .and(query_param("inputDate", "2025-03-14"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::envelope(
            json!([
                MockClinicResponses::doctor(7, "Asha", "Rao", false),
                MockClinicResponses::doctor(8, "Vikram", "Shah", true)
            ]),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let doctors = client.list_doctors(3, "2025-03-14").await.unwrap();

    assert_eq!(doctors.len(), 2);
    assert_eq!(doctors[0].display_name(), "Dr. Asha Rao");
    assert!(doctors[1].is_on_leave);
}

#[tokio::test]
async fn availability_includes_booked_slots() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/doctorAvailability/byDate"))
        .and(query_param("doctorId", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::envelope(
            json!([MockClinicResponses::availability("09:00:00", "10:00:00", &["09:15 AM"])]),
        )))
        .mount(&mock_server)
        .await;

    let windows = client.doctor_availability(7, "2025-03-14").await.unwrap();

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].available_time_start, "09:00:00");
    assert_eq!(windows[0].booked_slots[0].time_slot, "09:15 AM");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/department/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let result = client.list_departments().await;

    assert_matches!(result, Err(DirectoryError::Status { status: 503, ref message }) => {
        assert_eq!(message, "API error: maintenance (status 503)");
    });
}

#[tokio::test]
async fn refused_lookup_is_rejected() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/appointment/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::failure("Invalid phone number")),
        )
        .mount(&mock_server)
        .await;

    let result = client.search_appointments("9876543210").await;

    assert_matches!(result, Err(DirectoryError::Rejected(message)) => {
        assert_eq!(message, "Invalid phone number");
    });
}

#[tokio::test]
async fn get_appointment_returns_first_record() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/appointment/get-by-id"))
        .and(query_param("appointmentId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockClinicResponses::envelope(
            json!([MockClinicResponses::appointment(42, "Asha Rao", "2025-03-14T09:15:00", "09:15 AM", 3)]),
        )))
        .mount(&mock_server)
        .await;

    let appointment = client.get_appointment("42").await.unwrap().unwrap();

    assert_eq!(appointment.id, 42);
    assert_eq!(appointment.date, "2025-03-14");
    assert_eq!(appointment.token_number, 3);
}

#[tokio::test]
async fn get_appointment_without_data_is_none() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/appointment/get-by-id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockClinicResponses::envelope(json!([]))),
        )
        .mount(&mock_server)
        .await;

    assert_eq!(client.get_appointment("404").await.unwrap(), None);
}

#[tokio::test]
async fn create_appointment_success() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tempAppointment/create"))
        .and(body_partial_json(json!({
            "patientId": 11,
            "doctorId": 7,
            "timeSlot": "09:15 AM",
            "onlineTempToken": 2,
            "createdFrom": "15551234567"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(MockClinicResponses::created(900)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = client.create_appointment(&booking_request()).await.unwrap();

    assert_matches!(outcome, CreateOutcome::Created { temp_appointment_id: Some(900), .. });
}

#[tokio::test]
async fn create_appointment_logical_failure() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tempAppointment/create"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::failure("Slot already booked")),
        )
        .mount(&mock_server)
        .await;

    let outcome = client.create_appointment(&booking_request()).await.unwrap();

    assert_eq!(
        outcome,
        CreateOutcome::Rejected {
            message: "Slot already booked".to_string()
        }
    );
}

#[tokio::test]
async fn create_appointment_error_body_message() {
    let (mock_server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tempAppointment/create"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(MockClinicResponses::failure("Doctor is not available")),
        )
        .mount(&mock_server)
        .await;

    let result = client.create_appointment(&booking_request()).await;

    assert_matches!(result, Err(DirectoryError::Status { status: 400, message }) => {
        assert_eq!(message, "Doctor is not available");
    });
}

#[tokio::test]
async fn unreachable_api_is_transport_error() {
    let config = TestConfig::default()
        .with_clinic_url("http://127.0.0.1:1")
        .to_app_config();
    let client = DirectoryClient::new(&config).unwrap();

    let result = client.list_departments().await;

    assert_matches!(result, Err(DirectoryError::Transport(_)));
    assert!(result.unwrap_err().is_unavailable());
}

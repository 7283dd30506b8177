//! Booking dialogue as a pure function of (session, input).
//!
//! `transition` decides what happens for a user message and
//! `apply_outcome` decides what happens once a directory call returns. Both
//! return the next session state plus the effects to perform, in order.
//! Nothing here touches the network or the session store.

use directory_cell::models::{CreateAppointmentRequest, CreateOutcome, Department, Doctor, Patient};
use directory_cell::DirectoryError;
use messaging_cell::models::MAX_LIST_ROWS;
use shared_utils::validation::{is_valid_phone, parse_date};

use crate::models::{BookingSession, BookingStep, UserInput, MORE_SLOTS_ID};
use crate::services::prompts::*;

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryRequest {
    SearchPatients(String),
    SelectPatient(String),
    Departments,
    Doctors { department_id: i64, date: String },
    Slots { doctor_id: i64, date: String },
    CreateAppointment(CreateAppointmentRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendText(String),
    SendMainMenu,
    SendPatientList(Vec<Patient>),
    SendDepartmentList(Vec<Department>),
    SendDoctorList(Vec<Doctor>),
    StartSlotPages(Vec<String>),
    NextSlotPage,
    Fetch(DirectoryRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The clinic API answered with `status=false` and this message.
    Rejected(String),
    Unavailable(String),
}

impl From<DirectoryError> for FetchError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Rejected(message) => FetchError::Rejected(message),
            other => FetchError::Unavailable(other.to_string()),
        }
    }
}

/// Result of a `DirectoryRequest`, fed back into `apply_outcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryOutcome {
    /// Lookup errors arrive here as an empty list.
    PatientsFound(Vec<Patient>),
    PatientSelected(Vec<Patient>),
    Departments(Result<Vec<Department>, FetchError>),
    Doctors(Result<Vec<Doctor>, FetchError>),
    Slots(Result<Vec<String>, FetchError>),
    Booking(Result<CreateOutcome, FetchError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Keep,
    Save(BookingSession),
    /// Ends the dialogue. Slot pages go with it.
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: SessionChange,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn keep(effects: Vec<Effect>) -> Self {
        Self {
            session: SessionChange::Keep,
            effects,
        }
    }

    fn save(session: BookingSession, effects: Vec<Effect>) -> Self {
        Self {
            session: SessionChange::Save(session),
            effects,
        }
    }

    fn clear(effects: Vec<Effect>) -> Self {
        Self {
            session: SessionChange::Clear,
            effects,
        }
    }

    /// Ends the dialogue with a message followed by the main menu.
    fn abort(message: &str) -> Self {
        Self::clear(vec![text(message), Effect::SendMainMenu])
    }
}

fn text(message: &str) -> Effect {
    Effect::SendText(message.to_string())
}

/// Next step for a user message. `None` starts a new dialogue whatever the
/// input was.
pub fn transition(user: &str, session: Option<&BookingSession>, input: &UserInput) -> Transition {
    let Some(session) = session else {
        return Transition::save(BookingSession::new(user), vec![text(ASK_RETURNING)]);
    };

    if input.is_cancel() {
        return Transition::abort(BOOKING_CANCELLED);
    }

    let mut next = session.clone();

    match (session.step, input) {
        (BookingStep::AskReturning, UserInput::Text(answer)) => {
            match answer.trim().to_lowercase().as_str() {
                "yes" => {
                    next.step = BookingStep::AwaitCode;
                    Transition::save(next, vec![text(ASK_PATIENT_CODE)])
                }
                "no" => {
                    next.step = BookingStep::AwaitName;
                    Transition::save(next, vec![text(ASK_NAME)])
                }
                _ => Transition::keep(vec![text(ANSWER_YES_OR_NO)]),
            }
        }

        (BookingStep::AwaitCode, UserInput::Text(code)) if !code.trim().is_empty() => {
            Transition::keep(vec![Effect::Fetch(DirectoryRequest::SearchPatients(
                code.trim().to_string(),
            ))])
        }

        (BookingStep::ChoosePatient, UserInput::ListReply { id, .. }) if session.offers(id) => {
            Transition::keep(vec![Effect::Fetch(DirectoryRequest::SelectPatient(id.clone()))])
        }

        (BookingStep::AwaitName, UserInput::Text(name)) if !name.trim().is_empty() => {
            next.patient_name = name.trim().to_string();
            next.step = BookingStep::AwaitAddress;
            Transition::save(next, vec![text(ASK_ADDRESS)])
        }

        (BookingStep::AwaitAddress, UserInput::Text(address)) if !address.trim().is_empty() => {
            next.address = address.trim().to_string();
            next.step = BookingStep::AwaitPhone;
            Transition::save(next, vec![text(ASK_PHONE)])
        }

        (BookingStep::AwaitPhone, UserInput::Text(phone)) => {
            if !is_valid_phone(phone) {
                return Transition::keep(vec![text(INVALID_PATIENT_PHONE)]);
            }
            next.phone_number = phone.trim().to_string();
            next.step = BookingStep::AwaitDob;
            Transition::save(next, vec![text(ASK_DOB)])
        }

        (BookingStep::AwaitDob, UserInput::Text(dob)) => match parse_date(dob) {
            Some(date) => {
                next.date_of_birth = date.format("%Y-%m-%d").to_string();
                next.step = BookingStep::ChooseDepartment;
                Transition::save(next, vec![Effect::Fetch(DirectoryRequest::Departments)])
            }
            None => Transition::keep(vec![text(INVALID_DATE)]),
        },

        (BookingStep::ChooseDepartment, UserInput::ListReply { id, .. }) if session.offers(id) => {
            match id.parse::<i64>() {
                Ok(department_id) => {
                    next.department_id = Some(department_id);
                    next.offered_ids.clear();
                    next.step = BookingStep::AwaitDate;
                    Transition::save(next, vec![text(ASK_DATE)])
                }
                Err(_) => reprompt(session),
            }
        }

        (BookingStep::AwaitDate, UserInput::Text(date)) => match parse_date(date) {
            Some(date) => {
                next.appointment_date = date.format("%Y-%m-%d").to_string();
                next.step = BookingStep::ChooseDoctor;
                match doctors_request(&next) {
                    Some(request) => Transition::save(next, vec![Effect::Fetch(request)]),
                    None => restart_department_choice(next),
                }
            }
            None => Transition::keep(vec![text(INVALID_DATE)]),
        },

        (BookingStep::ChooseDoctor, UserInput::ListReply { id, title }) if session.offers(id) => {
            match id.parse::<i64>() {
                Ok(doctor_id) => {
                    next.doctor_id = Some(doctor_id);
                    next.doctor_name = title.clone();
                    next.offered_ids.clear();
                    next.offered_slots.clear();
                    next.step = BookingStep::ChooseSlot;
                    Transition::save(
                        next,
                        vec![Effect::Fetch(DirectoryRequest::Slots {
                            doctor_id,
                            date: session.appointment_date.clone(),
                        })],
                    )
                }
                Err(_) => reprompt(session),
            }
        }

        (BookingStep::ChooseSlot, UserInput::ListReply { id, .. }) if id == MORE_SLOTS_ID => {
            Transition::keep(vec![Effect::NextSlotPage])
        }

        (BookingStep::ChooseSlot, UserInput::ListReply { id, title }) => {
            let Some(token) = session.offered_slot(id, title) else {
                return reprompt(session);
            };
            next.time_slot = title.clone();
            next.online_temp_token = Some(token);
            match next.appointment_request() {
                Some(request) => Transition::save(
                    next,
                    vec![Effect::Fetch(DirectoryRequest::CreateAppointment(request))],
                ),
                None => restart_department_choice(next),
            }
        }

        _ => reprompt(session),
    }
}

/// Next step once a directory call made for `session` has returned.
pub fn apply_outcome(session: &BookingSession, outcome: DirectoryOutcome) -> Transition {
    match outcome {
        DirectoryOutcome::PatientsFound(patients) => match patients.as_slice() {
            [] => Transition::abort(NO_PATIENT_FOUND),
            [patient] => select_patient(session, patient),
            _ => {
                let mut next = session.clone();
                next.step = BookingStep::ChoosePatient;
                next.offered_ids = row_ids(patients.iter().map(|p| p.id));
                Transition::save(next, vec![Effect::SendPatientList(patients)])
            }
        },

        DirectoryOutcome::PatientSelected(patients) => match patients.first() {
            Some(patient) => select_patient(session, patient),
            None => Transition::abort(PATIENT_LOOKUP_FAILED),
        },

        DirectoryOutcome::Departments(Ok(departments)) => {
            if departments.is_empty() {
                Transition::abort(NO_DEPARTMENTS)
            } else {
                let mut next = session.clone();
                next.offered_ids = row_ids(departments.iter().map(|d| d.id));
                Transition::save(next, vec![Effect::SendDepartmentList(departments)])
            }
        }

        DirectoryOutcome::Doctors(Ok(doctors)) => {
            let available: Vec<Doctor> = doctors.into_iter().filter(|d| !d.is_on_leave).collect();
            if available.is_empty() {
                Transition::abort(NO_DOCTORS)
            } else {
                let mut next = session.clone();
                next.offered_ids = row_ids(available.iter().map(|d| d.id));
                Transition::save(next, vec![Effect::SendDoctorList(available)])
            }
        }

        DirectoryOutcome::Slots(Ok(slots)) => {
            if slots.is_empty() {
                Transition::abort(NO_SLOTS)
            } else {
                let mut next = session.clone();
                next.offered_slots = slots.clone();
                Transition::save(next, vec![Effect::StartSlotPages(slots)])
            }
        }

        DirectoryOutcome::Departments(Err(FetchError::Rejected(message))) => {
            abort_with(&message, NO_DEPARTMENTS)
        }
        DirectoryOutcome::Doctors(Err(FetchError::Rejected(message))) => {
            abort_with(&message, NO_DOCTORS)
        }
        DirectoryOutcome::Slots(Err(FetchError::Rejected(message))) => {
            abort_with(&message, NO_SLOTS)
        }

        DirectoryOutcome::Departments(Err(FetchError::Unavailable(_)))
        | DirectoryOutcome::Doctors(Err(FetchError::Unavailable(_)))
        | DirectoryOutcome::Slots(Err(FetchError::Unavailable(_))) => {
            Transition::keep(vec![text(SERVICE_UNAVAILABLE)])
        }

        DirectoryOutcome::Booking(Ok(CreateOutcome::Created { .. })) => {
            Transition::abort(&booking_confirmed(
                &session.doctor_name,
                &session.appointment_date,
                &session.time_slot,
            ))
        }

        DirectoryOutcome::Booking(Ok(CreateOutcome::Rejected { message }))
        | DirectoryOutcome::Booking(Err(FetchError::Rejected(message))) => {
            abort_with(&message, BOOKING_REJECTED)
        }

        // Session and slot pages stay so the user can pick a slot again
        DirectoryOutcome::Booking(Err(FetchError::Unavailable(error))) => {
            Transition::keep(vec![text(&booking_not_created(&error))])
        }
    }
}

/// Ends the dialogue with the clinic API's own message, or `fallback` when
/// it sent none.
fn abort_with(message: &str, fallback: &str) -> Transition {
    if message.trim().is_empty() {
        Transition::abort(fallback)
    } else {
        Transition::abort(message)
    }
}

/// Ids of the rows a rendered list will actually show.
fn row_ids(ids: impl Iterator<Item = i64>) -> Vec<String> {
    ids.take(MAX_LIST_ROWS).map(|id| id.to_string()).collect()
}

fn select_patient(session: &BookingSession, patient: &Patient) -> Transition {
    let mut next = session.clone();
    next.fill_patient(patient);
    next.step = BookingStep::ChooseDepartment;
    Transition::save(next, vec![Effect::Fetch(DirectoryRequest::Departments)])
}

fn doctors_request(session: &BookingSession) -> Option<DirectoryRequest> {
    Some(DirectoryRequest::Doctors {
        department_id: session.department_id?,
        date: session.appointment_date.clone(),
    })
}

fn restart_department_choice(mut session: BookingSession) -> Transition {
    session.step = BookingStep::ChooseDepartment;
    Transition::save(session, vec![Effect::Fetch(DirectoryRequest::Departments)])
}

/// Asks the current step's question again. List steps reload their list.
fn reprompt(session: &BookingSession) -> Transition {
    let ask = |message: &str| Transition::keep(vec![text(message)]);
    let reload = |request: DirectoryRequest| {
        Transition::keep(vec![text(CHOOSE_FROM_LIST), Effect::Fetch(request)])
    };

    match session.step {
        BookingStep::AskReturning => ask(ASK_RETURNING),
        BookingStep::AwaitCode => ask(ASK_PATIENT_CODE),
        BookingStep::ChoosePatient => ask(CHOOSE_FROM_LIST),
        BookingStep::AwaitName => ask(ASK_NAME),
        BookingStep::AwaitAddress => ask(ASK_ADDRESS),
        BookingStep::AwaitPhone => ask(ASK_PHONE),
        BookingStep::AwaitDob => ask(ASK_DOB),
        BookingStep::AwaitDate => ask(ASK_DATE),
        BookingStep::ChooseDepartment => reload(DirectoryRequest::Departments),
        BookingStep::ChooseDoctor => match doctors_request(session) {
            Some(request) => reload(request),
            None => restart_department_choice(session.clone()),
        },
        BookingStep::ChooseSlot => match session.doctor_id {
            Some(doctor_id) => reload(DirectoryRequest::Slots {
                doctor_id,
                date: session.appointment_date.clone(),
            }),
            None => restart_department_choice(session.clone()),
        },
    }
}

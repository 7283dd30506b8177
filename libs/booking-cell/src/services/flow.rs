use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use directory_cell::{DirectoryApi, DirectoryError};

use crate::models::{BookingSession, SlotPage, UserInput};
use crate::services::machine::{
    apply_outcome, transition, DirectoryOutcome, DirectoryRequest, Effect, FetchError,
    SessionChange, Transition,
};
use crate::services::outbox::Outbox;
use crate::services::prompts::NO_MORE_SLOTS;
use crate::services::render;
use crate::services::session_store::SessionStore;
use crate::services::slots::{generate_slots, PageOutcome};

/// Runs the booking dialogue: feeds input through `transition`, performs
/// the resulting effects and persists the session.
pub struct BookingFlowService {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn DirectoryApi>,
    outbox: Outbox,
}

impl BookingFlowService {
    pub fn new(store: Arc<dyn SessionStore>, directory: Arc<dyn DirectoryApi>, outbox: Outbox) -> Self {
        Self {
            store,
            directory,
            outbox,
        }
    }

    /// Handles one message for `user`. The caller holds the user's lock and
    /// passes the session it read under that lock.
    #[instrument(skip(self, session, input))]
    pub async fn handle(&self, user: &str, session: Option<BookingSession>, input: &UserInput) {
        let first = transition(user, session.as_ref(), input);
        self.run(user, session, first).await;
    }

    async fn run(&self, user: &str, mut session: Option<BookingSession>, first: Transition) {
        let mut pending: VecDeque<Effect> = VecDeque::new();
        self.apply_change(user, &mut session, first.session).await;
        pending.extend(first.effects);

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::SendText(body) => self.outbox.text(user, &body).await,
                Effect::SendMainMenu => self.outbox.main_menu(user).await,
                Effect::SendPatientList(patients) => {
                    self.outbox
                        .interactive(user, &render::patient_list(&patients))
                        .await
                }
                Effect::SendDepartmentList(departments) => {
                    self.outbox
                        .interactive(user, &render::department_list(&departments))
                        .await
                }
                Effect::SendDoctorList(doctors) => {
                    self.outbox
                        .interactive(user, &render::doctor_list(&doctors))
                        .await
                }
                Effect::StartSlotPages(slots) => {
                    self.show_slot_page(user, SlotPage::new(slots)).await
                }
                Effect::NextSlotPage => self.next_slot_page(user).await,
                Effect::Fetch(request) => {
                    let Some(current) = session.as_ref() else {
                        warn!("Dropping directory request for {} with no active session", user);
                        continue;
                    };

                    let outcome = self.fetch(request).await;
                    let follow_up = apply_outcome(current, outcome);
                    self.apply_change(user, &mut session, follow_up.session).await;

                    // Follow-up effects run before anything still queued
                    for effect in follow_up.effects.into_iter().rev() {
                        pending.push_front(effect);
                    }
                }
            }
        }

        if let Some(session) = session {
            debug!("Booking session for {} now at {:?}", user, session.step);
            self.store.save_booking_session(user, session).await;
        }
    }

    async fn apply_change(
        &self,
        user: &str,
        session: &mut Option<BookingSession>,
        change: SessionChange,
    ) {
        match change {
            SessionChange::Keep => {}
            SessionChange::Save(next) => *session = Some(next),
            SessionChange::Clear => {
                *session = None;
                self.store.clear_booking_session(user).await;
                self.store.clear_slot_page(user).await;
                info!("Booking session for {} closed", user);
            }
        }
    }

    async fn fetch(&self, request: DirectoryRequest) -> DirectoryOutcome {
        match request {
            DirectoryRequest::SearchPatients(query) => {
                let patients = self.directory.search_patients(&query).await.unwrap_or_else(|e| {
                    warn!("Patient search failed, treating as no match: {}", e);
                    Vec::new()
                });
                DirectoryOutcome::PatientsFound(patients)
            }
            DirectoryRequest::SelectPatient(patient_id) => {
                let patients = self
                    .directory
                    .search_patients(&patient_id)
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Patient lookup by id {} failed: {}", patient_id, e);
                        Vec::new()
                    });
                DirectoryOutcome::PatientSelected(patients)
            }
            DirectoryRequest::Departments => DirectoryOutcome::Departments(
                self.directory
                    .list_departments()
                    .await
                    .map_err(|e| log_failure("Department list", e)),
            ),
            DirectoryRequest::Doctors {
                department_id,
                date,
            } => DirectoryOutcome::Doctors(
                self.directory
                    .list_doctors(department_id, &date)
                    .await
                    .map_err(|e| log_failure("Doctor list", e)),
            ),
            DirectoryRequest::Slots { doctor_id, date } => DirectoryOutcome::Slots(
                self.directory
                    .doctor_availability(doctor_id, &date)
                    .await
                    .map(|windows| generate_slots(&windows))
                    .map_err(|e| log_failure("Doctor availability", e)),
            ),
            DirectoryRequest::CreateAppointment(request) => DirectoryOutcome::Booking(
                self.directory
                    .create_appointment(&request)
                    .await
                    .map_err(|e| log_failure("Appointment creation", e)),
            ),
        }
    }

    async fn show_slot_page(&self, user: &str, page: SlotPage) {
        match page.render() {
            PageOutcome::Page(message) => {
                self.store.save_slot_page(user, page).await;
                self.outbox.interactive(user, &message).await;
            }
            PageOutcome::Exhausted => {
                self.store.clear_slot_page(user).await;
                self.outbox.text(user, NO_MORE_SLOTS).await;
            }
        }
    }

    async fn next_slot_page(&self, user: &str) {
        match self.store.slot_page(user).await {
            Some(mut page) => {
                page.advance();
                self.show_slot_page(user, page).await;
            }
            None => self.outbox.text(user, NO_MORE_SLOTS).await,
        }
    }
}

fn log_failure(what: &str, err: DirectoryError) -> FetchError {
    if err.is_unavailable() {
        error!("{} failed: {}", what, err);
    } else {
        warn!("{} rejected by clinic API: {}", what, err);
    }
    FetchError::from(err)
}

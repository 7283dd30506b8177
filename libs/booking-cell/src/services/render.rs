use tracing::warn;

use directory_cell::models::{Appointment, Department, Doctor, Patient};
use messaging_cell::models::{
    ButtonReply, InteractiveMessage, ListRow, ListSection, MAX_LIST_ROWS,
};

use crate::models::{MENU_CONTACT_US, MENU_MY_APPOINTMENT, MENU_NEW_APPOINTMENT};
use crate::services::prompts::{FOOTER, MENU_BODY};

fn capped(kind: &str, mut rows: Vec<ListRow>) -> Vec<ListRow> {
    if rows.len() > MAX_LIST_ROWS {
        warn!("{} list has {} rows, showing the first {}", kind, rows.len(), MAX_LIST_ROWS);
        rows.truncate(MAX_LIST_ROWS);
    }
    rows
}

pub fn main_menu() -> InteractiveMessage {
    let button = |id: &str, title: &str| ButtonReply {
        id: id.to_string(),
        title: title.to_string(),
    };

    InteractiveMessage::buttons(
        MENU_BODY,
        vec![
            button(MENU_MY_APPOINTMENT, "📅 My Appointment"),
            button(MENU_NEW_APPOINTMENT, "🆕 New Appointment"),
            button(MENU_CONTACT_US, "📞 Contact Us"),
        ],
    )
    .with_footer(FOOTER)
}

pub fn patient_list(patients: &[Patient]) -> InteractiveMessage {
    let rows = patients
        .iter()
        .map(|patient| {
            let full_name = patient.full_name();
            ListRow::new(patient.id.to_string(), &full_name).with_description(&format!(
                "Patient Code: {} | {}",
                patient.code, full_name
            ))
        })
        .collect();

    InteractiveMessage::list(
        "Choose one patient for appointment:",
        "Choose Patient",
        vec![ListSection::new("Search Results", capped("Patient", rows))],
    )
    .with_header("📅 Patient Details")
    .with_footer(FOOTER)
}

pub fn department_list(departments: &[Department]) -> InteractiveMessage {
    let rows = departments
        .iter()
        .map(|department| ListRow::new(department.id.to_string(), &department.name))
        .collect();

    InteractiveMessage::list(
        "Please select a department",
        "Choose",
        vec![ListSection::new("Departments", capped("Department", rows))],
    )
    .with_header("🏥 Departments")
    .with_footer(FOOTER)
}

pub fn doctor_list(doctors: &[Doctor]) -> InteractiveMessage {
    let rows = doctors
        .iter()
        .map(|doctor| ListRow::new(doctor.id.to_string(), &doctor.display_name()))
        .collect();

    InteractiveMessage::list(
        "Please select a doctor from the list below:",
        "Choose Doctor",
        vec![ListSection::new("Doctors", capped("Doctor", rows))],
    )
    .with_header("👨‍⚕️ Available Doctors")
    .with_footer(FOOTER)
}

pub fn appointment_list(appointments: &[Appointment]) -> InteractiveMessage {
    let rows = appointments
        .iter()
        .map(|appointment| {
            ListRow::new(
                appointment.id.to_string(),
                &format!("Dr. {}", appointment.doctor_name),
            )
            .with_description(&format!(
                "Date: {}, Time: {}",
                appointment.date, appointment.time_slot
            ))
        })
        .collect();

    InteractiveMessage::list(
        "Select one appointment for details:",
        "Choose Appointment",
        vec![ListSection::new("Your Appointments", capped("Appointment", rows))],
    )
    .with_header("📅 My Appointments")
    .with_footer(FOOTER)
}

/// Shown when a phone lookup finds exactly one appointment.
pub fn appointment_summary(appointment: &Appointment) -> String {
    format!(
        "📅 Appointment Details\n\nDoctor: Dr. {}\nDate: {}\nTime: {}",
        appointment.doctor_name, appointment.date, appointment.time_slot
    )
}

pub fn appointment_details(appointment: &Appointment) -> String {
    format!(
        "✅ Appointment Details\n👨‍⚕️ Doctor: {}\n📅 Date: {}\n⏰ Time: {}\n🔢 Token: {}",
        appointment.doctor_name, appointment.date, appointment.time_slot, appointment.token_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use messaging_cell::models::{InteractiveKind, MAX_ROW_DESCRIPTION_CHARS, MAX_ROW_TITLE_CHARS};

    fn patient(id: i64, first: &str, last: &str, code: &str) -> Patient {
        Patient {
            id,
            code: code.to_string(),
            salutation: String::new(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: "1990-05-17".to_string(),
            mobile_number: "9876543210".to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn main_menu_has_three_buttons() {
        let menu = main_menu();

        assert_eq!(menu.kind, InteractiveKind::Button);
        let ids: Vec<&str> = menu.action.buttons.iter().map(|b| b.reply.id.as_str()).collect();
        assert_eq!(ids, vec!["my_appointment", "new_appointment", "contact_us"]);
        assert!(menu.validate().is_ok());
    }

    #[test]
    fn patient_rows_respect_length_limits() {
        let patients = vec![
            patient(1, "Venkata Subramanya", "Raghavendran Iyer", "PAT-2024-000001"),
            patient(2, "Anu", "Rao", "P2"),
        ];

        let message = patient_list(&patients);
        let rows: Vec<&ListRow> = message.rows().collect();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert!(row.title.chars().count() <= MAX_ROW_TITLE_CHARS);
            let description = row.description.as_deref().unwrap();
            assert!(description.chars().count() <= MAX_ROW_DESCRIPTION_CHARS);
        }

        assert!(rows[0].title.ends_with('…'));
        assert_eq!(rows[0].title.chars().count(), MAX_ROW_TITLE_CHARS);
        assert_eq!(rows[0].id, "1");
        assert_eq!(rows[1].title, "Anu Rao");
        assert_eq!(rows[1].description.as_deref(), Some("Patient Code: P2 | Anu Rao"));
    }

    #[test]
    fn long_lists_are_capped() {
        let departments: Vec<Department> = (1..=14)
            .map(|id| Department { id, name: format!("Department {}", id) })
            .collect();

        let message = department_list(&departments);

        assert_eq!(message.rows().count(), MAX_LIST_ROWS);
        assert!(message.validate().is_ok());
    }

    #[test]
    fn appointment_texts() {
        let appointment = Appointment {
            id: 42,
            doctor_id: 7,
            doctor_name: "Asha Rao".to_string(),
            date: "2025-03-14".to_string(),
            time_slot: "09:15 AM".to_string(),
            token_number: 5,
        };

        assert_eq!(
            appointment_summary(&appointment),
            "📅 Appointment Details\n\nDoctor: Dr. Asha Rao\nDate: 2025-03-14\nTime: 09:15 AM"
        );
        assert!(appointment_details(&appointment).ends_with("🔢 Token: 5"));

        let list = appointment_list(&[appointment]);
        let row = list.rows().next().unwrap();
        assert_eq!(row.title, "Dr. Asha Rao");
        assert_eq!(row.description.as_deref(), Some("Date: 2025-03-14, Time: 09:15 AM"));
    }
}

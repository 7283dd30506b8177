// Texts sent to patients during the chat dialogues.

pub const MENU_BODY: &str = "👋 Hi! How can we help you today?";
pub const FOOTER: &str = "Clinic Support";

pub const ASK_RETURNING: &str = "🩺 Have you already consulted here before? (Yes/No)";
pub const ANSWER_YES_OR_NO: &str = "❌ Please reply Yes or No.";
pub const ASK_PATIENT_CODE: &str = "📋 Please enter your patient code or registered phone number:";
pub const ASK_NAME: &str = "👤 Please enter your full name:";
pub const ASK_ADDRESS: &str = "🏠 Please enter your address:";
pub const ASK_PHONE: &str = "📞 Please enter your phone number:";
pub const ASK_DOB: &str = "📅 Please enter your date of birth (YYYY-MM-DD):";
pub const ASK_DATE: &str = "📅 Please enter your preferred date (YYYY-MM-DD):";
pub const INVALID_DATE: &str = "❌ Please enter the date in the format YYYY-MM-DD.";
pub const INVALID_PATIENT_PHONE: &str = "❌ Please enter a phone number of 8 to 15 digits.";
pub const CHOOSE_FROM_LIST: &str = "👆 Please choose an option from the list.";

pub const NO_PATIENT_FOUND: &str = "❌ No patient found. Please try again.";
pub const PATIENT_LOOKUP_FAILED: &str = "❌ Could not fetch patient details. Please try again.";
pub const NO_DEPARTMENTS: &str = "❌ No departments are available right now.";
pub const NO_DOCTORS: &str = "❌ No doctors available in this department on the selected date.";
pub const NO_SLOTS: &str = "❌ No available slots found for this doctor.";
pub const NO_MORE_SLOTS: &str = "✅ No more slots. Please choose one of the slots shown above.";
pub const SERVICE_UNAVAILABLE: &str =
    "⚠️ Our booking service is unavailable right now. Please try again later.";
pub const BOOKING_CANCELLED: &str = "🚫 Appointment booking cancelled.";
pub const BOOKING_REJECTED: &str = "⚠️ Appointment failed.";

pub const ASK_VIEW_PHONE: &str = "📞 Please enter your phone number to view appointments:";
pub const INVALID_VIEW_PHONE: &str = "❌ Invalid input. Please enter a valid phone number.";
pub const APPOINTMENTS_UNAVAILABLE: &str = "⚠️ Sorry, could not fetch your appointments right now.";
pub const NO_APPOINTMENTS: &str = "❌ You do not have any active appointments.";
pub const APPOINTMENT_DETAILS_FAILED: &str = "⚠️ Failed to fetch appointment details. Try again later.";
pub const APPOINTMENT_NOT_FOUND: &str = "❓ Appointment not found.";
pub const NOT_UNDERSTOOD: &str = "🤔 Sorry, I didn't understand that.";

pub fn booking_confirmed(doctor: &str, date: &str, slot: &str) -> String {
    format!("✅ Appointment booked with {} on {} at {}", doctor, date, slot)
}

pub fn booking_not_created(error: &str) -> String {
    format!(
        "⚠️ Appointment could not be created: {}\nPlease select a slot again to retry, or type *cancel* to stop.",
        error
    )
}

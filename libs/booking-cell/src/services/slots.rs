use std::collections::HashSet;

use chrono::{Duration, NaiveTime};
use tracing::warn;

use directory_cell::models::Availability;
use messaging_cell::models::{InteractiveMessage, ListRow, ListSection, MAX_LIST_ROWS};

use crate::models::{SlotPage, MORE_SLOTS_ID};

pub const SLOT_MINUTES: i64 = 15;
/// Slots per page when a "next" row has to fit in the list.
pub const PAGE_SIZE: usize = MAX_LIST_ROWS - 1;

fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
}

/// 15 minute labels from `start` (inclusive) to `end` (exclusive), minus
/// the booked ones.
pub fn slots_for_window(
    start: &str,
    end: &str,
    booked: &HashSet<&str>,
) -> Result<Vec<String>, chrono::ParseError> {
    let start = parse_time(start)?;
    let end = parse_time(end)?;

    let mut slots = Vec::new();
    let mut current = start;
    while current < end {
        let label = current.format("%I:%M %p").to_string();
        if !booked.contains(label.as_str()) {
            slots.push(label);
        }

        let (next, wrapped) = current.overflowing_add_signed(Duration::minutes(SLOT_MINUTES));
        if wrapped != 0 {
            break;
        }
        current = next;
    }

    Ok(slots)
}

/// Free slot labels across all windows, in window order.
pub fn generate_slots(windows: &[Availability]) -> Vec<String> {
    let mut slots = Vec::new();

    for window in windows {
        let booked: HashSet<&str> = window
            .booked_slots
            .iter()
            .map(|slot| slot.time_slot.as_str())
            .collect();

        match slots_for_window(&window.available_time_start, &window.available_time_end, &booked) {
            Ok(window_slots) => slots.extend(window_slots),
            Err(e) => warn!(
                "Skipping availability window {} ({} - {}): {}",
                window.availability_id, window.available_time_start, window.available_time_end, e
            ),
        }
    }

    slots
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Page(InteractiveMessage),
    Exhausted,
}

impl SlotPage {
    pub fn new(slots: Vec<String>) -> Self {
        Self {
            slots,
            page: 0,
            page_size: PAGE_SIZE,
        }
    }

    pub fn advance(&mut self) {
        self.page += 1;
    }

    fn start(&self) -> usize {
        self.page * self.page_size
    }

    /// Full pages leave room for the "next" row; the last page may use it.
    pub fn total_pages(&self) -> usize {
        let len = self.slots.len();
        if len <= MAX_LIST_ROWS {
            return 1;
        }
        (len - MAX_LIST_ROWS).div_ceil(self.page_size) + 1
    }

    pub fn render(&self) -> PageOutcome {
        let len = self.slots.len();
        let start = self.start();
        if start >= len {
            return PageOutcome::Exhausted;
        }

        let end = if len - start <= MAX_LIST_ROWS {
            len
        } else {
            start + self.page_size
        };

        let mut rows: Vec<ListRow> = self.slots[start..end]
            .iter()
            .enumerate()
            .map(|(offset, label)| ListRow::new((start + offset + 1).to_string(), label))
            .collect();

        if end < len {
            rows.push(ListRow::new(MORE_SLOTS_ID, "➡ Next Slots"));
        }

        let message = InteractiveMessage::list(
            &format!("Page {} of {}", self.page + 1, self.total_pages()),
            "Choose Slot",
            vec![ListSection::new(&format!("Slots {} - {}", start + 1, end), rows)],
        )
        .with_header("⏰ Available Time Slots");

        PageOutcome::Page(message)
    }
}

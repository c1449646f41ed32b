use chrono::NaiveDate;

use super::models::CreateBookingRequest;
use crate::common::validation::parse_date;
use crate::common::{ValidationResult, Validator};

/// Validates new bookings against the date they are made on
pub struct BookingValidator {
    pub today: NaiveDate,
}

impl Validator<CreateBookingRequest> for BookingValidator {
    fn validate(&self, data: &CreateBookingRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.artist_id.trim().is_empty() {
            result.add_error("artist_id", "artist_id is required");
        }

        match parse_date(&data.event_date) {
            None => result.add_error("event_date", "event_date must be a YYYY-MM-DD date"),
            Some(date) if date < self.today => {
                result.add_error("event_date", "event_date cannot be in the past")
            }
            Some(_) => {}
        }

        result.check_text("event_type", &data.event_type, 100);
        result.check_text("location", &data.location, 200);

        if data.price < 0 {
            result.add_error("price", "price cannot be negative");
        }

        if let Some(notes) = &data.notes {
            if notes.chars().count() > 2000 {
                result.add_error("notes", "notes must be at most 2000 characters");
            }
        }

        result
    }
}

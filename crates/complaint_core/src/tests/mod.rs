mod db_tests;
mod protocol_tests;

use crate::schema::{Category, Complaint, EditedRow, Status};
use time::{Date, Month};

pub fn create_test_complaint(protocol: &str, category: Category) -> Complaint {
    Complaint {
        protocol: protocol.to_string(),
        created_at: String::from("2024-01-10 09:30:00"),
        neighborhood: String::from("Centro"),
        street: String::from("Rua das Flores"),
        house_number: String::from("120"),
        postal_code: String::from("13010-000"),
        category,
        description: String::from("Standing water in tires"),
        attended_at: String::new(),
        status: Status::Unset,
        report: String::new(),
    }
}

pub fn create_test_date(year: i32, month: Month, day: u8) -> Date {
    Date::from_calendar_date(year, month, day).expect("Valid test date")
}

pub fn create_test_row(
    protocol: &str,
    attended_at: Option<Date>,
    status: Option<Status>,
    report: Option<&str>,
) -> EditedRow {
    EditedRow {
        protocol: protocol.to_string(),
        attended_at,
        status,
        report: report.map(str::to_string),
    }
}

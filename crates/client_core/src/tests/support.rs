//! Fixtures shared by the unit tests.

use chrono::NaiveDate;
use shared::domain::{
    AvailabilitySnapshot, DayAvailability, OptionId, PricingOption, StaffId, TimeSlot, Treatment,
    TreatmentId,
};

use crate::validation::ContactDetails;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn slot(staff_id: &str, start_time: &str, end_time: &str) -> TimeSlot {
    TimeSlot {
        staff_id: StaffId::new(staff_id),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        available_start: Some("09:00".to_string()),
        available_end: Some("18:00".to_string()),
    }
}

pub fn snapshot(days: Vec<(NaiveDate, Vec<TimeSlot>)>) -> AvailabilitySnapshot {
    AvailabilitySnapshot {
        dates: days
            .into_iter()
            .map(|(date, slots)| {
                (
                    date,
                    DayAvailability {
                        day_name: date.format("%A").to_string(),
                        slots,
                    },
                )
            })
            .collect(),
    }
}

pub fn option(id: &str, name: &str, price: f64, duration_minutes: Option<u32>) -> PricingOption {
    PricingOption {
        id: OptionId::new(id),
        name: name.to_string(),
        price,
        duration_minutes,
    }
}

pub fn catalog() -> Vec<Treatment> {
    vec![
        Treatment {
            id: TreatmentId::new("haircut"),
            name: "Haircut & Styling".to_string(),
            options: vec![
                option("haircut-short", "Short hair", 45.0, Some(45)),
                option("haircut-long", "Long hair", 60.0, None),
            ],
        },
        Treatment {
            id: TreatmentId::new("color"),
            name: "Hair Coloring".to_string(),
            options: vec![option("color-full", "Full color", 95.0, Some(120))],
        },
    ]
}

pub fn valid_contact() -> ContactDetails {
    ContactDetails {
        first_name: "Anna".to_string(),
        last_name: "Peeters".to_string(),
        email: "anna@example.be".to_string(),
        phone: "0470123456".to_string(),
        message: String::new(),
    }
}

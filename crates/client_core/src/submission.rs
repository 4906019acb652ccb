//! Turns a completed booking draft into the request sent to the scheduling service.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use shared::{
    domain::{AvailabilitySnapshot, CompanyId, StaffId, Treatment},
    protocol::BookingRequest,
};
use uuid::Uuid;

use crate::{error::WizardError, wizard::BookingDraft};

/// What the customer picked, in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSummary {
    pub treatment_name: String,
    pub option_name: String,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedBooking {
    pub request: BookingRequest,
    pub summary: BookingSummary,
}

pub fn parse_slot_time(time: &str) -> Result<NaiveTime, WizardError> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| WizardError::InvalidTime(time.to_string()))
}

/// Start and end of an appointment starting at `time` on `date`.
pub fn appointment_window(
    date: NaiveDate,
    time: &str,
    duration_minutes: u32,
) -> Result<(NaiveDateTime, NaiveDateTime), WizardError> {
    let start = date.and_time(parse_slot_time(time)?);
    let end = start + Duration::minutes(i64::from(duration_minutes));
    Ok((start, end))
}

/// First slot in stored order starting at `time` wins.
pub fn resolve_staff<'a>(
    snapshot: &'a AvailabilitySnapshot,
    date: NaiveDate,
    time: &str,
) -> Option<&'a StaffId> {
    snapshot
        .day(date)?
        .slots
        .iter()
        .find(|slot| slot.start_time == time)
        .map(|slot| &slot.staff_id)
}

pub fn prepare_booking(
    catalog: &[Treatment],
    draft: &BookingDraft,
    snapshot: &AvailabilitySnapshot,
    company_id: &CompanyId,
    request_id: Uuid,
) -> Result<PreparedBooking, WizardError> {
    let treatment_id = draft
        .treatment_id
        .as_ref()
        .ok_or(WizardError::TreatmentRequired)?;
    let option_id = draft.option_id.as_ref().ok_or(WizardError::TreatmentRequired)?;
    let treatment = catalog
        .iter()
        .find(|treatment| &treatment.id == treatment_id)
        .ok_or_else(|| WizardError::UnknownTreatment(treatment_id.clone()))?;
    let option = treatment
        .option(option_id)
        .ok_or_else(|| WizardError::UnknownOption {
            treatment_id: treatment_id.clone(),
            option_id: option_id.clone(),
        })?;

    let (Some(date), Some(time)) = (draft.date, draft.time.as_deref()) else {
        return Err(WizardError::ScheduleRequired);
    };

    let duration = option.duration_or_default();
    let (start, end) = appointment_window(date, time, duration)?;

    let staff_id = resolve_staff(snapshot, date, time).ok_or_else(|| WizardError::StaleSlot {
        date,
        time: time.to_string(),
    })?;

    let contact = &draft.contact;
    let request = BookingRequest {
        request_id,
        start,
        end,
        staff_id: staff_id.clone(),
        company_id: company_id.clone(),
        treatment_id: treatment.id.clone(),
        price: option.price,
        duration,
        first_name: contact.first_name.trim().to_string(),
        last_name: contact.last_name.trim().to_string(),
        email: contact.email.trim().to_string(),
        notes: contact.notes(),
    };

    Ok(PreparedBooking {
        request,
        summary: BookingSummary {
            treatment_name: treatment.name.clone(),
            option_name: option.name.clone(),
            date,
            time: time.to_string(),
        },
    })
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;

use super::*;
use crate::test_support::{catalog, date, slot, snapshot, valid_contact};

use shared::domain::{OptionId, TreatmentId};

fn complete_draft() -> BookingDraft {
    BookingDraft {
        treatment_id: Some(TreatmentId::new("haircut")),
        option_id: Some(OptionId::new("haircut-short")),
        date: Some(date(2025, 6, 10)),
        time: Some("09:00".to_string()),
        contact: valid_contact(),
        request_id: None,
    }
}

fn june_tenth() -> AvailabilitySnapshot {
    snapshot(vec![(
        date(2025, 6, 10),
        vec![
            slot("s1", "09:00", "10:00"),
            slot("s2", "09:00", "10:00"),
            slot("s2", "11:00", "12:00"),
        ],
    )])
}

#[test]
fn builds_request_from_draft_and_snapshot() {
    let request_id = Uuid::new_v4();
    let prepared = prepare_booking(
        &catalog(),
        &complete_draft(),
        &june_tenth(),
        &CompanyId::new("salon-1"),
        request_id,
    )
    .expect("prepared booking");

    let request = &prepared.request;
    assert_eq!(request.request_id, request_id);
    assert_eq!(request.start, date(2025, 6, 10).and_hms_opt(9, 0, 0).expect("start"));
    assert_eq!(request.end, date(2025, 6, 10).and_hms_opt(9, 45, 0).expect("end"));
    assert_eq!(request.staff_id, StaffId::new("s1"));
    assert_eq!(request.price, 45.0);
    assert_eq!(request.duration, 45);
    assert_eq!(request.notes, None);
    assert_eq!(prepared.summary.treatment_name, "Haircut & Styling");
    assert_eq!(prepared.summary.option_name, "Short hair");
}

#[test]
fn missing_duration_defaults_to_an_hour() {
    let mut draft = complete_draft();
    draft.option_id = Some(OptionId::new("haircut-long"));
    draft.time = Some("11:00".to_string());

    let prepared = prepare_booking(
        &catalog(),
        &draft,
        &june_tenth(),
        &CompanyId::new("salon-1"),
        Uuid::new_v4(),
    )
    .expect("prepared booking");

    assert_eq!(prepared.request.duration, 60);
    assert_eq!(
        prepared.request.end,
        date(2025, 6, 10).and_hms_opt(12, 0, 0).expect("end")
    );
    assert_eq!(prepared.request.staff_id, StaffId::new("s2"));
}

#[test]
fn vanished_slot_is_a_local_error() {
    let mut draft = complete_draft();
    draft.time = Some("10:00".to_string());

    let err = prepare_booking(
        &catalog(),
        &draft,
        &june_tenth(),
        &CompanyId::new("salon-1"),
        Uuid::new_v4(),
    )
    .expect_err("stale slot");

    assert_eq!(
        err,
        WizardError::StaleSlot {
            date: date(2025, 6, 10),
            time: "10:00".to_string()
        }
    );
}

#[test]
fn unresolvable_catalog_entries_abort() {
    let company = CompanyId::new("salon-1");

    let mut draft = complete_draft();
    draft.treatment_id = Some(TreatmentId::new("perm"));
    assert_eq!(
        prepare_booking(&catalog(), &draft, &june_tenth(), &company, Uuid::new_v4()),
        Err(WizardError::UnknownTreatment(TreatmentId::new("perm")))
    );

    let mut draft = complete_draft();
    draft.option_id = Some(OptionId::new("color-full"));
    assert!(matches!(
        prepare_booking(&catalog(), &draft, &june_tenth(), &company, Uuid::new_v4()),
        Err(WizardError::UnknownOption { .. })
    ));

    let mut draft = complete_draft();
    draft.time = None;
    assert_eq!(
        prepare_booking(&catalog(), &draft, &june_tenth(), &company, Uuid::new_v4()),
        Err(WizardError::ScheduleRequired)
    );
}

#[test]
fn slot_times_accept_seconds() {
    assert_eq!(
        parse_slot_time("09:30:00").expect("time"),
        NaiveTime::from_hms_opt(9, 30, 0).expect("time")
    );
    assert_eq!(
        parse_slot_time("9h30"),
        Err(WizardError::InvalidTime("9h30".to_string()))
    );
}

#[test]
fn request_serializes_with_service_field_names() {
    let request_id = Uuid::new_v4();
    let mut draft = complete_draft();
    draft.contact.message = "Bring photos".to_string();
    let prepared = prepare_booking(
        &catalog(),
        &draft,
        &june_tenth(),
        &CompanyId::new("salon-1"),
        request_id,
    )
    .expect("prepared booking");

    let json = serde_json::to_value(&prepared.request).expect("json");
    assert_eq!(json["start"], "2025-06-10T09:00:00");
    assert_eq!(json["end"], "2025-06-10T09:45:00");
    assert_eq!(json["staffId"], "s1");
    assert_eq!(json["companyId"], "salon-1");
    assert_eq!(json["treatmentId"], "haircut");
    assert_eq!(json["firstName"], "Anna");
    assert_eq!(json["notes"], "Bring photos");
    assert_eq!(json["requestId"], request_id.to_string());
}

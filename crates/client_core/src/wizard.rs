//! Booking wizard state container.
//!
//! `WizardState::apply` is a pure transition: it mutates in-memory state and returns
//! the commands the caller has to run (availability fetches, booking submissions,
//! notifications). Results of those commands come back in as actions.
//!
//! Picking a different treatment always returns to the treatment step and drops the
//! schedule, so there is no refetch on treatment change while the calendar is shown:
//! the fetch happens again when the customer moves forward to the calendar.

use std::fmt;

use chrono::NaiveDate;
use shared::{
    domain::{AvailabilitySnapshot, CompanyId, OptionId, Treatment, TreatmentId},
    protocol::{AvailabilityQuery, BookingConfirmation, BookingRequest},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    calendar::{self, Locale, MonthView, MonthViewInput, YearMonth},
    error::WizardError,
    submission::{prepare_booking, BookingSummary},
    validation::{validate_contact, ContactDetails, ContactField},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    SelectTreatment = 1,
    SelectSchedule = 2,
    EnterDetails = 3,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub treatment_id: Option<TreatmentId>,
    pub option_id: Option<OptionId>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub contact: ContactDetails,
    /// Idempotency id of the last submission attempt. Kept across retries of an
    /// unchanged draft, dropped on any edit.
    pub request_id: Option<Uuid>,
}

impl BookingDraft {
    pub fn has_treatment_selection(&self) -> bool {
        self.treatment_id.is_some() && self.option_id.is_some()
    }

    pub fn has_schedule_selection(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }
}

/// Identifies one availability fetch. Only the ticket of the latest generation may
/// update the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: AvailabilityQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    fn booked(summary: &BookingSummary) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: "Appointment booked".to_string(),
            description: format!(
                "{} ({}) on {} at {}",
                summary.treatment_name,
                summary.option_name,
                summary.date.format("%Y-%m-%d"),
                summary.time
            ),
        }
    }

    fn booking_failed(service_message: Option<&str>) -> Self {
        let description = service_message
            .map(str::to_string)
            .unwrap_or_else(|| "Something went wrong while booking. Please try again.".to_string());
        Self {
            kind: NotificationKind::Failure,
            title: "Booking failed".to_string(),
            description,
        }
    }
}

/// Outcome of a failed booking call, reduced to what the wizard needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service_message: Option<String>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    CatalogLoaded(Vec<Treatment>),
    SelectTreatment(TreatmentId),
    SelectOption(OptionId),
    Next,
    Back,
    ShowMonth(YearMonth),
    NextMonth,
    PreviousMonth,
    SelectDate(NaiveDate),
    SelectTime(String),
    SetContact(ContactField, String),
    Submit,
    AvailabilityLoaded {
        ticket: FetchTicket,
        result: Result<AvailabilitySnapshot, String>,
    },
    SubmissionFinished {
        request_id: Uuid,
        result: Result<BookingConfirmation, ServiceFailure>,
    },
}

impl WizardAction {
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::CatalogLoaded(_) => "catalog_loaded",
            WizardAction::SelectTreatment(_) => "select_treatment",
            WizardAction::SelectOption(_) => "select_option",
            WizardAction::Next => "next",
            WizardAction::Back => "back",
            WizardAction::ShowMonth(_) => "show_month",
            WizardAction::NextMonth => "next_month",
            WizardAction::PreviousMonth => "previous_month",
            WizardAction::SelectDate(_) => "select_date",
            WizardAction::SelectTime(_) => "select_time",
            WizardAction::SetContact(..) => "set_contact",
            WizardAction::Submit => "submit",
            WizardAction::AvailabilityLoaded { .. } => "availability_loaded",
            WizardAction::SubmissionFinished { .. } => "submission_finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    FetchAvailability(FetchTicket),
    SubmitBooking(BookingRequest),
    Notify(Notification),
}

#[derive(Debug, Clone)]
struct InFlightSubmission {
    request_id: Uuid,
    summary: BookingSummary,
}

#[derive(Debug, Clone)]
pub struct WizardState {
    company_id: CompanyId,
    today: NaiveDate,
    step: WizardStep,
    catalog: Vec<Treatment>,
    draft: BookingDraft,
    visible_month: YearMonth,
    snapshot: AvailabilitySnapshot,
    fetch_generation: u64,
    availability_loading: bool,
    in_flight: Option<InFlightSubmission>,
}

impl WizardState {
    pub fn new(company_id: CompanyId, today: NaiveDate) -> Self {
        Self {
            company_id,
            today,
            step: WizardStep::SelectTreatment,
            catalog: Vec::new(),
            draft: BookingDraft::default(),
            visible_month: YearMonth::containing(today),
            snapshot: AvailabilitySnapshot::default(),
            fetch_generation: 0,
            availability_loading: false,
            in_flight: None,
        }
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn catalog(&self) -> &[Treatment] {
        &self.catalog
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn visible_month(&self) -> YearMonth {
        self.visible_month
    }

    pub fn snapshot(&self) -> &AvailabilitySnapshot {
        &self.snapshot
    }

    pub fn is_loading_availability(&self) -> bool {
        self.availability_loading
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn selected_treatment(&self) -> Option<&Treatment> {
        let id = self.draft.treatment_id.as_ref()?;
        self.catalog.iter().find(|treatment| &treatment.id == id)
    }

    pub fn load_catalog(&mut self, treatments: Vec<Treatment>) {
        self.catalog = treatments;
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::SelectTreatment => self.draft.has_treatment_selection(),
            WizardStep::SelectSchedule => self.draft.has_schedule_selection(),
            WizardStep::EnterDetails => false,
        }
    }

    pub fn is_day_disabled(&self, date: NaiveDate) -> bool {
        calendar::is_day_disabled(date, self.today, &self.snapshot)
    }

    /// Start times offered on the selected date.
    pub fn available_times(&self) -> Vec<String> {
        self.draft
            .date
            .map(|date| calendar::available_times(&self.snapshot, date))
            .unwrap_or_default()
    }

    pub fn month_view(&self, locale: Locale) -> MonthView {
        calendar::month_view(MonthViewInput {
            month: self.visible_month,
            locale,
            today: self.today,
            snapshot: &self.snapshot,
            selected: self.draft.date,
            loading: self.availability_loading,
        })
    }

    pub fn apply(&mut self, action: WizardAction) -> Result<Vec<WizardCommand>, WizardError> {
        match action {
            WizardAction::CatalogLoaded(treatments) => {
                self.load_catalog(treatments);
                Ok(Vec::new())
            }
            WizardAction::SelectTreatment(treatment_id) => self.select_treatment(treatment_id),
            WizardAction::SelectOption(option_id) => self.select_option(option_id),
            WizardAction::Next => self.advance(),
            WizardAction::Back => {
                self.step = match self.step {
                    WizardStep::SelectTreatment | WizardStep::SelectSchedule => {
                        WizardStep::SelectTreatment
                    }
                    WizardStep::EnterDetails => WizardStep::SelectSchedule,
                };
                Ok(Vec::new())
            }
            WizardAction::ShowMonth(month) => Ok(self.show_month(month)),
            WizardAction::NextMonth => Ok(self.show_month(self.visible_month.next())),
            WizardAction::PreviousMonth => Ok(self.show_month(self.visible_month.previous())),
            WizardAction::SelectDate(date) => self.select_date(date),
            WizardAction::SelectTime(time) => self.select_time(time),
            WizardAction::SetContact(field, value) => {
                self.draft.contact.set(field, value);
                self.draft.request_id = None;
                Ok(Vec::new())
            }
            WizardAction::Submit => self.submit(),
            WizardAction::AvailabilityLoaded { ticket, result } => {
                self.availability_loaded(ticket, result);
                Ok(Vec::new())
            }
            WizardAction::SubmissionFinished { request_id, result } => {
                Ok(self.submission_finished(request_id, result))
            }
        }
    }

    fn select_treatment(
        &mut self,
        treatment_id: TreatmentId,
    ) -> Result<Vec<WizardCommand>, WizardError> {
        if !self.catalog.iter().any(|treatment| treatment.id == treatment_id) {
            return Err(WizardError::UnknownTreatment(treatment_id));
        }

        if self.draft.treatment_id.as_ref() != Some(&treatment_id) {
            // Availability is per treatment; earlier schedule picks no longer apply.
            self.draft.date = None;
            self.draft.time = None;
            self.snapshot = AvailabilitySnapshot::default();
            self.invalidate_pending_fetch();
        }
        self.draft.treatment_id = Some(treatment_id);
        self.draft.option_id = None;
        self.draft.request_id = None;

        // Without an option the later steps are unreachable.
        self.step = WizardStep::SelectTreatment;
        Ok(Vec::new())
    }

    fn select_option(&mut self, option_id: OptionId) -> Result<Vec<WizardCommand>, WizardError> {
        self.require_step(WizardStep::SelectTreatment, "select_option")?;
        let treatment = self
            .selected_treatment()
            .ok_or(WizardError::TreatmentRequired)?;
        if treatment.option(&option_id).is_none() {
            return Err(WizardError::UnknownOption {
                treatment_id: treatment.id.clone(),
                option_id,
            });
        }
        self.draft.option_id = Some(option_id);
        self.draft.request_id = None;
        Ok(Vec::new())
    }

    fn advance(&mut self) -> Result<Vec<WizardCommand>, WizardError> {
        match self.step {
            WizardStep::SelectTreatment => {
                if !self.draft.has_treatment_selection() {
                    return Err(WizardError::TreatmentRequired);
                }
                self.step = WizardStep::SelectSchedule;
                Ok(self.begin_fetch().into_iter().collect())
            }
            WizardStep::SelectSchedule => {
                if !self.draft.has_schedule_selection() {
                    return Err(WizardError::ScheduleRequired);
                }
                self.step = WizardStep::EnterDetails;
                Ok(Vec::new())
            }
            WizardStep::EnterDetails => Err(WizardError::WrongStep {
                action: "next",
                step: self.step,
            }),
        }
    }

    fn show_month(&mut self, month: YearMonth) -> Vec<WizardCommand> {
        self.visible_month = month;
        if self.step == WizardStep::SelectSchedule {
            self.begin_fetch().into_iter().collect()
        } else {
            Vec::new()
        }
    }

    fn select_date(&mut self, date: NaiveDate) -> Result<Vec<WizardCommand>, WizardError> {
        self.require_step(WizardStep::SelectSchedule, "select_date")?;
        if self.is_day_disabled(date) {
            debug!(%date, "ignoring selection of unavailable day");
            return Ok(Vec::new());
        }
        if self.draft.date != Some(date) {
            self.draft.date = Some(date);
            self.draft.time = None;
            self.draft.request_id = None;
        }
        Ok(Vec::new())
    }

    fn select_time(&mut self, time: String) -> Result<Vec<WizardCommand>, WizardError> {
        self.require_step(WizardStep::SelectSchedule, "select_time")?;
        let date = self.draft.date.ok_or(WizardError::ScheduleRequired)?;
        if !calendar::available_times(&self.snapshot, date).contains(&time) {
            return Err(WizardError::TimeUnavailable { date, time });
        }
        self.draft.time = Some(time);
        self.draft.request_id = None;
        Ok(Vec::new())
    }

    fn submit(&mut self) -> Result<Vec<WizardCommand>, WizardError> {
        self.require_step(WizardStep::EnterDetails, "submit")?;
        if self.in_flight.is_some() {
            return Err(WizardError::SubmissionInFlight);
        }
        validate_contact(&self.draft.contact).map_err(WizardError::InvalidContact)?;

        let request_id = *self.draft.request_id.get_or_insert_with(Uuid::new_v4);
        let prepared = prepare_booking(
            &self.catalog,
            &self.draft,
            &self.snapshot,
            &self.company_id,
            request_id,
        )?;

        self.in_flight = Some(InFlightSubmission {
            request_id,
            summary: prepared.summary,
        });
        Ok(vec![WizardCommand::SubmitBooking(prepared.request)])
    }

    fn availability_loaded(
        &mut self,
        ticket: FetchTicket,
        result: Result<AvailabilitySnapshot, String>,
    ) {
        if ticket.generation != self.fetch_generation {
            debug!(
                generation = ticket.generation,
                current = self.fetch_generation,
                "dropping stale availability response"
            );
            return;
        }
        self.availability_loading = false;
        match result {
            Ok(snapshot) => self.snapshot = snapshot,
            Err(err) => warn!(
                treatment_id = %ticket.query.treatment_id,
                month = %ticket.query.start_date,
                error = %err,
                "availability fetch failed; keeping previous snapshot"
            ),
        }
    }

    fn submission_finished(
        &mut self,
        request_id: Uuid,
        result: Result<BookingConfirmation, ServiceFailure>,
    ) -> Vec<WizardCommand> {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.request_id == request_id);
        if !matches {
            debug!(%request_id, "ignoring result for unknown submission");
            return Vec::new();
        }
        let Some(in_flight) = self.in_flight.take() else {
            return Vec::new();
        };

        match result {
            Ok(_) => {
                self.draft = BookingDraft::default();
                self.step = WizardStep::SelectTreatment;
                vec![WizardCommand::Notify(Notification::booked(&in_flight.summary))]
            }
            Err(failure) => {
                warn!(%request_id, error = %failure.detail, "booking submission failed");
                vec![WizardCommand::Notify(Notification::booking_failed(
                    failure.service_message.as_deref(),
                ))]
            }
        }
    }

    fn begin_fetch(&mut self) -> Option<WizardCommand> {
        let treatment_id = self.draft.treatment_id.clone()?;
        self.fetch_generation += 1;
        self.availability_loading = true;
        Some(WizardCommand::FetchAvailability(FetchTicket {
            generation: self.fetch_generation,
            query: AvailabilityQuery {
                start_date: self.visible_month.first_day(),
                treatment_id,
                company_id: self.company_id.clone(),
            },
        }))
    }

    fn invalidate_pending_fetch(&mut self) {
        if self.availability_loading {
            self.fetch_generation += 1;
            self.availability_loading = false;
        }
    }

    fn require_step(&self, step: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;

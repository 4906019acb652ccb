use chrono::NaiveDate;
use shared::{
    domain::{OptionId, TreatmentId},
    error::ErrorCode,
};
use thiserror::Error;

use crate::{validation::FieldError, wizard::WizardStep};

/// Local validation failures. None of these reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("select a treatment and an option first")]
    TreatmentRequired,
    #[error("select a date and a time first")]
    ScheduleRequired,
    #[error("unknown treatment '{0}'")]
    UnknownTreatment(TreatmentId),
    #[error("treatment '{treatment_id}' has no option '{option_id}'")]
    UnknownOption {
        treatment_id: TreatmentId,
        option_id: OptionId,
    },
    #[error("{time} is not offered on {date}")]
    TimeUnavailable { date: NaiveDate, time: String },
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("the {time} slot on {date} is no longer available; pick another time")]
    StaleSlot { date: NaiveDate, time: String },
    #[error("contact details incomplete: {}", describe_fields(.0))]
    InvalidContact(Vec<FieldError>),
    #[error("a booking request is already being submitted")]
    SubmissionInFlight,
    #[error("{action} is not available in step {step}")]
    WrongStep {
        action: &'static str,
        step: WizardStep,
    },
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("scheduling service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("scheduling service rejected the request ({code:?}): {message}")]
    Rejected {
        status: Option<u16>,
        code: ErrorCode,
        message: String,
    },
    #[error("unexpected scheduling service response: {0}")]
    Decode(String),
}

impl SchedulingError {
    /// Human readable message reported by the service itself, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            SchedulingError::Rejected { message, .. } if !message.trim().is_empty() => {
                Some(message)
            }
            _ => None,
        }
    }
}

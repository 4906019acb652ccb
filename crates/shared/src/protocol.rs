use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{AvailabilitySnapshot, CompanyId, StaffId, Treatment, TreatmentId},
    error::ServiceErrorPayload,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    /// First day of the displayed month.
    pub start_date: NaiveDate,
    pub treatment_id: TreatmentId,
    pub company_id: CompanyId,
}

pub type AvailabilityResponse = AvailabilitySnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Client generated; reused when the same draft is resubmitted so the service can
    /// deduplicate.
    pub request_id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub staff_id: StaffId,
    pub company_id: CompanyId,
    pub treatment_id: TreatmentId,
    pub price: f64,
    pub duration: u32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingConfirmation {
    #[serde(alias = "id", skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreatmentCatalogResponse {
    Wrapped { treatments: Vec<Treatment> },
    Bare(Vec<Treatment>),
}

impl TreatmentCatalogResponse {
    pub fn into_treatments(self) -> Vec<Treatment> {
        match self {
            TreatmentCatalogResponse::Wrapped { treatments } => treatments,
            TreatmentCatalogResponse::Bare(treatments) => treatments,
        }
    }
}

/// Body of a 2xx service reply. Remote functions report failures in-band, so the
/// error shape is tried first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceReply<T> {
    Failure(ServiceErrorPayload),
    Success(T),
}

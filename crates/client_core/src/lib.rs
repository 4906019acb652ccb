use std::{collections::VecDeque, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use reqwest::{header::HeaderValue, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AvailabilitySnapshot, CompanyId, Treatment},
    error::{ApiError, ErrorCode, ServiceErrorPayload},
    protocol::{
        AvailabilityQuery, BookingConfirmation, BookingRequest, ServiceReply,
        TreatmentCatalogResponse,
    },
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod calendar;
pub mod config;
pub mod error;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use calendar::{Locale, MonthView, YearMonth};
pub use config::ClientSettings;
pub use error::{SchedulingError, WizardError};
pub use validation::ContactField;
pub use wizard::{
    BookingDraft, Notification, NotificationKind, WizardAction, WizardCommand, WizardState,
    WizardStep,
};

use wizard::ServiceFailure;

const AVAILABILITY_PATH: &str = "get-availability";
const BOOKING_PATH: &str = "create-booking";
const TREATMENTS_PATH: &str = "treatments";
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";
const NOTIFICATION_CAPACITY: usize = 32;

#[async_trait]
pub trait SchedulingService: Send + Sync {
    async fn fetch_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilitySnapshot, SchedulingError>;
    async fn submit_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, SchedulingError>;
}

#[async_trait]
pub trait TreatmentCatalog: Send + Sync {
    async fn list_treatments(&self, company_id: &CompanyId)
        -> Result<Vec<Treatment>, SchedulingError>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Scheduling service and treatment catalog reached over HTTP.
pub struct HttpSchedulingClient {
    http: Client,
    service_url: String,
    api_key: Option<String>,
}

impl HttpSchedulingClient {
    pub fn new(
        service_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            service_url: service_url.into(),
            api_key,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        if settings.company_id.trim().is_empty() {
            bail!("company id is not configured; set BOOKING_COMPANY_ID or company_id in booking.toml");
        }
        let service_url = config::prepare_service_url(&settings.service_url)?;
        Self::new(
            service_url,
            settings.api_key.clone(),
            settings.request_timeout(),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.service_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key).header("apikey", key),
            None => builder,
        }
    }
}

#[async_trait]
impl SchedulingService for HttpSchedulingClient {
    async fn fetch_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilitySnapshot, SchedulingError> {
        let response = self
            .authorize(self.http.post(self.endpoint(AVAILABILITY_PATH)))
            .json(query)
            .send()
            .await?;
        read_reply(response).await
    }

    async fn submit_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, SchedulingError> {
        let mut builder = self
            .authorize(self.http.post(self.endpoint(BOOKING_PATH)))
            .json(request);
        if let Ok(value) = HeaderValue::from_str(&request.request_id.to_string()) {
            builder = builder.header(IDEMPOTENCY_HEADER, value);
        }
        let response = builder.send().await?;
        read_reply(response).await
    }
}

#[async_trait]
impl TreatmentCatalog for HttpSchedulingClient {
    async fn list_treatments(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<Treatment>, SchedulingError> {
        let response = self
            .authorize(self.http.get(self.endpoint(TREATMENTS_PATH)))
            .query(&[("companyId", company_id.as_str())])
            .send()
            .await?;
        let catalog: TreatmentCatalogResponse = read_reply(response).await?;
        Ok(catalog.into_treatments())
    }
}

async fn read_reply<T: DeserializeOwned>(response: Response) -> Result<T, SchedulingError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let (code, message) = if let Ok(payload) = serde_json::from_slice::<ServiceErrorPayload>(&body)
        {
            (payload.error.code(), payload.error.message().to_string())
        } else if let Ok(err) = serde_json::from_slice::<ApiError>(&body) {
            (err.code, err.message)
        } else {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            (ErrorCode::Unknown, text)
        };
        return Err(SchedulingError::Rejected {
            status: Some(status.as_u16()),
            code,
            message,
        });
    }

    match serde_json::from_slice::<ServiceReply<T>>(&body) {
        Ok(ServiceReply::Success(value)) => Ok(value),
        Ok(ServiceReply::Failure(payload)) => Err(SchedulingError::Rejected {
            status: Some(status.as_u16()),
            code: payload.error.code(),
            message: payload.error.message().to_string(),
        }),
        Err(err) => Err(SchedulingError::Decode(err.to_string())),
    }
}

/// Runs the booking wizard against a scheduling service.
///
/// State transitions happen under the lock; network calls run outside it, so an
/// availability fetch triggered while another is outstanding proceeds concurrently.
pub struct BookingController {
    service: Arc<dyn SchedulingService>,
    catalog: Arc<dyn TreatmentCatalog>,
    clock: Arc<dyn Clock>,
    state: Mutex<WizardState>,
    notifications: broadcast::Sender<Notification>,
}

impl BookingController {
    pub fn new(
        company_id: CompanyId,
        service: Arc<dyn SchedulingService>,
        catalog: Arc<dyn TreatmentCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let state = WizardState::new(company_id, clock.today());
        Self {
            service,
            catalog,
            clock,
            state: Mutex::new(state),
            notifications,
        }
    }

    pub fn with_http_client(company_id: CompanyId, client: Arc<HttpSchedulingClient>) -> Self {
        Self::new(company_id, client.clone(), client, Arc::new(SystemClock))
    }

    /// Loads the treatment catalog for the wizard's company.
    pub async fn mount(&self) -> Result<usize, SchedulingError> {
        let company_id = self.state.lock().await.company_id().clone();
        let treatments = self.catalog.list_treatments(&company_id).await?;
        let count = treatments.len();
        info!(company_id = %company_id, treatments = count, "treatment catalog loaded");
        self.state.lock().await.load_catalog(treatments);
        Ok(count)
    }

    pub async fn dispatch(&self, action: WizardAction) -> Result<(), WizardError> {
        let action_name = action.name();
        let commands = {
            let mut state = self.state.lock().await;
            state.set_today(self.clock.today());
            state.apply(action)?
        };
        debug!(action = action_name, commands = commands.len(), "wizard action applied");
        self.run(commands).await;
        Ok(())
    }

    async fn run(&self, commands: Vec<WizardCommand>) {
        let mut queue = VecDeque::from(commands);
        while let Some(command) = queue.pop_front() {
            let follow_up = match command {
                WizardCommand::FetchAvailability(ticket) => {
                    debug!(
                        generation = ticket.generation,
                        treatment_id = %ticket.query.treatment_id,
                        month = %ticket.query.start_date,
                        "fetching availability"
                    );
                    let result = self
                        .service
                        .fetch_availability(&ticket.query)
                        .await
                        .map_err(|err| err.to_string());
                    WizardAction::AvailabilityLoaded { ticket, result }
                }
                WizardCommand::SubmitBooking(request) => {
                    info!(
                        request_id = %request.request_id,
                        treatment_id = %request.treatment_id,
                        staff_id = %request.staff_id,
                        start = %request.start,
                        "submitting booking"
                    );
                    let request_id = request.request_id;
                    let result = self
                        .service
                        .submit_booking(&request)
                        .await
                        .map_err(|err| ServiceFailure {
                            service_message: err.service_message().map(str::to_string),
                            detail: err.to_string(),
                        });
                    WizardAction::SubmissionFinished { request_id, result }
                }
                WizardCommand::Notify(notification) => {
                    // No subscribers is fine; presentation is up to the caller.
                    let _ = self.notifications.send(notification);
                    continue;
                }
            };

            let mut state = self.state.lock().await;
            match state.apply(follow_up) {
                Ok(commands) => queue.extend(commands),
                Err(err) => warn!(error = %err, "wizard rejected command result"),
            }
        }
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn state(&self) -> WizardState {
        self.state.lock().await.clone()
    }

    pub async fn month_view(&self, locale: Locale) -> MonthView {
        self.state.lock().await.month_view(locale)
    }

    pub async fn available_times(&self) -> Vec<String> {
        self.state.lock().await.available_times()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

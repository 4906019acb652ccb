use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{
    calendar,
    config::{load_settings, ClientSettings},
    BookingController, ContactField, HttpSchedulingClient, Locale, MonthView, NotificationKind,
    TreatmentCatalog, WizardAction, YearMonth,
};
use shared::domain::{CompanyId, OptionId, TreatmentId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "booking", about = "Salon appointment booking client")]
struct Cli {
    /// Overrides the scheduling service url from booking.toml / environment.
    #[arg(long)]
    service_url: Option<String>,
    #[arg(long)]
    company_id: Option<String>,
    /// Language tag for calendar labels (en, nl, fr).
    #[arg(long)]
    locale: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists bookable treatments and their pricing options.
    Treatments {
        #[arg(long)]
        json: bool,
    },
    /// Prints a month calendar with the days that still have free slots.
    Calendar {
        #[arg(long)]
        treatment: String,
        /// Defaults to the first option of the treatment.
        #[arg(long)]
        option: Option<String>,
        /// YYYY-MM, defaults to the current month.
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Books an appointment.
    Book {
        #[arg(long)]
        treatment: String,
        #[arg(long)]
        option: String,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    apply_cli_overrides(&mut settings, &cli);
    tracing::debug!(
        service_url = %settings.service_url,
        company_id = %settings.company_id,
        locale = settings.locale.tag(),
        "settings loaded"
    );
    let client = Arc::new(HttpSchedulingClient::from_settings(&settings)?);
    let company_id = CompanyId::new(settings.company_id.clone());

    match cli.command {
        Command::Treatments { json } => list_treatments(&client, &company_id, json).await,
        Command::Calendar {
            treatment,
            option,
            month,
        } => {
            let controller = BookingController::with_http_client(company_id, client);
            show_calendar(&controller, treatment, option, month, settings.locale).await
        }
        Command::Book {
            treatment,
            option,
            date,
            time,
            first_name,
            last_name,
            email,
            phone,
            message,
        } => {
            let controller = BookingController::with_http_client(company_id, client);
            select_treatment(&controller, treatment, Some(option)).await?;
            controller
                .dispatch(WizardAction::ShowMonth(YearMonth::containing(date)))
                .await?;
            controller.dispatch(WizardAction::Next).await?;

            controller.dispatch(WizardAction::SelectDate(date)).await?;
            if controller.state().await.draft().date != Some(date) {
                bail!("{date} has no free slots for this treatment");
            }
            controller.dispatch(WizardAction::SelectTime(time)).await?;
            controller.dispatch(WizardAction::Next).await?;

            let contact = [
                (ContactField::FirstName, first_name),
                (ContactField::LastName, last_name),
                (ContactField::Email, email),
                (ContactField::Phone, phone),
                (ContactField::Message, message.unwrap_or_default()),
            ];
            for (field, value) in contact {
                controller
                    .dispatch(WizardAction::SetContact(field, value))
                    .await?;
            }

            let mut notifications = controller.subscribe_notifications();
            controller.dispatch(WizardAction::Submit).await?;
            let notification = notifications
                .recv()
                .await
                .context("booking finished without a result")?;
            match notification.kind {
                NotificationKind::Success => {
                    println!("{}: {}", notification.title, notification.description);
                    Ok(())
                }
                NotificationKind::Failure => {
                    bail!("{}: {}", notification.title, notification.description)
                }
            }
        }
    }
}

fn apply_cli_overrides(settings: &mut ClientSettings, cli: &Cli) {
    if let Some(v) = &cli.service_url {
        settings.service_url = v.clone();
    }
    if let Some(v) = &cli.company_id {
        settings.company_id = v.clone();
    }
    if let Some(v) = &cli.locale {
        settings.locale = Locale::from_tag(v);
    }
}

async fn list_treatments(
    client: &HttpSchedulingClient,
    company_id: &CompanyId,
    json: bool,
) -> Result<()> {
    let treatments = client.list_treatments(company_id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&treatments)?);
        return Ok(());
    }
    for treatment in &treatments {
        println!("{} ({})", treatment.name, treatment.id);
        for option in &treatment.options {
            println!(
                "  {:<24} {:>8.2}  {:>3} min  [{}]",
                option.name,
                option.price,
                option.duration_or_default(),
                option.id
            );
        }
    }
    Ok(())
}

async fn select_treatment(
    controller: &BookingController,
    treatment: String,
    option: Option<String>,
) -> Result<()> {
    controller.mount().await?;
    let treatment_id = TreatmentId::new(treatment);
    controller
        .dispatch(WizardAction::SelectTreatment(treatment_id.clone()))
        .await?;

    let option_id = match option {
        Some(option) => OptionId::new(option),
        None => controller
            .state()
            .await
            .selected_treatment()
            .and_then(|treatment| treatment.options.first())
            .map(|option| option.id.clone())
            .with_context(|| format!("treatment '{treatment_id}' has no pricing options"))?,
    };
    controller
        .dispatch(WizardAction::SelectOption(option_id))
        .await?;
    Ok(())
}

async fn show_calendar(
    controller: &BookingController,
    treatment: String,
    option: Option<String>,
    month: Option<YearMonth>,
    locale: Locale,
) -> Result<()> {
    select_treatment(controller, treatment, option).await?;
    if let Some(month) = month {
        controller.dispatch(WizardAction::ShowMonth(month)).await?;
    }
    controller.dispatch(WizardAction::Next).await?;

    let view = controller.month_view(locale).await;
    print_month(&view);

    let state = controller.state().await;
    for cell in view.cells.iter().filter(|cell| cell.in_month && !cell.disabled) {
        let times = calendar::available_times(state.snapshot(), cell.date);
        println!("{}  {}", cell.date, times.join(" "));
    }
    Ok(())
}

fn print_month(view: &MonthView) {
    println!("{}", view.title);
    println!(
        "{}",
        view.weekdays
            .iter()
            .map(|label| format!("{label:>4}"))
            .collect::<String>()
    );
    for week in view.weeks() {
        let line: String = week
            .iter()
            .map(|cell| {
                if !cell.in_month {
                    "    ".to_string()
                } else if cell.disabled {
                    format!("{:>4}", cell.date.day())
                } else {
                    format!("{:>3}*", cell.date.day())
                }
            })
            .collect();
        println!("{line}");
    }
}

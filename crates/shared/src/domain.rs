use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(CompanyId);
id_newtype!(TreatmentId);
id_newtype!(OptionId);
id_newtype!(StaffId);

/// Minutes assumed for an option whose duration is not set in the catalog.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PricingOptionRecord")]
pub struct PricingOption {
    pub id: OptionId,
    pub name: String,
    pub price: f64,
    pub duration_minutes: Option<u32>,
}

impl PricingOption {
    pub fn duration_or_default(&self) -> u32 {
        self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES)
    }
}

/// Catalog rows may omit the option id; the price then doubles as the key.
#[derive(Deserialize)]
struct PricingOptionRecord {
    #[serde(default)]
    id: Option<OptionId>,
    name: String,
    price: f64,
    #[serde(default, alias = "duration_minutes")]
    duration: Option<u32>,
}

impl From<PricingOptionRecord> for PricingOption {
    fn from(record: PricingOptionRecord) -> Self {
        let id = record
            .id
            .unwrap_or_else(|| OptionId(record.price.to_string()));
        Self {
            id,
            name: record.name,
            price: record.price,
            duration_minutes: record.duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: TreatmentId,
    pub name: String,
    #[serde(default, alias = "pricing_options", alias = "pricingOptions")]
    pub options: Vec<PricingOption>,
}

impl Treatment {
    pub fn option(&self, option_id: &OptionId) -> Option<&PricingOption> {
        self.options.iter().find(|option| &option.id == option_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub staff_id: StaffId,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_end: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(default, rename = "dayName")]
    pub day_name: String,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

/// Bookable days of one month for one treatment, keyed by calendar date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySnapshot {
    #[serde(default)]
    pub dates: BTreeMap<NaiveDate, DayAvailability>,
}

impl AvailabilitySnapshot {
    pub fn day(&self, date: NaiveDate) -> Option<&DayAvailability> {
        self.dates.get(&date)
    }

    /// A date is bookable only when it is present and carries at least one slot.
    pub fn is_bookable(&self, date: NaiveDate) -> bool {
        self.day(date).is_some_and(|day| !day.slots.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

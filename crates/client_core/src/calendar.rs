//! Month grid generation, localized labels, and per-day availability derivation.

use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use shared::domain::AvailabilitySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Nl,
    Fr,
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const MONTHS_NL: [&str; 12] = [
    "januari",
    "februari",
    "maart",
    "april",
    "mei",
    "juni",
    "juli",
    "augustus",
    "september",
    "oktober",
    "november",
    "december",
];
const MONTHS_FR: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

// Sunday first.
const WEEKDAYS_EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const WEEKDAYS_NL: [&str; 7] = ["Zo", "Ma", "Di", "Wo", "Do", "Vr", "Za"];
const WEEKDAYS_FR: [&str; 7] = ["Dim", "Lun", "Mar", "Mer", "Jeu", "Ven", "Sam"];

impl Locale {
    /// Accepts tags such as `nl`, `nl-BE` or `fr_FR`. Unsupported languages get English.
    pub fn from_tag(tag: &str) -> Self {
        let language = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "nl" => Locale::Nl,
            "fr" => Locale::Fr,
            _ => Locale::En,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Nl => "nl",
            Locale::Fr => "fr",
        }
    }

    /// `month` is 1-based.
    pub fn month_name(self, month: u32) -> &'static str {
        let table = match self {
            Locale::En => &MONTHS_EN,
            Locale::Nl => &MONTHS_NL,
            Locale::Fr => &MONTHS_FR,
        };
        table[(month.clamp(1, 12) - 1) as usize]
    }

    pub fn weekday_labels(self) -> [&'static str; 7] {
        match self {
            Locale::En => WEEKDAYS_EN,
            Locale::Nl => WEEKDAYS_NL,
            Locale::Fr => WEEKDAYS_FR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        (28..=31)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(self.year, self.month, day))
            .unwrap_or_else(|| self.first_day())
    }

    /// The following month; stays put at the last month chrono can represent.
    pub fn next(self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year.saturating_add(1), 1)
        } else {
            (self.year, self.month + 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    /// The preceding month; stays put at the first month chrono can represent.
    pub fn previous(self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year.saturating_sub(1), 12)
        } else {
            (self.year, self.month - 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn title(self, locale: Locale) -> String {
        format!("{} {}", locale.month_name(self.month), self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a month formatted as YYYY-MM, got '{0}'")]
pub struct ParseYearMonthError(String);

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearMonthError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

/// Every date shown for `month`: padded with the tail of the previous month so the
/// first day lands in its weekday column (weeks start on Sunday), and with the head
/// of the next month to complete the last week.
pub fn month_grid(month: YearMonth) -> Vec<NaiveDate> {
    let first = month.first_day();
    let last = month.last_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = u64::from(6 - last.weekday().num_days_from_sunday());

    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trail)).unwrap_or(last);

    start.iter_days().take_while(|date| *date <= end).collect()
}

/// Days before `today` are never selectable; today itself always is when bookable.
pub fn is_day_disabled(date: NaiveDate, today: NaiveDate, snapshot: &AvailabilitySnapshot) -> bool {
    date < today || !snapshot.is_bookable(date)
}

/// Distinct slot start times of `date`, ascending. Slots of different staff sharing a
/// start time collapse into one entry.
pub fn available_times(snapshot: &AvailabilitySnapshot, date: NaiveDate) -> Vec<String> {
    let Some(day) = snapshot.day(date) else {
        return Vec::new();
    };
    day.slots
        .iter()
        .map(|slot| slot.start_time.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub disabled: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub month: YearMonth,
    pub title: String,
    pub weekdays: [&'static str; 7],
    pub cells: Vec<CalendarCell>,
    /// Set while a fetch for the displayed month is outstanding; cells then reflect
    /// the previous snapshot.
    pub loading: bool,
}

impl MonthView {
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

pub struct MonthViewInput<'a> {
    pub month: YearMonth,
    pub locale: Locale,
    pub today: NaiveDate,
    pub snapshot: &'a AvailabilitySnapshot,
    pub selected: Option<NaiveDate>,
    pub loading: bool,
}

pub fn month_view(input: MonthViewInput<'_>) -> MonthView {
    let cells = month_grid(input.month)
        .into_iter()
        .map(|date| CalendarCell {
            date,
            in_month: input.month.contains(date),
            is_today: date == input.today,
            disabled: is_day_disabled(date, input.today, input.snapshot),
            selected: input.selected == Some(date),
        })
        .collect();

    MonthView {
        month: input.month,
        title: input.month.title(input.locale),
        weekdays: input.locale.weekday_labels(),
        cells,
        loading: input.loading,
    }
}

#[cfg(test)]
#[path = "tests/calendar_tests.rs"]
mod tests;

use super::*;
use crate::test_support::{date, slot, snapshot};

use chrono::Weekday;

#[test]
fn june_2025_starts_on_sunday_and_pads_into_july() {
    let grid = month_grid(YearMonth::new(2025, 6).expect("month"));
    assert_eq!(grid.len(), 35);
    assert_eq!(grid[0], date(2025, 6, 1));
    assert_eq!(grid[29], date(2025, 6, 30));
    assert_eq!(grid[34], date(2025, 7, 5));
}

#[test]
fn october_2025_pads_with_september_tail() {
    let grid = month_grid(YearMonth::new(2025, 10).expect("month"));
    assert_eq!(grid.first(), Some(&date(2025, 9, 28)));
    assert_eq!(grid.last(), Some(&date(2025, 11, 1)));
    assert_eq!(grid.len(), 35);
}

#[test]
fn february_2026_fills_exactly_four_weeks() {
    let grid = month_grid(YearMonth::new(2026, 2).expect("month"));
    assert_eq!(grid.len(), 28);
    assert_eq!(grid.first(), Some(&date(2026, 2, 1)));
    assert_eq!(grid.last(), Some(&date(2026, 2, 28)));
}

#[test]
fn every_month_grid_is_whole_weeks_covering_each_day_once() {
    let mut month = YearMonth::new(2023, 1).expect("month");
    for _ in 0..48 {
        let grid = month_grid(month);
        assert_eq!(grid.len() % 7, 0, "{month}");
        assert_eq!(grid[0].weekday(), Weekday::Sun, "{month}");
        assert!(grid.windows(2).all(|pair| pair[1] == pair[0].succ_opt().expect("next")));

        let in_month: Vec<_> = grid.iter().filter(|d| month.contains(**d)).collect();
        assert_eq!(in_month.len() as u32, month.last_day().day(), "{month}");
        assert_eq!(*in_month[0], month.first_day());
        month = month.next();
    }
}

#[test]
fn past_days_are_disabled_even_with_availability() {
    let today = date(2025, 6, 12);
    let available = snapshot(vec![
        (date(2025, 6, 10), vec![slot("s1", "09:00", "10:00")]),
        (date(2025, 6, 12), vec![slot("s1", "17:30", "18:00")]),
        (date(2025, 6, 13), vec![slot("s1", "09:00", "10:00")]),
    ]);

    assert!(is_day_disabled(date(2025, 6, 10), today, &available));
    assert!(!is_day_disabled(date(2025, 6, 12), today, &available));
    assert!(!is_day_disabled(date(2025, 6, 13), today, &available));
    assert!(is_day_disabled(date(2025, 6, 14), today, &available));
}

#[test]
fn day_listed_without_slots_is_disabled() {
    let today = date(2025, 6, 1);
    let empty_day = snapshot(vec![(date(2025, 6, 3), Vec::new())]);
    assert!(is_day_disabled(date(2025, 6, 3), today, &empty_day));
}

#[test]
fn time_options_collapse_staff_sharing_a_start_time() {
    let day = date(2025, 6, 10);
    let available = snapshot(vec![(
        day,
        vec![
            slot("staffA", "10:00", "11:00"),
            slot("staffA", "09:00", "10:00"),
            slot("staffB", "09:00", "10:00"),
        ],
    )]);

    assert_eq!(available_times(&available, day), vec!["09:00", "10:00"]);
    assert!(available_times(&available, date(2025, 6, 11)).is_empty());
}

#[test]
fn locale_tags_fall_back_to_english() {
    assert_eq!(Locale::from_tag("nl"), Locale::Nl);
    assert_eq!(Locale::from_tag("nl-BE"), Locale::Nl);
    assert_eq!(Locale::from_tag("FR_fr"), Locale::Fr);
    assert_eq!(Locale::from_tag("de-DE"), Locale::En);
    assert_eq!(Locale::from_tag(""), Locale::En);
}

#[test]
fn month_view_uses_localized_labels() {
    let month = YearMonth::new(2025, 6).expect("month");
    let today = date(2025, 6, 12);
    let available = snapshot(vec![(date(2025, 6, 20), vec![slot("s1", "09:00", "10:00")])]);

    let view = month_view(MonthViewInput {
        month,
        locale: Locale::Nl,
        today,
        snapshot: &available,
        selected: Some(date(2025, 6, 20)),
        loading: false,
    });

    assert_eq!(view.title, "juni 2025");
    assert_eq!(view.weekdays[0], "Zo");
    assert_eq!(view.weeks().count(), 5);

    let selectable: Vec<_> = view.cells.iter().filter(|cell| !cell.disabled).collect();
    assert_eq!(selectable.len(), 1);
    assert!(selectable[0].selected);
    assert!(view.cells.iter().any(|cell| cell.is_today && cell.date == today));
    assert!(view.cells.iter().filter(|cell| !cell.in_month).all(|cell| cell.date.month() == 7));

    assert_eq!(month.title(Locale::Fr), "juin 2025");
    assert_eq!(month.title(Locale::En), "June 2025");
    assert_eq!(Locale::Fr.weekday_labels()[0], "Dim");
}

#[test]
fn year_month_parsing_and_navigation() {
    let december: YearMonth = "2025-12".parse().expect("parse");
    assert_eq!(december.next().to_string(), "2026-01");
    assert_eq!(december.next().previous(), december);
    assert_eq!(
        YearMonth::new(2025, 1).expect("month").previous().to_string(),
        "2024-12"
    );
    assert_eq!(december.last_day(), date(2025, 12, 31));
    assert!("2025-13".parse::<YearMonth>().is_err());
    assert!("june".parse::<YearMonth>().is_err());
}

#[test]
fn navigation_stops_at_chrono_date_range() {
    let last = YearMonth::containing(NaiveDate::MAX);
    assert_eq!(last.next(), last);
    assert_eq!(last.last_day(), NaiveDate::MAX);
    let grid = month_grid(last);
    assert_eq!(grid.last(), Some(&NaiveDate::MAX));
    assert!(grid.iter().all(|day| day.year() >= last.year() - 1));

    let first = YearMonth::containing(NaiveDate::MIN);
    assert_eq!(first.previous(), first);
    assert_eq!(first.first_day(), NaiveDate::MIN);
    assert!(month_grid(first).windows(2).all(|pair| pair[0] < pair[1]));
}

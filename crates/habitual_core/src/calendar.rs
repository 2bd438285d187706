//! Weekly and monthly day projections for habit views.
//!
//! # Responsibility
//! - Compute the days shown by the weekly tracker and the monthly calendar.
//! - Classify each day for one habit and decide whether it may be toggled.
//!
//! # Invariants
//! - Weeks start on Sunday.
//! - Future days are never toggleable.
//! - Days without a `DateKey` form (outside years 0000..=9999) are never
//!   toggleable.

use crate::model::date_key::DateKey;
use crate::model::habit::Habit;
use chrono::{Datelike, Days, NaiveDate};

/// Display state of one day for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Completed,
    /// Past day without completion.
    Missed,
    /// Today, not yet completed.
    Today,
    Upcoming,
}

/// Which days a view lets the user toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleWindow {
    /// Weekly tracker: only the current day.
    TodayOnly,
    /// Monthly calendar: any day that is not in the future.
    UpToToday,
}

/// One rendered day in a habit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// `None` when `date` has no key form.
    pub key: Option<DateKey>,
    pub status: DayStatus,
    pub can_toggle: bool,
}

/// Days of the current month plus grid alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// Empty cells before the first day (Sunday = 0).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

/// The Sunday-start week containing `today`.
pub fn week_of(today: NaiveDate) -> [NaiveDate; 7] {
    let offset = u64::from(today.weekday().num_days_from_sunday());
    let start = today - Days::new(offset);
    std::array::from_fn(|i| start + Days::new(i as u64))
}

/// Every day of the month containing `today`, in order.
pub fn month_of(today: NaiveDate) -> Vec<NaiveDate> {
    let first = first_of_month(today);
    first
        .iter_days()
        .take_while(|day| day.month() == first.month())
        .collect()
}

/// Weekday index (Sunday = 0) of the first day of `today`'s month.
pub fn leading_blanks(today: NaiveDate) -> u32 {
    first_of_month(today).weekday().num_days_from_sunday()
}

/// Whether `day` may be toggled on `today` under `window`.
pub fn can_toggle(day: NaiveDate, today: NaiveDate, window: ToggleWindow) -> bool {
    match window {
        ToggleWindow::TodayOnly => day == today,
        ToggleWindow::UpToToday => day <= today,
    }
}

/// Classifies `day` for `habit` relative to `today`.
pub fn day_status(habit: &Habit, day: NaiveDate, today: NaiveDate) -> DayStatus {
    let completed = DateKey::try_from(day).is_ok_and(|key| habit.is_completed_on(key));
    if completed {
        DayStatus::Completed
    } else if day < today {
        DayStatus::Missed
    } else if day == today {
        DayStatus::Today
    } else {
        DayStatus::Upcoming
    }
}

/// Cells for the weekly tracker of `habit`.
pub fn week_cells(habit: &Habit, today: NaiveDate) -> [DayCell; 7] {
    week_of(today).map(|day| cell(habit, day, today, ToggleWindow::TodayOnly))
}

/// Cells for the monthly calendar of `habit`.
pub fn month_cells(habit: &Habit, today: NaiveDate) -> MonthGrid {
    MonthGrid {
        leading_blanks: leading_blanks(today),
        cells: month_of(today)
            .into_iter()
            .map(|day| cell(habit, day, today, ToggleWindow::UpToToday))
            .collect(),
    }
}

fn cell(habit: &Habit, day: NaiveDate, today: NaiveDate, window: ToggleWindow) -> DayCell {
    let key = DateKey::try_from(day).ok();
    DayCell {
        date: day,
        key,
        status: day_status(habit, day, today),
        can_toggle: key.is_some() && can_toggle(day, today, window),
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.day0()))
}

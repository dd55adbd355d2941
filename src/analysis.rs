//! Derived views over the workout history
//!
//! Everything here is a pure function of the history records passed in.
//! Nothing is cached; callers recompute on every read.

use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::HistoryRecord;

/// Calendar days (year-month-day) with at least one completed workout
pub type WorkoutDateSet = BTreeSet<NaiveDate>;

/// ---------------------------------------------------------------------------
/// Workout Days & Streak
/// ---------------------------------------------------------------------------

/// Distinct local-time days on which a workout was logged
pub fn workout_date_set(records: &[HistoryRecord]) -> WorkoutDateSet {
  workout_date_set_in(records, &Local)
}

/// Distinct days in the given time zone
pub fn workout_date_set_in<Tz: TimeZone>(records: &[HistoryRecord], tz: &Tz) -> WorkoutDateSet {
  records
    .iter()
    .map(|r| r.date.with_timezone(tz).date_naive())
    .collect()
}

/// Consecutive workout days ending today, or ending yesterday when today has
/// no workout yet.
pub fn current_streak(dates: &WorkoutDateSet, today: NaiveDate) -> u32 {
  if dates.is_empty() {
    return 0;
  }

  let mut day = if dates.contains(&today) {
    today
  } else {
    today - Duration::days(1)
  };

  let mut streak = 0;
  while dates.contains(&day) {
    streak += 1;
    match day.pred_opt() {
      Some(prev) => day = prev,
      None => break,
    }
  }
  streak
}

/// ---------------------------------------------------------------------------
/// Month Calendar
/// ---------------------------------------------------------------------------

/// Six Monday-first weeks
pub const CALENDAR_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
  /// Day of month, None for padding cells
  pub day: Option<u32>,
  pub is_today: bool,
  pub has_workout: bool,
}

impl CalendarDay {
  fn empty() -> Self {
    Self {
      day: None,
      is_today: false,
      has_workout: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCalendar {
  pub year: i32,
  pub month: u32,
  pub cells: Vec<CalendarDay>,
}

impl MonthCalendar {
  /// Grid for `year`/`month` (1-12). Returns None for an invalid month.
  pub fn build(year: i32, month: u32, dates: &WorkoutDateSet, today: NaiveDate) -> Option<Self> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let leading = first.weekday().num_days_from_monday() as usize;

    let mut cells = vec![CalendarDay::empty(); leading];
    let mut date = first;
    while date.month() == month {
      cells.push(CalendarDay {
        day: Some(date.day()),
        is_today: date == today,
        has_workout: dates.contains(&date),
      });
      date = date.succ_opt()?;
    }
    cells.resize(CALENDAR_CELLS, CalendarDay::empty());

    Some(Self { year, month, cells })
  }

  pub fn title(&self) -> String {
    NaiveDate::from_ymd_opt(self.year, self.month, 1)
      .map(|d| d.format("%B %Y").to_string())
      .unwrap_or_default()
  }

  /// (year, month) of the previous month
  pub fn previous(&self) -> (i32, u32) {
    if self.month == 1 {
      (self.year - 1, 12)
    } else {
      (self.year, self.month - 1)
    }
  }

  /// (year, month) of the next month
  pub fn next(&self) -> (i32, u32) {
    if self.month == 12 {
      (self.year + 1, 1)
    } else {
      (self.year, self.month + 1)
    }
  }

  pub fn workout_days(&self) -> usize {
    self.cells.iter().filter(|c| c.has_workout).count()
  }
}

/// ---------------------------------------------------------------------------
/// Home Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HomeSummary {
  pub streak: u32,
  pub total_workouts: usize,
  pub calendar: MonthCalendar,
}

impl HomeSummary {
  pub fn compute(records: &[HistoryRecord], dates: &WorkoutDateSet, today: NaiveDate) -> Self {
    let calendar = MonthCalendar::build(today.year(), today.month(), dates, today)
      .unwrap_or_else(|| MonthCalendar {
        year: today.year(),
        month: today.month(),
        cells: vec![CalendarDay::empty(); CALENDAR_CELLS],
      });

    Self {
      streak: current_streak(dates, today),
      total_workouts: records.len(),
      calendar,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

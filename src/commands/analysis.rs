//! Home screen statistics

use chrono::{Local, NaiveDate};

use crate::analysis::{workout_date_set, HomeSummary, MonthCalendar};
use crate::db::AppState;
use crate::error::TrackerError;
use crate::history::HistoryLog;

use super::current_profile_id;

/// Local calendar date right now
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}

/// Streak, workout count and the calendar of `today`'s month
pub async fn get_home_summary(
  state: &AppState,
  today: NaiveDate,
) -> Result<HomeSummary, TrackerError> {
  let profile_id = current_profile_id(state).await?;
  let records = HistoryLog::new(state.store.clone(), &profile_id).list().await?;
  let dates = workout_date_set(&records);
  Ok(HomeSummary::compute(&records, &dates, today))
}

/// Calendar grid for any month, `today` only marks the current day
pub async fn get_calendar(
  state: &AppState,
  year: i32,
  month: u32,
  today: NaiveDate,
) -> Result<MonthCalendar, TrackerError> {
  let profile_id = current_profile_id(state).await?;
  let records = HistoryLog::new(state.store.clone(), &profile_id).list().await?;
  let dates = workout_date_set(&records);
  MonthCalendar::build(year, month, &dates, today)
    .ok_or_else(|| TrackerError::MalformedInput(format!("invalid month: {year}-{month}")))
}

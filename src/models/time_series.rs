use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::{instrument, warn};

use super::period::Period;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Parses `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
        .ok_or_else(|| anyhow!("invalid date {:?}, expected YYYY-MM-DD or YYYYMMDD", date))
}

/// Every map time from `start` 00Z through the last map of `end`, day-major.
///
/// Returns an empty series when `start` is after `end`.
#[instrument(level = "debug")]
pub fn make_time_series(start: NaiveDate, end: NaiveDate, period: Period) -> Vec<DateTime<Utc>> {
    if start > end {
        warn!("start date is after end date, no maps to download");
        return Vec::new();
    }

    let num_days = (end - start).num_days();
    (0..=num_days)
        .map(|d| start + Duration::days(d))
        .flat_map(|day| {
            let midnight = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
            period
                .daily_hours()
                .map(move |hour| midnight + Duration::hours(i64::from(hour)))
        })
        .collect()
}

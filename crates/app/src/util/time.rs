use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::config::DateRangeParams;
use crate::error::{AppError, Result};

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Resolves inclusive report dates. Missing bounds default to the
/// `default_days` days ending `today`.
pub fn resolve_date_range(
    params: &DateRangeParams,
    default_days: u32,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = match params.end.as_deref().filter(|value| !value.trim().is_empty()) {
        Some(value) => parse_report_date(value)?,
        None => today,
    };
    let start = match params.start.as_deref().filter(|value| !value.trim().is_empty()) {
        Some(value) => parse_report_date(value)?,
        None => end
            .checked_sub_days(Days::new(u64::from(default_days.max(1)) - 1))
            .unwrap_or(NaiveDate::MIN),
    };
    if start > end {
        return Err(AppError::InvalidInput(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    Ok((start, end))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (UTC date taken).
pub fn parse_report_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc).date_naive())
        .map_err(|err| AppError::InvalidInput(format!("invalid date {}: {}", value, err)))
}

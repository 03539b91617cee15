use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Time granularity at which tab render counts are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationInterval {
    Minute,
    FiveMinute,
    Hour,
    Day,
    Week,
    Month,
    CalendarQuarter,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported interval {0}")]
pub struct UnknownInterval(pub String);

impl AggregationInterval {
    pub const ALL: [AggregationInterval; 8] = [
        AggregationInterval::Minute,
        AggregationInterval::FiveMinute,
        AggregationInterval::Hour,
        AggregationInterval::Day,
        AggregationInterval::Week,
        AggregationInterval::Month,
        AggregationInterval::CalendarQuarter,
        AggregationInterval::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::FiveMinute => "five_minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::CalendarQuarter => "calendar_quarter",
            Self::Year => "year",
        }
    }

    /// Floors `ts` to the start of the bucket containing it. Weeks start on
    /// Monday, quarters on the first day of Jan, Apr, Jul and Oct.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        match self {
            Self::Minute => floor_seconds(ts, 60),
            Self::FiveMinute => floor_seconds(ts, 5 * 60),
            Self::Hour => floor_seconds(ts, 60 * 60),
            Self::Day => start_of_day(date),
            Self::Week => {
                let offset = date.weekday().num_days_from_monday() as i64;
                start_of_day(date - TimeDelta::days(offset))
            }
            Self::Month => start_of_day(first_of_month(date)),
            Self::CalendarQuarter => {
                let mut start = first_of_month(date);
                for _ in 0..date.month0() % 3 {
                    start = first_of_month(start - TimeDelta::days(1));
                }
                start_of_day(start)
            }
            Self::Year => start_of_day(date - TimeDelta::days(date.ordinal0() as i64)),
        }
    }

    /// Start of the bucket after the one containing `ts`. `None` past the end
    /// of the representable calendar.
    pub fn next_bucket_start(&self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let start = self.bucket_start(ts);
        match self {
            Self::Minute => start.checked_add_signed(TimeDelta::minutes(1)),
            Self::FiveMinute => start.checked_add_signed(TimeDelta::minutes(5)),
            Self::Hour => start.checked_add_signed(TimeDelta::hours(1)),
            Self::Day => start.checked_add_signed(TimeDelta::days(1)),
            Self::Week => start.checked_add_signed(TimeDelta::weeks(1)),
            Self::Month => start.checked_add_months(Months::new(1)),
            Self::CalendarQuarter => start.checked_add_months(Months::new(3)),
            Self::Year => start.checked_add_months(Months::new(12)),
        }
    }

    /// Every bucket start overlapping `[start, end)`, ascending.
    pub fn bucket_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let first = Some(self.bucket_start(start)).filter(|first| *first < end);
        std::iter::successors(first, move |current| {
            self.next_bucket_start(*current).filter(|next| *next < end)
        })
    }
}

impl fmt::Display for AggregationInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationInterval {
    type Err = UnknownInterval;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == normalized)
            .ok_or_else(|| UnknownInterval(value.to_string()))
    }
}

fn floor_seconds(ts: DateTime<Utc>, step: i64) -> DateTime<Utc> {
    let rem = ts.timestamp().rem_euclid(step);
    ts - TimeDelta::seconds(rem) - TimeDelta::nanoseconds(ts.timestamp_subsec_nanos() as i64)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - TimeDelta::days(date.day0() as i64)
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    #[test]
    fn floors_sub_day_intervals() {
        let at = ts("2025-05-14T13:47:29.250Z");
        assert_eq!(
            AggregationInterval::Minute.bucket_start(at),
            ts("2025-05-14T13:47:00Z")
        );
        assert_eq!(
            AggregationInterval::FiveMinute.bucket_start(at),
            ts("2025-05-14T13:45:00Z")
        );
        assert_eq!(
            AggregationInterval::Hour.bucket_start(at),
            ts("2025-05-14T13:00:00Z")
        );
        assert_eq!(
            AggregationInterval::Day.bucket_start(at),
            ts("2025-05-14T00:00:00Z")
        );
    }

    #[test]
    fn weeks_start_on_monday() {
        // 2025-05-14 is a Wednesday.
        let at = ts("2025-05-14T13:47:29Z");
        assert_eq!(
            AggregationInterval::Week.bucket_start(at),
            ts("2025-05-12T00:00:00Z")
        );
        let monday = ts("2025-05-12T00:00:00Z");
        assert_eq!(AggregationInterval::Week.bucket_start(monday), monday);
    }

    #[test]
    fn floors_calendar_intervals() {
        let at = ts("2025-08-19T08:00:00Z");
        assert_eq!(
            AggregationInterval::Month.bucket_start(at),
            ts("2025-08-01T00:00:00Z")
        );
        assert_eq!(
            AggregationInterval::CalendarQuarter.bucket_start(at),
            ts("2025-07-01T00:00:00Z")
        );
        assert_eq!(
            AggregationInterval::CalendarQuarter.bucket_start(ts("2025-03-31T23:59:59Z")),
            ts("2025-01-01T00:00:00Z")
        );
        assert_eq!(
            AggregationInterval::Year.bucket_start(at),
            ts("2025-01-01T00:00:00Z")
        );
    }

    #[test]
    fn steps_to_the_next_bucket() {
        let at = ts("2025-01-31T13:47:29Z");
        assert_eq!(
            AggregationInterval::FiveMinute.next_bucket_start(at),
            Some(ts("2025-01-31T13:50:00Z"))
        );
        assert_eq!(
            AggregationInterval::Day.next_bucket_start(at),
            Some(ts("2025-02-01T00:00:00Z"))
        );
        assert_eq!(
            AggregationInterval::Week.next_bucket_start(at),
            Some(ts("2025-02-03T00:00:00Z"))
        );
        assert_eq!(
            AggregationInterval::Month.next_bucket_start(at),
            Some(ts("2025-02-01T00:00:00Z"))
        );
        assert_eq!(
            AggregationInterval::CalendarQuarter.next_bucket_start(ts("2025-11-15T00:00:00Z")),
            Some(ts("2026-01-01T00:00:00Z"))
        );
        assert_eq!(
            AggregationInterval::Year.next_bucket_start(at),
            Some(ts("2026-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn bucket_starts_cover_half_open_range() {
        let days: Vec<_> = AggregationInterval::Day
            .bucket_starts(ts("2025-01-06T00:00:00Z"), ts("2025-01-09T00:00:00Z"))
            .collect();
        assert_eq!(
            days,
            vec![
                ts("2025-01-06T00:00:00Z"),
                ts("2025-01-07T00:00:00Z"),
                ts("2025-01-08T00:00:00Z"),
            ]
        );
        // 2025-01-08 is a Wednesday, so the first week starts the Monday before.
        let weeks: Vec<_> = AggregationInterval::Week
            .bucket_starts(ts("2025-01-08T00:00:00Z"), ts("2025-01-20T00:00:00Z"))
            .collect();
        assert_eq!(
            weeks,
            vec![ts("2025-01-06T00:00:00Z"), ts("2025-01-13T00:00:00Z")]
        );
        assert_eq!(
            AggregationInterval::Hour
                .bucket_starts(ts("2025-01-06T00:00:00Z"), ts("2025-01-06T00:00:00Z"))
                .count(),
            0
        );
    }

    #[test]
    fn parses_interval_names() {
        assert_eq!(
            "five_minute".parse::<AggregationInterval>(),
            Ok(AggregationInterval::FiveMinute)
        );
        assert_eq!(" Day ".parse::<AggregationInterval>(), Ok(AggregationInterval::Day));
        assert_eq!(
            "fortnight".parse::<AggregationInterval>(),
            Err(UnknownInterval("fortnight".to_string()))
        );
        for interval in AggregationInterval::ALL {
            assert_eq!(interval.as_str().parse::<AggregationInterval>(), Ok(interval));
        }
    }
}

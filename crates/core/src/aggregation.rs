use std::hash::Hash;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::interval::{AggregationInterval, start_of_day};

/// A pre-computed statistic for one key and one time bucket.
pub trait BaseAggregation {
    type Key: Clone + Eq + Hash;

    /// Identifies the report column this aggregation belongs to. Never
    /// includes the time bucket.
    fn key(&self) -> &Self::Key;

    /// Start of the time bucket the aggregation covers.
    fn date_time(&self) -> DateTime<Utc>;
}

/// Filter criteria shared by every statistics report.
pub trait BaseReportForm {
    fn interval(&self) -> AggregationInterval;
    fn start(&self) -> NaiveDate;
    fn end(&self) -> NaiveDate;

    /// Half-open UTC range covering `start` through the whole of `end`.
    fn query_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self
            .end()
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        (start_of_day(self.start()), start_of_day(end))
    }
}

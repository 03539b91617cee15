use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tabstats_core::{AggregatedGroupMapping, AggregatedTabMapping};

use crate::error::Result;

/// Fixed-width UTC rendering so stored bucket times sort lexically.
pub fn format_date_time(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn parse_date_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

pub(crate) fn row_to_group_mapping(
    row: &Row<'_>,
) -> std::result::Result<AggregatedGroupMapping, rusqlite::Error> {
    Ok(AggregatedGroupMapping {
        id: row.get(0)?,
        group_service: row.get(1)?,
        group_name: row.get(2)?,
    })
}

pub(crate) fn row_to_tab_mapping(
    row: &Row<'_>,
) -> std::result::Result<AggregatedTabMapping, rusqlite::Error> {
    Ok(AggregatedTabMapping {
        id: row.get(0)?,
        fragment_name: row.get(1)?,
        tab_name: row.get(2)?,
    })
}

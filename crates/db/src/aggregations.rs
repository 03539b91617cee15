use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rusqlite::params;
use tabstats_core::{AggregationInterval, TabRenderAggregation, TabRenderAggregationKey};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{format_date_time, parse_date_time};
use crate::types::{IngestCursor, TabRenderIncrement};

impl Db {
    /// Returns every stored bucket in `[start, end)` whose key is in `keys`,
    /// ordered by bucket time.
    pub fn get_tab_render_aggregations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        keys: &HashSet<TabRenderAggregationKey>,
    ) -> Result<Vec<TabRenderAggregation>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let start = format_date_time(start);
        let end = format_date_time(end);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date_time, render_count
            FROM tab_render_aggregation
            WHERE interval = ?1 AND group_id = ?2 AND tab_id = ?3
              AND date_time >= ?4 AND date_time < ?5
            ORDER BY date_time ASC
            "#,
        )?;
        let mut aggregations = Vec::new();
        for key in keys {
            let rows = stmt
                .query_map(
                    params![key.interval.as_str(), key.group_id, key.tab_id, start, end],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for (date_time, render_count) in rows {
                aggregations.push(TabRenderAggregation {
                    key: *key,
                    date_time: parse_date_time(&date_time)?,
                    render_count: u32::try_from(render_count)
                        .map_err(|_| DbError::CountOutOfRange(render_count))?,
                });
            }
        }
        aggregations.sort_by_key(|aggregation| aggregation.date_time);
        Ok(aggregations)
    }

    /// Adds each increment to its bucket, creating buckets as needed.
    pub fn add_tab_render_counts(&mut self, increments: &[TabRenderIncrement]) -> Result<usize> {
        if increments.is_empty() {
            return Ok(0);
        }
        self.write_locked(|db| db.insert_tab_render_counts(increments))
    }

    /// Stores one ingest batch: the count increments and the cursors that
    /// cover them. Call inside [`Db::write_locked`] so both commit together.
    pub fn apply_ingest(
        &self,
        increments: &[TabRenderIncrement],
        cursors: &[IngestCursor],
    ) -> Result<usize> {
        let updated = self.insert_tab_render_counts(increments)?;
        for cursor in cursors {
            self.upsert_cursor(cursor)?;
        }
        Ok(updated)
    }

    fn insert_tab_render_counts(&self, increments: &[TabRenderIncrement]) -> Result<usize> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            INSERT INTO tab_render_aggregation (
              interval, group_id, tab_id, date_time, render_count
            ) VALUES (
              ?1, ?2, ?3, ?4, ?5
            )
            ON CONFLICT(interval, group_id, tab_id, date_time) DO UPDATE SET
              render_count = render_count + excluded.render_count
            "#,
        )?;
        let mut updated = 0usize;
        for increment in increments {
            updated += stmt.execute(params![
                increment.key.interval.as_str(),
                increment.key.group_id,
                increment.key.tab_id,
                format_date_time(increment.date_time),
                increment.render_count as i64,
            ])?;
        }
        Ok(updated)
    }

    pub fn count_tab_render_aggregations(&self, interval: Option<AggregationInterval>) -> Result<u64> {
        let count: i64 = match interval {
            Some(interval) => self.conn.query_row(
                "SELECT COUNT(*) FROM tab_render_aggregation WHERE interval = ?1",
                params![interval.as_str()],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM tab_render_aggregation",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(count as u64)
    }
}

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tabstats_core::{AggregationInterval, TabRenderAggregationKey};
use tabstats_db::{Db, TabRenderIncrement};
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("timestamp")
        .with_timezone(&Utc)
}

pub fn key(interval: AggregationInterval, group_id: i64, tab_id: i64) -> TabRenderAggregationKey {
    TabRenderAggregationKey {
        interval,
        group_id,
        tab_id,
    }
}

pub fn increment(key: TabRenderAggregationKey, date_time: &str, count: u32) -> TabRenderIncrement {
    TabRenderIncrement {
        key,
        date_time: ts(date_time),
        render_count: count,
    }
}

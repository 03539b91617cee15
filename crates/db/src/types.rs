use chrono::{DateTime, Utc};
use tabstats_core::TabRenderAggregationKey;

/// Amount to add to one stored tab render bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabRenderIncrement {
    pub key: TabRenderAggregationKey,
    pub date_time: DateTime<Utc>,
    pub render_count: u32,
}

/// Cursor metadata for incremental ingest runs.
#[derive(Debug, Clone)]
pub struct IngestCursor {
    pub file_path: String,
    pub inode: Option<u64>,
    pub mtime: Option<String>,
    pub byte_offset: u64,
    pub updated_at: String,
}

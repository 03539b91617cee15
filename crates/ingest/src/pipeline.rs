use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tabstats_core::{AggregationInterval, TabRenderAggregationKey};
use tabstats_db::{Db, IngestCursor, TabRenderIncrement};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::parser::{ParsedLine, TabRenderEvent, parse_tab_render_line};
use crate::types::{IngestIssue, IngestStats, Result};

fn is_event_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|value| value.to_str()),
        Some("log") | Some("jsonl") | Some("ndjson")
    )
}

struct FileTask {
    path: PathBuf,
    file_path: String,
    inode: Option<u64>,
    mtime: Option<String>,
    start_offset: u64,
}

struct ParsedFile {
    file_path: String,
    inode: Option<u64>,
    mtime: Option<String>,
    start_offset: u64,
    bytes_read: u64,
    events: Vec<TabRenderEvent>,
    events_skipped: usize,
    issues: Vec<IngestIssue>,
    skipped: bool,
    parse_duration: StdDuration,
}

impl ParsedFile {
    fn skipped(task: FileTask, issue: IngestIssue, started: Instant) -> Self {
        Self {
            file_path: task.file_path,
            inode: task.inode,
            mtime: task.mtime,
            start_offset: task.start_offset,
            bytes_read: 0,
            events: Vec::new(),
            events_skipped: 0,
            issues: vec![issue],
            skipped: true,
            parse_duration: started.elapsed(),
        }
    }
}

fn parse_file(task: FileTask) -> ParsedFile {
    let file_start = Instant::now();
    let mut file = match File::open(&task.path) {
        Ok(file) => file,
        Err(err) => {
            let issue = IngestIssue {
                file_path: task.file_path.clone(),
                message: err.to_string(),
            };
            return ParsedFile::skipped(task, issue, file_start);
        }
    };
    if let Err(err) = file.seek(SeekFrom::Start(task.start_offset)) {
        let issue = IngestIssue {
            file_path: task.file_path.clone(),
            message: err.to_string(),
        };
        return ParsedFile::skipped(task, issue, file_start);
    }

    let mut issues = Vec::new();
    let mut events = Vec::new();
    let mut events_skipped = 0usize;
    let mut bytes_read = 0u64;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(bytes) => {
                let complete = buf.ends_with(b"\n");
                let parsed = match std::str::from_utf8(&buf) {
                    Ok(line) => parse_tab_render_line(line),
                    Err(err) if complete => {
                        issues.push(IngestIssue {
                            file_path: task.file_path.clone(),
                            message: format!(
                                "invalid UTF-8 at byte {}: {err}",
                                task.start_offset + bytes_read
                            ),
                        });
                        bytes_read = bytes_read.saturating_add(bytes as u64);
                        continue;
                    }
                    Err(_) => break,
                };
                // A trailing line still being written is picked up next run.
                if !complete && parsed == ParsedLine::Ignored {
                    break;
                }
                bytes_read = bytes_read.saturating_add(bytes as u64);
                match parsed {
                    ParsedLine::Event(event) => events.push(event),
                    ParsedLine::Ignored => {}
                    ParsedLine::Invalid(message) => {
                        debug!(file = %task.file_path, %message, "skipping tab render line");
                        events_skipped += 1;
                    }
                }
            }
            Err(err) => {
                issues.push(IngestIssue {
                    file_path: task.file_path.clone(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }

    let parse_duration = file_start.elapsed();
    debug!(
        file = %task.file_path,
        read_ms = parse_duration.as_millis() as u64,
        events = events.len(),
        bytes = bytes_read,
        "parsed event file"
    );
    ParsedFile {
        file_path: task.file_path,
        inode: task.inode,
        mtime: task.mtime,
        start_offset: task.start_offset,
        bytes_read,
        events,
        events_skipped,
        issues,
        skipped: false,
        parse_duration,
    }
}

/// Resolves mapping ids once per ingest run.
struct MappingCache<'a> {
    db: &'a Db,
    groups: HashMap<(String, String), i64>,
    tabs: HashMap<(String, String), i64>,
}

impl<'a> MappingCache<'a> {
    fn new(db: &'a Db) -> Self {
        Self {
            db,
            groups: HashMap::new(),
            tabs: HashMap::new(),
        }
    }

    fn group_id(&mut self, service: &str, name: &str) -> Result<i64> {
        let key = (service.to_string(), name.to_string());
        if let Some(id) = self.groups.get(&key) {
            return Ok(*id);
        }
        let id = self.db.get_or_create_group_mapping(service, name)?.id;
        self.groups.insert(key, id);
        Ok(id)
    }

    fn tab_id(&mut self, fragment_name: &str, tab_name: &str) -> Result<i64> {
        let key = (fragment_name.to_string(), tab_name.to_string());
        if let Some(id) = self.tabs.get(&key) {
            return Ok(*id);
        }
        let id = self.db.get_or_create_tab_mapping(fragment_name, tab_name)?.id;
        self.tabs.insert(key, id);
        Ok(id)
    }
}

fn aggregate_events(
    db: &Db,
    events: &[TabRenderEvent],
    intervals: &[AggregationInterval],
) -> Result<Vec<TabRenderIncrement>> {
    let mut cache = MappingCache::new(db);
    let mut counts: HashMap<(TabRenderAggregationKey, DateTime<Utc>), u32> = HashMap::new();
    for event in events {
        let tab_id = cache.tab_id(&event.fragment_name, &event.tab_name)?;
        for group in &event.groups {
            let group_id = cache.group_id(&group.service, &group.name)?;
            for interval in intervals {
                let key = TabRenderAggregationKey {
                    interval: *interval,
                    group_id,
                    tab_id,
                };
                let bucket = interval.bucket_start(event.timestamp);
                let count = counts.entry((key, bucket)).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }
    let mut increments = counts
        .into_iter()
        .map(|((key, date_time), render_count)| TabRenderIncrement {
            key,
            date_time,
            render_count,
        })
        .collect::<Vec<_>>();
    increments.sort_by_key(|increment| {
        (
            increment.key.interval,
            increment.key.group_id,
            increment.key.tab_id,
            increment.date_time,
        )
    });
    Ok(increments)
}

/// Folds every new tab render event under `events_dir` into the stored
/// aggregations for each of `intervals`.
///
/// The whole run holds the database write lock, so concurrent runs against
/// the same database queue up and each event is counted once. Counts and
/// cursors commit together.
pub fn ingest_events_dir(
    db: &mut Db,
    events_dir: &Path,
    intervals: &[AggregationInterval],
) -> Result<IngestStats> {
    if !events_dir.is_dir() {
        debug!(dir = %events_dir.display(), "events directory missing");
        return Ok(IngestStats::default());
    }
    db.write_locked(|db| ingest_locked(db, events_dir, intervals))
}

fn ingest_locked(
    db: &Db,
    events_dir: &Path,
    intervals: &[AggregationInterval],
) -> Result<IngestStats> {
    let mut stats = IngestStats::default();
    let ingest_start = Instant::now();
    let mut parse_total = StdDuration::ZERO;

    let mut tasks = Vec::new();
    for entry in WalkDir::new(events_dir).follow_links(false).into_iter() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let file_path = err
                    .path()
                    .map(|path| path.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                stats.issues.push(IngestIssue {
                    file_path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !is_event_path(path) {
            continue;
        }
        stats.files_scanned += 1;
        let file_path = path.to_string_lossy().to_string();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                stats.files_skipped += 1;
                stats.issues.push(IngestIssue {
                    file_path,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let file_len = metadata.len();
        let inode = inode_from_metadata(&metadata);
        let mtime = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Utc>::from(time).to_rfc3339());
        let start_offset = match db.get_cursor(&file_path)? {
            Some(cursor) if cursor.byte_offset <= file_len && inode == cursor.inode => {
                cursor.byte_offset
            }
            _ => 0,
        };
        if start_offset >= file_len {
            stats.files_skipped += 1;
            continue;
        }
        tasks.push(FileTask {
            path: path.to_path_buf(),
            file_path,
            inode,
            mtime,
            start_offset,
        });
    }

    let parsed_files = tasks.into_par_iter().map(parse_file).collect::<Vec<_>>();

    let mut all_events = Vec::new();
    let mut cursors = Vec::new();
    for parsed in parsed_files {
        parse_total += parsed.parse_duration;
        stats.bytes_read += parsed.bytes_read;
        for issue in &parsed.issues {
            warn!(file = %issue.file_path, message = %issue.message, "ingest issue");
        }
        stats.issues.extend(parsed.issues);
        if parsed.skipped {
            stats.files_skipped += 1;
            continue;
        }
        stats.events_skipped += parsed.events_skipped;
        all_events.extend(parsed.events);
        cursors.push(IngestCursor {
            file_path: parsed.file_path,
            inode: parsed.inode,
            mtime: parsed.mtime,
            byte_offset: parsed.start_offset.saturating_add(parsed.bytes_read),
            updated_at: Utc::now().to_rfc3339(),
        });
    }
    stats.events_read = all_events.len();

    let db_start = Instant::now();
    let increments = aggregate_events(db, &all_events, intervals)?;
    stats.aggregations_updated = db.apply_ingest(&increments, &cursors)?;

    info!(
        scanned = stats.files_scanned,
        skipped = stats.files_skipped,
        events = stats.events_read,
        aggregations = stats.aggregations_updated,
        read_ms = parse_total.as_millis() as u64,
        db_ms = db_start.elapsed().as_millis() as u64,
        total_ms = ingest_start.elapsed().as_millis() as u64,
        "ingest finished"
    );
    Ok(stats)
}

fn inode_from_metadata(metadata: &fs::Metadata) -> Option<u64> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        Some(metadata.ino())
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        None
    }
}

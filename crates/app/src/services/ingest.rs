use std::path::Path;
use std::sync::{Arc, Mutex};

use tabstats_db::Db;
use tabstats_ingest::IngestStats;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};

/// Runs ingest; clones share one lock so runs in this process never overlap.
#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
    running: Arc<Mutex<()>>,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self {
            config,
            running: Arc::new(Mutex::new(())),
        }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn run(&self) -> Result<IngestStats> {
        self.run_dir(&self.config.events_dir)
    }

    /// Ingests `events_dir` instead of the configured directory.
    pub fn run_dir(&self, events_dir: &Path) -> Result<IngestStats> {
        let _running = self
            .running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut db = self.db()?;
        let intervals = self.config.reports.enabled_intervals();
        Ok(tabstats_ingest::ingest_events_dir(
            &mut db,
            events_dir,
            &intervals,
        )?)
    }
}

mod ingest;
mod reports;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use tabstats_db::Db;

pub use ingest::IngestService;
pub use reports::ReportsService;

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub ingest: IngestService,
    pub reports: ReportsService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            ingest: IngestService::new(shared.clone()),
            reports: ReportsService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

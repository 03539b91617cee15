use std::path::PathBuf;

use tabstats_db::Db;
use tracing::info;

use crate::config::ReportSettings;
use crate::error::{AppError, Result};
use crate::services::AppServices;

/// Paths and report settings needed to serve statistics.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub events_dir: PathBuf,
    pub reports: ReportSettings,
}

/// Application state shared by frontend backends (HTTP, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    /// Migrates the database and folds in any events already on disk.
    pub fn initialize(&self) -> Result<()> {
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        self.refresh_data()?;
        info!(db = %self.config.db_path.display(), "statistics store ready");
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    pub fn refresh_data(&self) -> Result<()> {
        self.services.ingest.run().map(|_| ())
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}

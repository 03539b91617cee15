use chrono::NaiveDate;
use tabstats_core::{AggregatedGroupMapping, AggregatedTabMapping, DataTable, TabRenderReportForm};
use tabstats_db::Db;
use tracing::info;

use crate::error::Result;
use crate::report::{ReportDescriptor, TabRenderFormOptions, TabRenderReport, render_report};
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct ReportsService {
    config: SharedConfig,
}

impl ReportsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn list(&self) -> Result<Vec<ReportDescriptor>> {
        let db = self.db()?;
        let report = TabRenderReport::new(&db, &self.config.reports);
        Ok(vec![ReportDescriptor::of(&report)])
    }

    pub fn tab_render_form(&self, today: NaiveDate) -> Result<TabRenderFormOptions> {
        let db = self.db()?;
        TabRenderReport::new(&db, &self.config.reports).form_options(today)
    }

    pub fn tab_render_default_form(&self, today: NaiveDate) -> Result<TabRenderReportForm> {
        let db = self.db()?;
        TabRenderReport::new(&db, &self.config.reports).default_form(today)
    }

    pub fn tab_render_data(&self, form: &TabRenderReportForm) -> Result<DataTable> {
        let db = self.db()?;
        let report = TabRenderReport::new(&db, &self.config.reports);
        let table = render_report(&report, form)?;
        info!(
            interval = %form.interval,
            groups = form.groups.len(),
            tabs = form.tabs.len(),
            rows = table.rows().len(),
            "rendered tab render report"
        );
        Ok(table)
    }

    pub fn tabs(&self) -> Result<Vec<AggregatedTabMapping>> {
        let db = self.db()?;
        TabRenderReport::new(&db, &self.config.reports).tabs()
    }

    pub fn groups(&self) -> Result<Vec<AggregatedGroupMapping>> {
        let db = self.db()?;
        TabRenderReport::new(&db, &self.config.reports).groups()
    }
}

use chrono::NaiveDate;
use tabstats_app::{
    AppError, DateRangeParams, ReportSettings, Result, TabRenderFormOptions, resolve_date_range,
    today_utc,
};
use tabstats_core::{
    AggregatedGroupMapping, AggregatedTabMapping, AggregationInterval, DataTable,
    TabRenderReportForm,
};
use tabstats_ingest::IngestStats;

use crate::{
    AppContext, HealthResponse, IngestRequest, ReportsResponse, TabRenderDataRequest,
    expand_home_path,
};

fn parse_interval(interval: Option<&str>, settings: &ReportSettings) -> Result<AggregationInterval> {
    let Some(value) = interval.filter(|value| !value.trim().is_empty()) else {
        return Ok(settings.initial_interval());
    };
    let interval = value
        .parse::<AggregationInterval>()
        .map_err(|err| AppError::InvalidInput(err.to_string()))?;
    if !settings.enabled_intervals().contains(&interval) {
        return Err(AppError::InvalidInput(format!(
            "interval {} is not enabled",
            interval
        )));
    }
    Ok(interval)
}

/// Turns a loose request into a report form, taking unset selections from
/// `defaults`.
pub fn resolve_tab_render_form(
    req: TabRenderDataRequest,
    defaults: &TabRenderReportForm,
    settings: &ReportSettings,
    today: NaiveDate,
) -> Result<TabRenderReportForm> {
    let interval = parse_interval(req.interval.as_deref(), settings)?;
    let (start, end) = resolve_date_range(
        &DateRangeParams {
            start: req.start,
            end: req.end,
        },
        settings.range_days(),
        today,
    )?;
    let groups = if req.groups.is_empty() {
        defaults.groups.clone()
    } else {
        req.groups
    };
    let tabs = if req.tabs.is_empty() {
        defaults.tabs.clone()
    } else {
        req.tabs
    };
    Ok(TabRenderReportForm {
        interval,
        start,
        end,
        groups,
        tabs,
    })
}

pub fn health() -> HealthResponse {
    HealthResponse { status: "ok" }
}

pub fn reports(ctx: &AppContext) -> Result<ReportsResponse> {
    Ok(ReportsResponse {
        reports: ctx.app_state.services.reports.list()?,
    })
}

pub fn tab_render_form(ctx: &AppContext) -> Result<TabRenderFormOptions> {
    ctx.app_state.services.reports.tab_render_form(today_utc())
}

pub fn tab_render_data(ctx: &AppContext, req: TabRenderDataRequest) -> Result<DataTable> {
    let today = today_utc();
    let reports = &ctx.app_state.services.reports;
    let defaults = reports.tab_render_default_form(today)?;
    let form = resolve_tab_render_form(req, &defaults, &ctx.app_state.config.reports, today)?;
    reports.tab_render_data(&form)
}

pub fn tabs(ctx: &AppContext) -> Result<Vec<AggregatedTabMapping>> {
    ctx.app_state.services.reports.tabs()
}

pub fn groups(ctx: &AppContext) -> Result<Vec<AggregatedGroupMapping>> {
    ctx.app_state.services.reports.groups()
}

pub fn ingest(ctx: &AppContext, req: IngestRequest) -> Result<IngestStats> {
    match req.dir.as_deref().map(str::trim).filter(|dir| !dir.is_empty()) {
        Some(dir) => ctx.app_state.services.ingest.run_dir(&expand_home_path(dir)),
        None => ctx.app_state.services.ingest.run(),
    }
}

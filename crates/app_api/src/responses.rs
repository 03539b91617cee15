use serde::Serialize;
use tabstats_app::ReportDescriptor;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReportsResponse {
    pub reports: Vec<ReportDescriptor>,
}

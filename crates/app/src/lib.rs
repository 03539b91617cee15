pub mod app;
pub mod config;
pub mod error;
pub mod report;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{DateRangeParams, ReportSettings};
pub use error::{ApiError, AppError, Result};
pub use report::{ReportDescriptor, StatisticsReport, TabRenderFormOptions, TabRenderReport, render_report};
pub use services::AppServices;
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{parse_report_date, resolve_date_range, today_utc};

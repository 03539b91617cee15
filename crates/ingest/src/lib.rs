mod parser;
mod pipeline;
mod types;

pub use parser::{EventGroup, ParsedLine, TabRenderEvent, parse_tab_render_line};
pub use pipeline::ingest_events_dir;
pub use types::{IngestError, IngestIssue, IngestStats, Result};

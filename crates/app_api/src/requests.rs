use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

/// Report filters as sent by a client. Anything omitted falls back to the
/// default form.
#[derive(Debug, Deserialize, Default)]
pub struct TabRenderDataRequest {
    pub interval: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default)]
    pub groups: Vec<i64>,
    #[serde(default)]
    pub tabs: Vec<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct IngestRequest {
    pub dir: Option<String>,
}

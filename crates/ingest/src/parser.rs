use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

const TAB_RENDER_TYPE: &str = "tab_render";

/// A group the rendering user belonged to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventGroup {
    pub service: String,
    pub name: String,
}

/// One rendered tab, as logged by the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRenderEvent {
    pub timestamp: DateTime<Utc>,
    pub fragment_name: String,
    pub tab_name: String,
    pub groups: Vec<EventGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Event(TabRenderEvent),
    /// Not JSON, blank, or some other event type.
    Ignored,
    /// A `tab_render` line that cannot be counted.
    Invalid(String),
}

pub fn parse_tab_render_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() {
        return ParsedLine::Ignored;
    }
    let Some(obj) = parse_json_line(line) else {
        return ParsedLine::Ignored;
    };
    if obj.get("type").and_then(Value::as_str) != Some(TAB_RENDER_TYPE) {
        return ParsedLine::Ignored;
    }
    match extract_tab_render_event(&obj) {
        Ok(event) => ParsedLine::Event(event),
        Err(message) => ParsedLine::Invalid(message),
    }
}

fn parse_json_line(line: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(line).ok()?;
    value.is_object().then_some(value)
}

fn extract_tab_render_event(obj: &Value) -> Result<TabRenderEvent, String> {
    let timestamp = obj
        .get("timestamp")
        .and_then(parse_timestamp)
        .ok_or_else(|| "missing or malformed timestamp".to_string())?;
    let fragment_name = obj
        .get("fname")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| "missing fname".to_string())?
        .to_string();
    let tab_name = obj
        .get("tab_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    let groups = obj
        .get("groups")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(extract_group).collect::<Vec<_>>())
        .unwrap_or_default();
    if groups.is_empty() {
        return Err("event lists no groups".to_string());
    }
    Ok(TabRenderEvent {
        timestamp,
        fragment_name,
        tab_name,
        groups,
    })
}

fn extract_group(value: &Value) -> Option<EventGroup> {
    let service = value.get("service")?.as_str()?.trim();
    let name = value.get("name")?.as_str()?.trim();
    if service.is_empty() || name.is_empty() {
        return None;
    }
    Some(EventGroup {
        service: service.to_string(),
        name: name.to_string(),
    })
}

/// Accepts RFC 3339, naive `T`/space separated UTC, or epoch seconds/millis.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if let Some(epoch) = value.as_i64() {
        return from_epoch(epoch, epoch.unsigned_abs() > 9_999_999_999);
    }
    let raw = value.as_str()?.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::<Utc>::from_naive_utc_and_offset(parsed, Utc));
        }
    }
    if !raw.is_empty()
        && raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(epoch) = raw.parse::<i64>()
    {
        return from_epoch(epoch, raw.len() > 10);
    }
    None
}

fn from_epoch(value: i64, millis: bool) -> Option<DateTime<Utc>> {
    if millis {
        DateTime::<Utc>::from_timestamp_millis(value)
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)
    }
}

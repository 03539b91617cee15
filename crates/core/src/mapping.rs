use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A portal group that tab renders are aggregated under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregatedGroupMapping {
    pub id: i64,
    pub group_service: String,
    pub group_name: String,
}

/// A layout tab that renders are counted for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregatedTabMapping {
    pub id: i64,
    pub fragment_name: String,
    pub tab_name: String,
}

impl AggregatedTabMapping {
    pub fn display_string(&self) -> &str {
        if self.tab_name.trim().is_empty() {
            &self.fragment_name
        } else {
            &self.tab_name
        }
    }
}

pub fn group_name_order(a: &AggregatedGroupMapping, b: &AggregatedGroupMapping) -> Ordering {
    a.group_name
        .cmp(&b.group_name)
        .then_with(|| a.group_service.cmp(&b.group_service))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn tab_name_order(a: &AggregatedTabMapping, b: &AggregatedTabMapping) -> Ordering {
    a.display_string()
        .cmp(b.display_string())
        .then_with(|| a.fragment_name.cmp(&b.fragment_name))
        .then_with(|| a.id.cmp(&b.id))
}

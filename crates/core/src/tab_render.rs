use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregation::{BaseAggregation, BaseReportForm};
use crate::interval::AggregationInterval;
use crate::mapping::{
    AggregatedGroupMapping, AggregatedTabMapping, group_name_order, tab_name_order,
};

/// Identity of one tab render report column: a (group, tab) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabRenderDiscriminator {
    pub group: AggregatedGroupMapping,
    pub tab: AggregatedTabMapping,
}

impl TabRenderDiscriminator {
    pub fn new(group: AggregatedGroupMapping, tab: AggregatedTabMapping) -> Self {
        Self { group, tab }
    }
}

/// Orders columns by group name, then tab display string.
pub fn discriminator_order(a: &TabRenderDiscriminator, b: &TabRenderDiscriminator) -> Ordering {
    group_name_order(&a.group, &b.group).then_with(|| tab_name_order(&a.tab, &b.tab))
}

impl PartialEq for TabRenderDiscriminator {
    fn eq(&self, other: &Self) -> bool {
        discriminator_order(self, other) == Ordering::Equal
    }
}

impl Eq for TabRenderDiscriminator {}

impl PartialOrd for TabRenderDiscriminator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TabRenderDiscriminator {
    fn cmp(&self, other: &Self) -> Ordering {
        discriminator_order(self, other)
    }
}

/// Lookup key for every time bucket of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabRenderAggregationKey {
    pub interval: AggregationInterval,
    pub group_id: i64,
    pub tab_id: i64,
}

impl TabRenderAggregationKey {
    pub fn new(interval: AggregationInterval, discriminator: &TabRenderDiscriminator) -> Self {
        Self {
            interval,
            group_id: discriminator.group.id,
            tab_id: discriminator.tab.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRenderAggregation {
    pub key: TabRenderAggregationKey,
    pub date_time: DateTime<Utc>,
    pub render_count: u32,
}

impl BaseAggregation for TabRenderAggregation {
    type Key = TabRenderAggregationKey;

    fn key(&self) -> &Self::Key {
        &self.key
    }

    fn date_time(&self) -> DateTime<Utc> {
        self.date_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRenderReportForm {
    pub interval: AggregationInterval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub groups: Vec<i64>,
    #[serde(default)]
    pub tabs: Vec<i64>,
}

impl BaseReportForm for TabRenderReportForm {
    fn interval(&self) -> AggregationInterval {
        self.interval
    }

    fn start(&self) -> NaiveDate {
        self.start
    }

    fn end(&self) -> NaiveDate {
        self.end
    }
}

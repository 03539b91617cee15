use serde::{Deserialize, Serialize};
use tabstats_core::AggregationInterval;

/// Report defaults and the intervals aggregations are kept for.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportSettings {
    pub intervals: Vec<AggregationInterval>,
    pub default_interval: AggregationInterval,
    pub default_range_days: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            intervals: vec![
                AggregationInterval::Hour,
                AggregationInterval::Day,
                AggregationInterval::Week,
                AggregationInterval::Month,
            ],
            default_interval: AggregationInterval::Day,
            default_range_days: 30,
        }
    }
}

impl ReportSettings {
    /// Configured intervals without duplicates, in declaration order. An
    /// empty list enables the default interval only.
    pub fn enabled_intervals(&self) -> Vec<AggregationInterval> {
        let mut enabled = Vec::with_capacity(self.intervals.len());
        for interval in &self.intervals {
            if !enabled.contains(interval) {
                enabled.push(*interval);
            }
        }
        if enabled.is_empty() {
            enabled.push(self.default_interval);
        }
        enabled
    }

    pub fn initial_interval(&self) -> AggregationInterval {
        let enabled = self.enabled_intervals();
        if enabled.contains(&self.default_interval) {
            self.default_interval
        } else {
            enabled[0]
        }
    }

    pub fn range_days(&self) -> u32 {
        self.default_range_days.max(1)
    }
}

/// Loosely-typed date bounds as they arrive from callers.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct DateRangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

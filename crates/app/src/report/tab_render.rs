use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use tabstats_core::{
    AggregatedGroupMapping, AggregatedTabMapping, AggregationInterval, ColumnDescription,
    TabRenderAggregation, TabRenderAggregationKey, TabRenderDiscriminator, TabRenderReportForm,
    Value, ValueType, group_name_order, tab_name_order,
};

use super::store::{AggregationStore, GroupCatalog, TabCatalog};
use super::{ColumnAggregations, ColumnMap, StatisticsReport};
use crate::config::ReportSettings;
use crate::error::{AppError, Result};

const REPORT_NAME: &str = "tabRender.totals";
const DATA_TABLE_RESOURCE_ID: &str = "tabRenderData";

/// Tab render counts per (group, tab) column.
pub struct TabRenderReport<'a, S> {
    store: &'a S,
    settings: &'a ReportSettings,
}

/// Default selections plus everything a caller can choose from.
#[derive(Debug, Clone, Serialize)]
pub struct TabRenderFormOptions {
    pub form: TabRenderReportForm,
    pub intervals: Vec<AggregationInterval>,
    pub groups: Vec<AggregatedGroupMapping>,
    pub tabs: Vec<AggregatedTabMapping>,
}

impl<'a, S> TabRenderReport<'a, S>
where
    S: AggregationStore<TabRenderAggregation> + GroupCatalog + TabCatalog,
{
    pub fn new(store: &'a S, settings: &'a ReportSettings) -> Self {
        Self { store, settings }
    }

    /// One key per discriminator, carrying `interval` and no time bucket.
    pub fn query_keys<'d>(
        discriminators: impl IntoIterator<Item = &'d TabRenderDiscriminator>,
        interval: AggregationInterval,
    ) -> HashSet<TabRenderAggregationKey> {
        discriminators
            .into_iter()
            .map(|discriminator| TabRenderAggregationKey::new(interval, discriminator))
            .collect()
    }

    /// Every known tab, by display string.
    pub fn tabs(&self) -> Result<Vec<AggregatedTabMapping>> {
        let mut tabs = self.store.tab_mappings()?;
        tabs.sort_by(tab_name_order);
        Ok(tabs)
    }

    /// Every known group, by name.
    pub fn groups(&self) -> Result<Vec<AggregatedGroupMapping>> {
        let mut groups = self.store.group_mappings()?;
        groups.sort_by(group_name_order);
        Ok(groups)
    }

    pub fn intervals(&self) -> Vec<AggregationInterval> {
        self.settings.enabled_intervals()
    }

    /// Configured interval over the configured number of days ending
    /// `today`, with the first group and the first tab selected.
    pub fn default_form(&self, today: NaiveDate) -> Result<TabRenderReportForm> {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.settings.range_days()) - 1))
            .unwrap_or(NaiveDate::MIN);
        let groups = self.groups()?.into_iter().take(1).map(|group| group.id).collect();
        let tabs = self.tabs()?.into_iter().take(1).map(|tab| tab.id).collect();
        Ok(TabRenderReportForm {
            interval: self.settings.initial_interval(),
            start,
            end: today,
            groups,
            tabs,
        })
    }

    pub fn form_options(&self, today: NaiveDate) -> Result<TabRenderFormOptions> {
        Ok(TabRenderFormOptions {
            form: self.default_form(today)?,
            intervals: self.intervals(),
            groups: self.groups()?,
            tabs: self.tabs()?,
        })
    }

    fn lookup_group(&self, id: i64) -> Result<AggregatedGroupMapping> {
        self.store
            .group_mapping(id)?
            .ok_or_else(|| AppError::NotFound(format!("group {} not found", id)))
    }

    fn lookup_tab(&self, id: i64) -> Result<AggregatedTabMapping> {
        self.store
            .tab_mapping(id)?
            .ok_or_else(|| AppError::NotFound(format!("tab {} not found", id)))
    }
}

impl<S> StatisticsReport for TabRenderReport<'_, S>
where
    S: AggregationStore<TabRenderAggregation> + GroupCatalog + TabCatalog,
{
    type Aggregation = TabRenderAggregation;
    type Discriminator = TabRenderDiscriminator;
    type Form = TabRenderReportForm;

    fn report_name(&self) -> &'static str {
        REPORT_NAME
    }

    fn data_resource_id(&self) -> &'static str {
        DATA_TABLE_RESOURCE_ID
    }

    fn build_column_map(
        &self,
        form: &TabRenderReportForm,
    ) -> Result<ColumnMap<TabRenderDiscriminator, TabRenderAggregation>> {
        let mut columns = ColumnMap::new();
        for group_id in &form.groups {
            let group = self.lookup_group(*group_id)?;
            for tab_id in &form.tabs {
                let tab = self.lookup_tab(*tab_id)?;
                columns.insert(
                    TabRenderDiscriminator::new(group.clone(), tab),
                    ColumnAggregations::new(),
                );
            }
        }
        Ok(columns)
    }

    fn query_key(
        &self,
        discriminator: &TabRenderDiscriminator,
        form: &TabRenderReportForm,
    ) -> TabRenderAggregationKey {
        TabRenderAggregationKey::new(form.interval, discriminator)
    }

    fn build_query_keys(
        &self,
        columns: &ColumnMap<TabRenderDiscriminator, TabRenderAggregation>,
        form: &TabRenderReportForm,
    ) -> HashSet<TabRenderAggregationKey> {
        Self::query_keys(columns.keys(), form.interval)
    }

    fn get_aggregations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        keys: &HashSet<TabRenderAggregationKey>,
    ) -> Result<Vec<TabRenderAggregation>> {
        self.store.get_aggregations(start, end, keys)
    }

    fn render_columns(
        &self,
        discriminator: &TabRenderDiscriminator,
        form: &TabRenderReportForm,
    ) -> Vec<ColumnDescription> {
        let mut label = discriminator.tab.display_string().to_string();
        if form.groups.len() > 1 {
            label.push_str(" - ");
            label.push_str(&discriminator.group.group_name);
        }
        vec![ColumnDescription::new(label.clone(), ValueType::Number, label)]
    }

    fn row_values(
        &self,
        aggregation: Option<&TabRenderAggregation>,
        _form: &TabRenderReportForm,
    ) -> Vec<Value> {
        let count = aggregation.map_or(0, |aggregation| aggregation.render_count);
        vec![Value::from(count)]
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use tabstats_core::{BaseAggregation, TableError};

    use super::*;
    use crate::report::{TIME_COLUMN_LABEL, render_report};

    #[derive(Default)]
    struct MemoryStore {
        groups: HashMap<i64, AggregatedGroupMapping>,
        tabs: HashMap<i64, AggregatedTabMapping>,
        aggregations: Vec<TabRenderAggregation>,
        queried_keys: RefCell<Vec<HashSet<TabRenderAggregationKey>>>,
    }

    impl MemoryStore {
        fn with_group(mut self, id: i64, name: &str) -> Self {
            self.groups.insert(
                id,
                AggregatedGroupMapping {
                    id,
                    group_service: "local".to_string(),
                    group_name: name.to_string(),
                },
            );
            self
        }

        fn with_tab(mut self, id: i64, name: &str) -> Self {
            self.tabs.insert(
                id,
                AggregatedTabMapping {
                    id,
                    fragment_name: format!("u1l1s{id}"),
                    tab_name: name.to_string(),
                },
            );
            self
        }

        fn with_count(
            mut self,
            interval: AggregationInterval,
            group_id: i64,
            tab_id: i64,
            date_time: &str,
            render_count: u32,
        ) -> Self {
            self.aggregations.push(TabRenderAggregation {
                key: TabRenderAggregationKey {
                    interval,
                    group_id,
                    tab_id,
                },
                date_time: ts(date_time),
                render_count,
            });
            self
        }
    }

    impl AggregationStore<TabRenderAggregation> for MemoryStore {
        fn get_aggregations(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            keys: &HashSet<TabRenderAggregationKey>,
        ) -> Result<Vec<TabRenderAggregation>> {
            self.queried_keys.borrow_mut().push(keys.clone());
            Ok(self
                .aggregations
                .iter()
                .filter(|aggregation| keys.contains(aggregation.key()))
                .filter(|aggregation| aggregation.date_time >= start && aggregation.date_time < end)
                .cloned()
                .collect())
        }
    }

    impl GroupCatalog for MemoryStore {
        fn group_mapping(&self, id: i64) -> Result<Option<AggregatedGroupMapping>> {
            Ok(self.groups.get(&id).cloned())
        }

        fn group_mappings(&self) -> Result<Vec<AggregatedGroupMapping>> {
            Ok(self.groups.values().cloned().collect())
        }
    }

    impl TabCatalog for MemoryStore {
        fn tab_mapping(&self, id: i64) -> Result<Option<AggregatedTabMapping>> {
            Ok(self.tabs.get(&id).cloned())
        }

        fn tab_mappings(&self) -> Result<Vec<AggregatedTabMapping>> {
            Ok(self.tabs.values().cloned().collect())
        }
    }

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
    }

    fn form(groups: Vec<i64>, tabs: Vec<i64>) -> TabRenderReportForm {
        TabRenderReportForm {
            interval: AggregationInterval::Day,
            start: date("2025-01-06"),
            end: date("2025-01-08"),
            groups,
            tabs,
        }
    }

    fn labels(table: &tabstats_core::DataTable) -> Vec<&str> {
        table
            .columns()
            .iter()
            .map(|column| column.label.as_str())
            .collect()
    }

    fn numbers(table: &tabstats_core::DataTable) -> Vec<Vec<f64>> {
        table
            .rows()
            .iter()
            .map(|row| row.values().skip(1).filter_map(Value::as_number).collect())
            .collect()
    }

    fn portal() -> MemoryStore {
        MemoryStore::default()
            .with_group(1, "Everyone")
            .with_group(2, "Staff")
            .with_tab(10, "Welcome")
            .with_tab(11, "News")
    }

    #[test]
    fn single_group_labels_are_tab_names() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![1], vec![10, 11])).expect("report");
        assert_eq!(labels(&table), vec![TIME_COLUMN_LABEL, "News", "Welcome"]);
        assert!(table.columns()[1..]
            .iter()
            .all(|column| column.value_type == ValueType::Number && column.id == column.label));
    }

    #[test]
    fn multiple_groups_suffix_group_name() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![2, 1], vec![10])).expect("report");
        assert_eq!(
            labels(&table),
            vec![TIME_COLUMN_LABEL, "Welcome - Everyone", "Welcome - Staff"]
        );
    }

    #[test]
    fn missing_buckets_render_as_zero() {
        let store = portal()
            .with_count(AggregationInterval::Day, 1, 10, "2025-01-06T00:00:00Z", 4)
            .with_count(AggregationInterval::Day, 1, 11, "2025-01-07T00:00:00Z", 2)
            .with_count(AggregationInterval::Day, 1, 10, "2025-01-08T00:00:00Z", 1)
            .with_count(AggregationInterval::Hour, 1, 10, "2025-01-06T10:00:00Z", 9)
            .with_count(AggregationInterval::Day, 1, 10, "2025-01-09T00:00:00Z", 5);
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![1], vec![10, 11])).expect("report");

        // Columns: News, Welcome.
        assert_eq!(numbers(&table), vec![vec![0.0, 4.0], vec![2.0, 0.0], vec![0.0, 1.0]]);
        let first = table.rows()[0].values().next().expect("time cell");
        assert_eq!(first, &Value::DateTime(ts("2025-01-06T00:00:00Z")));
    }

    #[test]
    fn days_without_data_render_as_zero_rows() {
        let store = portal()
            .with_count(AggregationInterval::Day, 1, 10, "2025-01-06T00:00:00Z", 4)
            .with_count(AggregationInterval::Day, 1, 10, "2025-01-08T00:00:00Z", 1);
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![1], vec![10])).expect("report");
        assert_eq!(numbers(&table), vec![vec![4.0], vec![0.0], vec![1.0]]);
        let times: Vec<&Value> = table
            .rows()
            .iter()
            .filter_map(|row| row.values().next())
            .collect();
        assert_eq!(
            times,
            vec![
                &Value::DateTime(ts("2025-01-06T00:00:00Z")),
                &Value::DateTime(ts("2025-01-07T00:00:00Z")),
                &Value::DateTime(ts("2025-01-08T00:00:00Z")),
            ]
        );
    }

    #[test]
    fn empty_store_still_renders_every_bucket() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![1, 2], vec![10])).expect("report");
        assert_eq!(numbers(&table), vec![vec![0.0, 0.0]; 3]);

        let hourly = TabRenderReportForm {
            interval: AggregationInterval::Hour,
            ..form(vec![1], vec![10])
        };
        let table = render_report(&report, &hourly).expect("report");
        assert_eq!(table.rows().len(), 3 * 24);
    }

    #[test]
    fn row_values_default_to_zero() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let form = form(vec![1], vec![10]);
        assert_eq!(report.row_values(None, &form), vec![Value::Number(0.0)]);
        let aggregation = TabRenderAggregation {
            key: TabRenderAggregationKey {
                interval: AggregationInterval::Day,
                group_id: 1,
                tab_id: 10,
            },
            date_time: ts("2025-01-06T00:00:00Z"),
            render_count: 7,
        };
        assert_eq!(
            report.row_values(Some(&aggregation), &form),
            vec![Value::Number(7.0)]
        );
    }

    #[test]
    fn unknown_tab_fails_without_querying() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let form = form(vec![1], vec![10, 99]);
        let err = report.build_column_map(&form).expect_err("unknown tab");
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("99")));

        let err = render_report(&report, &form).expect_err("unknown tab");
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(store.queried_keys.borrow().is_empty());
    }

    #[test]
    fn unknown_group_is_a_lookup_error() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let err = report
            .build_column_map(&form(vec![1, 42], vec![10]))
            .expect_err("unknown group");
        assert!(matches!(err, AppError::NotFound(ref message) if message.contains("42")));
    }

    #[test]
    fn column_map_is_cross_product_in_name_order() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let columns = report
            .build_column_map(&form(vec![2, 1], vec![10, 11]))
            .expect("columns");
        let order: Vec<(&str, &str)> = columns
            .keys()
            .map(|d| (d.group.group_name.as_str(), d.tab.display_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Everyone", "News"),
                ("Everyone", "Welcome"),
                ("Staff", "News"),
                ("Staff", "Welcome"),
            ]
        );
        assert!(columns.values().all(|column| column.is_empty()));
    }

    #[test]
    fn query_keys_match_discriminators() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let columns = report
            .build_column_map(&form(vec![1, 2], vec![10, 11]))
            .expect("columns");
        let keys = TabRenderReport::<MemoryStore>::query_keys(
            columns.keys(),
            AggregationInterval::Week,
        );
        assert_eq!(keys.len(), columns.len());
        assert!(keys.iter().all(|key| key.interval == AggregationInterval::Week));
        assert!(keys.contains(&TabRenderAggregationKey {
            interval: AggregationInterval::Week,
            group_id: 2,
            tab_id: 11,
        }));
        assert!(
            TabRenderReport::<MemoryStore>::query_keys([], AggregationInterval::Day)
                .is_empty()
        );
    }

    #[test]
    fn empty_selection_renders_time_column_only() {
        let store = portal();
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let table = render_report(&report, &form(vec![], vec![10])).expect("report");
        assert_eq!(labels(&table), vec![TIME_COLUMN_LABEL]);
        assert!(table.rows().is_empty());
    }

    #[test]
    fn default_form_pins_first_sorted_group_and_tab() {
        let store = portal();
        let settings = ReportSettings {
            default_range_days: 7,
            ..ReportSettings::default()
        };
        let report = TabRenderReport::new(&store, &settings);
        let form = report.default_form(date("2025-01-10")).expect("form");
        assert_eq!(form.groups, vec![1]);
        assert_eq!(form.tabs, vec![11]);
        assert_eq!(form.start, date("2025-01-04"));
        assert_eq!(form.end, date("2025-01-10"));
        assert_eq!(form.interval, AggregationInterval::Day);

        let empty = MemoryStore::default();
        let report = TabRenderReport::new(&empty, &settings);
        let form = report.default_form(date("2025-01-10")).expect("form");
        assert!(form.groups.is_empty());
        assert!(form.tabs.is_empty());
    }

    #[test]
    fn catalog_listings_are_sorted() {
        let store = portal().with_tab(12, "About");
        let settings = ReportSettings::default();
        let report = TabRenderReport::new(&store, &settings);
        let tabs: Vec<String> = report
            .tabs()
            .expect("tabs")
            .into_iter()
            .map(|tab| tab.tab_name)
            .collect();
        assert_eq!(tabs, vec!["About", "News", "Welcome"]);
        let groups: Vec<String> = report
            .groups()
            .expect("groups")
            .into_iter()
            .map(|group| group.group_name)
            .collect();
        assert_eq!(groups, vec!["Everyone", "Staff"]);
    }

    #[test]
    fn table_errors_surface_from_row_type_checks() {
        let err = TableError::TypeMismatch {
            column: "Welcome".to_string(),
            expected: ValueType::Number,
            found: ValueType::Text,
        };
        assert!(matches!(AppError::from(err), AppError::Table(_)));
    }
}

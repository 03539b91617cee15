mod store;
mod tab_render;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabstats_core::{
    BaseAggregation, BaseReportForm, ColumnDescription, DataTable, Value, ValueType,
};
use tracing::debug;

use crate::error::Result;

pub use store::{AggregationStore, GroupCatalog, TabCatalog};
pub use tab_render::{TabRenderFormOptions, TabRenderReport};

/// Aggregations of one report column, keyed by bucket start.
pub type ColumnAggregations<A> = BTreeMap<DateTime<Utc>, A>;

/// Report columns in display order.
pub type ColumnMap<D, A> = BTreeMap<D, ColumnAggregations<A>>;

pub type QueryKey<R> = <<R as StatisticsReport>::Aggregation as BaseAggregation>::Key;

pub const TIME_COLUMN_ID: &str = "time";
pub const TIME_COLUMN_LABEL: &str = "Time";

/// The pieces a concrete report plugs into [`render_report`].
pub trait StatisticsReport {
    type Aggregation: BaseAggregation;
    /// Identity of one column; its `Ord` is the column order.
    type Discriminator: Ord + Clone;
    type Form: BaseReportForm;

    fn report_name(&self) -> &'static str;
    fn data_resource_id(&self) -> &'static str;

    /// One empty column per selected discriminator. Fails without a partial
    /// map if any selection cannot be resolved.
    fn build_column_map(
        &self,
        form: &Self::Form,
    ) -> Result<ColumnMap<Self::Discriminator, Self::Aggregation>>;

    /// The time-less store key matching every bucket of a column.
    fn query_key(&self, discriminator: &Self::Discriminator, form: &Self::Form) -> QueryKey<Self>;

    /// One key per column of `columns`.
    fn build_query_keys(
        &self,
        columns: &ColumnMap<Self::Discriminator, Self::Aggregation>,
        form: &Self::Form,
    ) -> HashSet<QueryKey<Self>> {
        columns
            .keys()
            .map(|discriminator| self.query_key(discriminator, form))
            .collect()
    }

    fn get_aggregations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        keys: &HashSet<QueryKey<Self>>,
    ) -> Result<Vec<Self::Aggregation>>;

    fn render_columns(
        &self,
        discriminator: &Self::Discriminator,
        form: &Self::Form,
    ) -> Vec<ColumnDescription>;

    /// Values for one column in one row; `None` when the bucket has no data.
    fn row_values(&self, aggregation: Option<&Self::Aggregation>, form: &Self::Form) -> Vec<Value>;
}

/// Builds the data table for `form`: a `Time` column followed by every
/// discriminator's columns, one row per interval bucket in the form's range.
/// Buckets without a stored aggregation still get a row. A form that selects
/// no columns yields no rows.
pub fn render_report<R: StatisticsReport>(report: &R, form: &R::Form) -> Result<DataTable> {
    let mut columns = report.build_column_map(form)?;
    let keys = report.build_query_keys(&columns, form);
    let discriminators: HashMap<QueryKey<R>, R::Discriminator> = columns
        .keys()
        .map(|discriminator| (report.query_key(discriminator, form), discriminator.clone()))
        .collect();

    let (start, end) = form.query_range();
    let aggregations = report.get_aggregations(start, end, &keys)?;
    debug!(
        report = report.report_name(),
        columns = columns.len(),
        aggregations = aggregations.len(),
        %start,
        %end,
        "loaded aggregations"
    );
    for aggregation in aggregations {
        let column = discriminators
            .get(aggregation.key())
            .and_then(|discriminator| columns.get_mut(discriminator));
        match column {
            Some(column) => {
                column.insert(aggregation.date_time(), aggregation);
            }
            None => debug!(report = report.report_name(), "ignoring unrequested aggregation"),
        }
    }

    let mut table = DataTable::new();
    table.add_column(ColumnDescription::new(
        TIME_COLUMN_ID,
        ValueType::DateTime,
        TIME_COLUMN_LABEL,
    ));
    for discriminator in columns.keys() {
        table.add_columns(report.render_columns(discriminator, form));
    }

    if columns.is_empty() {
        return Ok(table);
    }
    let mut bucket_starts: BTreeSet<DateTime<Utc>> =
        form.interval().bucket_starts(start, end).collect();
    bucket_starts.extend(columns.values().flat_map(|column| column.keys().copied()));
    for bucket_start in bucket_starts {
        let mut values = vec![Value::from(bucket_start)];
        for column in columns.values() {
            values.extend(report.row_values(column.get(&bucket_start), form));
        }
        table.add_row(values)?;
    }
    Ok(table)
}

/// A report the outer layer can offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDescriptor {
    pub name: String,
    pub data_resource_id: String,
}

impl ReportDescriptor {
    pub fn of<R: StatisticsReport>(report: &R) -> Self {
        Self {
            name: report.report_name().to_string(),
            data_resource_id: report.data_resource_id().to_string(),
        }
    }
}

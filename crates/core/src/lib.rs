mod aggregation;
mod interval;
mod mapping;
mod tab_render;
mod table;

pub use aggregation::{BaseAggregation, BaseReportForm};
pub use interval::{AggregationInterval, UnknownInterval};
pub use mapping::{AggregatedGroupMapping, AggregatedTabMapping, group_name_order, tab_name_order};
pub use tab_render::{
    TabRenderAggregation, TabRenderAggregationKey, TabRenderDiscriminator, TabRenderReportForm,
    discriminator_order,
};
pub use table::{
    ColumnDescription, DataTable, TableCell, TableError, TableRow, Value, ValueType,
};

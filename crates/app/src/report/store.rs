use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tabstats_core::{
    AggregatedGroupMapping, AggregatedTabMapping, BaseAggregation, TabRenderAggregation,
};
use tabstats_db::Db;

use crate::error::Result;

/// Keyed lookup of pre-computed aggregations.
pub trait AggregationStore<A: BaseAggregation> {
    /// Every aggregation for `keys` whose bucket starts in `[start, end)`.
    fn get_aggregations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        keys: &HashSet<A::Key>,
    ) -> Result<Vec<A>>;
}

pub trait GroupCatalog {
    fn group_mapping(&self, id: i64) -> Result<Option<AggregatedGroupMapping>>;
    fn group_mappings(&self) -> Result<Vec<AggregatedGroupMapping>>;
}

pub trait TabCatalog {
    fn tab_mapping(&self, id: i64) -> Result<Option<AggregatedTabMapping>>;
    fn tab_mappings(&self) -> Result<Vec<AggregatedTabMapping>>;
}

impl AggregationStore<TabRenderAggregation> for Db {
    fn get_aggregations(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        keys: &HashSet<<TabRenderAggregation as BaseAggregation>::Key>,
    ) -> Result<Vec<TabRenderAggregation>> {
        Ok(self.get_tab_render_aggregations(start, end, keys)?)
    }
}

impl GroupCatalog for Db {
    fn group_mapping(&self, id: i64) -> Result<Option<AggregatedGroupMapping>> {
        Ok(self.get_group_mapping(id)?)
    }

    fn group_mappings(&self) -> Result<Vec<AggregatedGroupMapping>> {
        Ok(self.list_group_mappings()?)
    }
}

impl TabCatalog for Db {
    fn tab_mapping(&self, id: i64) -> Result<Option<AggregatedTabMapping>> {
        Ok(self.get_tab_mapping(id)?)
    }

    fn tab_mappings(&self) -> Result<Vec<AggregatedTabMapping>> {
        Ok(self.list_tab_mappings()?)
    }
}

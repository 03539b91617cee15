use rusqlite::{OptionalExtension, params};
use tabstats_core::{AggregatedGroupMapping, AggregatedTabMapping};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{row_to_group_mapping, row_to_tab_mapping};

impl Db {
    pub fn get_group_mapping(&self, id: i64) -> Result<Option<AggregatedGroupMapping>> {
        self.conn
            .query_row(
                r#"
                SELECT id, group_service, group_name
                FROM aggr_group_mapping
                WHERE id = ?1
                "#,
                params![id],
                row_to_group_mapping,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn list_group_mappings(&self) -> Result<Vec<AggregatedGroupMapping>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, group_service, group_name
            FROM aggr_group_mapping
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_group_mapping)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_or_create_group_mapping(
        &self,
        group_service: &str,
        group_name: &str,
    ) -> Result<AggregatedGroupMapping> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO aggr_group_mapping (group_service, group_name)
            VALUES (?1, ?2)
            "#,
            params![group_service, group_name],
        )?;
        self.conn
            .query_row(
                r#"
                SELECT id, group_service, group_name
                FROM aggr_group_mapping
                WHERE group_service = ?1 AND group_name = ?2
                "#,
                params![group_service, group_name],
                row_to_group_mapping,
            )
            .map_err(DbError::from)
    }

    pub fn get_tab_mapping(&self, id: i64) -> Result<Option<AggregatedTabMapping>> {
        self.conn
            .query_row(
                r#"
                SELECT id, fragment_name, tab_name
                FROM aggr_tab_mapping
                WHERE id = ?1
                "#,
                params![id],
                row_to_tab_mapping,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn list_tab_mappings(&self) -> Result<Vec<AggregatedTabMapping>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, fragment_name, tab_name
            FROM aggr_tab_mapping
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_tab_mapping)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_or_create_tab_mapping(
        &self,
        fragment_name: &str,
        tab_name: &str,
    ) -> Result<AggregatedTabMapping> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO aggr_tab_mapping (fragment_name, tab_name)
            VALUES (?1, ?2)
            "#,
            params![fragment_name, tab_name],
        )?;
        self.conn
            .query_row(
                r#"
                SELECT id, fragment_name, tab_name
                FROM aggr_tab_mapping
                WHERE fragment_name = ?1 AND tab_name = ?2
                "#,
                params![fragment_name, tab_name],
                row_to_tab_mapping,
            )
            .map_err(DbError::from)
    }
}

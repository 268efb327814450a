use crate::catalog::{CatalogMetadata, CatalogSource};
use crate::error::DdlResult;
use crate::types::{ColumnRow, ConstraintColumnRow, TableName};
use std::collections::HashSet;

/// Fixed catalog snapshot held in memory
///
/// Rows are returned in insertion order, which lets callers check that
/// nothing downstream depends on arrival order.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub tables: Vec<TableName>,
    pub columns: Vec<ColumnRow>,
    pub constraints: Vec<ConstraintColumnRow>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<TableName>) -> Self {
        self.tables.push(name.into());
        self
    }

    pub fn with_column(mut self, row: ColumnRow) -> Self {
        self.columns.push(row);
        self
    }

    pub fn with_constraint(mut self, row: ConstraintColumnRow) -> Self {
        self.constraints.push(row);
        self
    }
}

impl CatalogSource for StaticCatalog {
    async fn list_base_tables(&self) -> DdlResult<Vec<TableName>> {
        Ok(self.tables.clone())
    }

    async fn fetch_metadata(&self, tables: &[TableName]) -> DdlResult<CatalogMetadata> {
        let wanted: HashSet<&str> = tables.iter().map(String::as_str).collect();

        Ok(CatalogMetadata {
            columns: self
                .columns
                .iter()
                .filter(|row| wanted.contains(row.table_name.as_str()))
                .cloned()
                .collect(),
            constraints: self
                .constraints
                .iter()
                .filter(|row| wanted.contains(row.table_name.as_str()))
                .cloned()
                .collect(),
        })
    }
}

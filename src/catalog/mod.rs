// Catalog reader: metadata queries and column formatting
pub mod columns;
pub mod memory;
pub mod postgres;
pub mod queries;


pub use columns::{column_fragments, format_column};
pub use memory::StaticCatalog;
pub use postgres::PostgresCatalog;

use crate::error::DdlResult;
use crate::types::{ColumnRow, ConstraintColumnRow, TableName};

/// Ungrouped metadata rows for a set of tables
#[derive(Debug, Clone, Default)]
pub struct CatalogMetadata {
    pub columns: Vec<ColumnRow>,
    pub constraints: Vec<ConstraintColumnRow>,
}

/// Read-only source of catalog metadata for one schema
///
/// Implementations return rows in whatever order the backend produces;
/// callers must not rely on it.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Names of all base tables in the schema
    async fn list_base_tables(&self) -> DdlResult<Vec<TableName>>;

    /// Column and constraint rows for the given tables. `tables` is never empty.
    async fn fetch_metadata(&self, tables: &[TableName]) -> DdlResult<CatalogMetadata>;
}

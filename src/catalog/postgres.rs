use crate::catalog::{queries, CatalogMetadata, CatalogSource};
use crate::error::{DdlError, DdlResult};
use crate::types::{ColumnDefinition, ColumnRow, ConstraintColumnRow, TableName};
use tokio_postgres::{GenericClient, Row};
use tracing::debug;

/// Catalog reader backed by a `tokio-postgres` client or transaction
pub struct PostgresCatalog<'a, C> {
    client: &'a C,
    schema: String,
}

impl<'a, C> PostgresCatalog<'a, C>
where
    C: GenericClient + Sync,
{
    pub fn new(client: &'a C, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    async fn fetch_columns(&self, tables: &[TableName]) -> DdlResult<Vec<ColumnRow>> {
        let rows = self
            .client
            .query(queries::TABLE_COLUMNS, &[&self.schema, &tables])
            .await
            .map_err(|e| DdlError::from_postgres(e, "querying table columns"))?;

        rows.iter()
            .map(column_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DdlError::from_postgres(e, "decoding column metadata"))
    }

    async fn fetch_constraints(&self, tables: &[TableName]) -> DdlResult<Vec<ConstraintColumnRow>> {
        let rows = self
            .client
            .query(queries::TABLE_CONSTRAINT_COLUMNS, &[&self.schema, &tables])
            .await
            .map_err(|e| DdlError::from_postgres(e, "querying table constraints"))?;

        rows.iter()
            .map(constraint_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DdlError::from_postgres(e, "decoding constraint metadata"))
    }
}

impl<'a, C> CatalogSource for PostgresCatalog<'a, C>
where
    C: GenericClient + Sync,
{
    async fn list_base_tables(&self) -> DdlResult<Vec<TableName>> {
        let rows = self
            .client
            .query(queries::LIST_BASE_TABLES, &[&self.schema])
            .await
            .map_err(|e| DdlError::from_postgres(e, "listing base tables"))?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<_, String>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DdlError::from_postgres(e, "decoding table listing"))?;

        debug!(schema = %self.schema, tables = tables.len(), "Listed base tables");
        Ok(tables)
    }

    async fn fetch_metadata(&self, tables: &[TableName]) -> DdlResult<CatalogMetadata> {
        let columns = self.fetch_columns(tables).await?;
        let constraints = self.fetch_constraints(tables).await?;

        debug!(
            schema = %self.schema,
            column_rows = columns.len(),
            constraint_rows = constraints.len(),
            "Fetched catalog metadata"
        );

        Ok(CatalogMetadata {
            columns,
            constraints,
        })
    }
}

fn column_row(row: &Row) -> Result<ColumnRow, tokio_postgres::Error> {
    Ok(ColumnRow {
        table_name: row.try_get("table_name")?,
        column: ColumnDefinition {
            name: row.try_get("column_name")?,
            data_type: row.try_get("data_type")?,
            max_length: row.try_get("max_length")?,
            default_expression: row.try_get("column_default")?,
            nullable: row.try_get("is_nullable")?,
            ordinal_position: row.try_get("ordinal_position")?,
        },
    })
}

fn constraint_row(row: &Row) -> Result<ConstraintColumnRow, tokio_postgres::Error> {
    Ok(ConstraintColumnRow {
        table_name: row.try_get("table_name")?,
        constraint_name: row.try_get("constraint_name")?,
        constraint_type: row.try_get("constraint_type")?,
        column_name: row.try_get("column_name")?,
        ordinal_position: row.try_get("ordinal_position")?,
        foreign_table_name: row.try_get("foreign_table_name")?,
        foreign_column_name: row.try_get("foreign_column_name")?,
    })
}

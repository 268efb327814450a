use serde::{Deserialize, Serialize};

/// Case-sensitive table identifier as stored in the catalog
pub type TableName = String;

/// Column metadata read from `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Catalog data type, e.g. `character varying`
    pub data_type: String,
    /// Declared character length, if any
    pub max_length: Option<i32>,
    /// Default expression, copied verbatim from the catalog
    pub default_expression: Option<String>,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// 1-based declared position within the table
    pub ordinal_position: i32,
}

/// One column row as returned by the metadata pass, tagged with its table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table_name: TableName,
    pub column: ColumnDefinition,
}

/// One constrained column of one table constraint
///
/// Rows arrive ungrouped and in no particular order. A multi-column
/// constraint produces one row per key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintColumnRow {
    pub table_name: TableName,
    pub constraint_name: String,
    /// Raw `constraint_type`, e.g. `PRIMARY KEY`
    pub constraint_type: String,
    pub column_name: String,
    /// 1-based position of the column within the constraint
    pub ordinal_position: i32,
    /// Referenced table, for foreign keys
    pub foreign_table_name: Option<TableName>,
    /// Referenced column paired with `column_name`, for foreign keys
    pub foreign_column_name: Option<String>,
}

/// Target of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyTarget {
    pub table: TableName,
    /// Referenced columns, in the constraint's own ordinal order
    pub columns: Vec<String>,
}

/// Kind of a table constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey(ForeignKeyTarget),
    Unique,
    /// Any kind not reconstructed, kept with its raw type name
    Other(String),
}

/// A table constraint aggregated from its column rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub name: String,
    pub kind: ConstraintKind,
    /// Constrained columns, in per-constraint ordinal order
    pub key_columns: Vec<String>,
}

/// Rendered `CREATE TABLE` statement for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDdl {
    pub table_name: TableName,
    pub statement: String,
}

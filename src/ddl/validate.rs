use crate::types::{TableDdl, TableName};
use serde::Serialize;
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// A rendered statement that did not parse back as a single CREATE TABLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementIssue {
    pub table_name: TableName,
    pub message: String,
}

/// Parse each statement with the PostgreSQL dialect.
///
/// Catalog type names such as `USER-DEFINED` or `ARRAY` are not valid DDL,
/// so issues are advisory and never block the artifact.
pub fn check_statements(tables: &[TableDdl]) -> Vec<StatementIssue> {
    tables
        .iter()
        .filter_map(|table| {
            check_statement(&table.statement).err().map(|message| StatementIssue {
                table_name: table.table_name.clone(),
                message,
            })
        })
        .collect()
}

fn check_statement(statement: &str) -> Result<(), String> {
    let parsed = Parser::parse_sql(&PostgreSqlDialect {}, statement).map_err(|e| e.to_string())?;

    match parsed.as_slice() {
        [Statement::CreateTable { .. }] => Ok(()),
        other => Err(format!(
            "expected a single CREATE TABLE, got {} statement(s)",
            other.len()
        )),
    }
}

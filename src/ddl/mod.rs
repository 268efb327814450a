// DDL composition and artifact rendering
pub mod ident;
pub mod validate;


pub use ident::quote_ident;
pub use validate::{check_statements, StatementIssue};

use crate::error::DdlResult;
use crate::types::TableDdl;
use serde::{Deserialize, Serialize};

/// Serialization of the extracted snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactFormat {
    /// `-- Table:` comment blocks with one statement each
    #[default]
    Sql,
    /// JSON array of `{ table_name, statement }`
    Json,
}

/// Builds `CREATE TABLE` statements for one schema
#[derive(Debug, Clone)]
pub struct DdlComposer {
    schema: String,
}

impl DdlComposer {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Merge a table's column fragment and optional constraint fragment
    /// into `CREATE TABLE <schema>.<table> (<columns>[, <constraints>]);`
    pub fn compose(&self, table_name: &str, columns: &str, constraints: Option<&str>) -> TableDdl {
        let body: Vec<&str> = [Some(columns), constraints]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        TableDdl {
            table_name: table_name.to_string(),
            statement: format!(
                "CREATE TABLE {}.{} ({});",
                quote_ident(&self.schema),
                quote_ident(table_name),
                body.join(", ")
            ),
        }
    }
}

/// Render statements as comment-headed blocks, each followed by a blank line
pub fn render_blocks(tables: &[TableDdl]) -> String {
    tables
        .iter()
        .map(|t| format!("-- Table: {}\n{}\n\n", t.table_name, t.statement))
        .collect()
}

/// Render the full artifact in the requested format
pub fn render_artifact(tables: &[TableDdl], format: ArtifactFormat) -> DdlResult<String> {
    match format {
        ArtifactFormat::Sql => Ok(render_blocks(tables)),
        ArtifactFormat::Json => {
            let mut json = serde_json::to_string_pretty(tables)?;
            json.push('\n');
            Ok(json)
        }
    }
}

// Constraint aggregation: groups constraint column rows into definitions
pub mod render;


pub use render::constraint_fragment;

use crate::types::{
    ConstraintColumnRow, ConstraintDefinition, ConstraintKind, ForeignKeyTarget, TableName,
};
use std::collections::BTreeMap;
use tracing::warn;

const PRIMARY_KEY: &str = "PRIMARY KEY";
const FOREIGN_KEY: &str = "FOREIGN KEY";
const UNIQUE: &str = "UNIQUE";

impl ConstraintKind {
    /// Rank used to order constraints within a table: primary key first,
    /// then unique, then foreign keys, then everything else.
    fn rank(&self) -> u8 {
        match self {
            ConstraintKind::PrimaryKey => 0,
            ConstraintKind::Unique => 1,
            ConstraintKind::ForeignKey(_) => 2,
            ConstraintKind::Other(_) => 3,
        }
    }
}

/// Group constraint rows by table, then by constraint name.
///
/// Each `(table, constraint_name)` pair yields exactly one definition, so two
/// constraints of the same kind on one table stay separate. Key and
/// referenced columns are ordered by the constraint's own ordinal.
pub fn aggregate_constraints(
    rows: Vec<ConstraintColumnRow>,
) -> BTreeMap<TableName, Vec<ConstraintDefinition>> {
    let mut grouped: BTreeMap<TableName, BTreeMap<String, Vec<ConstraintColumnRow>>> =
        BTreeMap::new();

    for row in rows {
        grouped
            .entry(row.table_name.clone())
            .or_default()
            .entry(row.constraint_name.clone())
            .or_default()
            .push(row);
    }

    grouped
        .into_iter()
        .map(|(table, constraints)| {
            let mut definitions: Vec<ConstraintDefinition> = constraints
                .into_iter()
                .map(|(name, rows)| build_definition(&table, name, rows))
                .collect();
            definitions.sort_by(|a, b| {
                a.kind
                    .rank()
                    .cmp(&b.kind.rank())
                    .then_with(|| a.name.cmp(&b.name))
            });
            (table, definitions)
        })
        .collect()
}

fn build_definition(
    table: &str,
    name: String,
    mut rows: Vec<ConstraintColumnRow>,
) -> ConstraintDefinition {
    rows.sort_by(|a, b| {
        a.ordinal_position
            .cmp(&b.ordinal_position)
            .then_with(|| a.column_name.cmp(&b.column_name))
    });
    rows.dedup();

    let constraint_type = rows
        .first()
        .map(|row| row.constraint_type.clone())
        .unwrap_or_default();
    let key_columns = rows.iter().map(|row| row.column_name.clone()).collect();

    let kind = match constraint_type.as_str() {
        PRIMARY_KEY => ConstraintKind::PrimaryKey,
        UNIQUE => ConstraintKind::Unique,
        FOREIGN_KEY => match foreign_key_target(&rows) {
            Some(target) => ConstraintKind::ForeignKey(target),
            None => {
                warn!(
                    table = %table,
                    constraint = %name,
                    "Foreign key target is not visible in the catalog, skipping constraint"
                );
                ConstraintKind::Other(constraint_type)
            }
        },
        _ => ConstraintKind::Other(constraint_type),
    };

    ConstraintDefinition {
        name,
        kind,
        key_columns,
    }
}

/// Referenced table and columns, present only when every key column has a
/// visible counterpart in one referenced table
fn foreign_key_target(rows: &[ConstraintColumnRow]) -> Option<ForeignKeyTarget> {
    let table = rows.first()?.foreign_table_name.clone()?;
    let mut columns = Vec::with_capacity(rows.len());

    for row in rows {
        if row.foreign_table_name.as_deref() != Some(table.as_str()) {
            return None;
        }
        columns.push(row.foreign_column_name.clone()?);
    }

    Some(ForeignKeyTarget { table, columns })
}

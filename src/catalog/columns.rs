use crate::types::{ColumnDefinition, ColumnRow, TableName};
use std::collections::BTreeMap;

/// Render one column as `name type[(len)][ DEFAULT expr][ NOT NULL]`
pub fn format_column(column: &ColumnDefinition) -> String {
    let mut out = format!("{} {}", column.name, column.data_type);

    if let Some(max_length) = column.max_length {
        out.push_str(&format!("({})", max_length));
    }
    if let Some(default) = &column.default_expression {
        out.push_str(" DEFAULT ");
        out.push_str(default);
    }
    if !column.nullable {
        out.push_str(" NOT NULL");
    }

    out
}

/// Group column rows by table and join each table's columns in ordinal order
pub fn column_fragments(rows: Vec<ColumnRow>) -> BTreeMap<TableName, String> {
    let mut by_table: BTreeMap<TableName, Vec<ColumnDefinition>> = BTreeMap::new();
    for row in rows {
        by_table.entry(row.table_name).or_default().push(row.column);
    }

    by_table
        .into_iter()
        .map(|(table, mut columns)| {
            // arrival order carries no meaning
            columns.sort_by(|a, b| {
                a.ordinal_position
                    .cmp(&b.ordinal_position)
                    .then_with(|| a.name.cmp(&b.name))
            });
            let fragment = columns
                .iter()
                .map(format_column)
                .collect::<Vec<_>>()
                .join(", ");
            (table, fragment)
        })
        .collect()
}

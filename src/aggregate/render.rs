use crate::types::{ConstraintDefinition, ConstraintKind};

impl ConstraintDefinition {
    /// Render as a table constraint clause.
    ///
    /// Kinds that are not reconstructed render as `None` and are left out
    /// of the statement.
    pub fn render(&self) -> Option<String> {
        let keys = self.key_columns.join(", ");

        match &self.kind {
            ConstraintKind::PrimaryKey => {
                Some(format!("CONSTRAINT {} PRIMARY KEY ({})", self.name, keys))
            }
            ConstraintKind::Unique => Some(format!("CONSTRAINT {} UNIQUE ({})", self.name, keys)),
            ConstraintKind::ForeignKey(target) => Some(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
                self.name,
                keys,
                target.table,
                target.columns.join(", ")
            )),
            ConstraintKind::Other(_) => None,
        }
    }
}

/// Join the renderable constraints of one table with `, `.
///
/// Returns `None` when nothing renders, so the caller can leave out the
/// constraint segment entirely.
pub fn constraint_fragment(constraints: &[ConstraintDefinition]) -> Option<String> {
    let clauses: Vec<String> = constraints.iter().filter_map(|c| c.render()).collect();

    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(", "))
    }
}

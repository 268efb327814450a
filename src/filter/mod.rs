// Table exclusion filter
pub mod glob;


pub use glob::{glob_match, GlobPattern, NameMatcher};

use crate::types::TableName;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Decides which base tables are in scope for extraction
///
/// Exclusion is the only filtering mode: a table is out of scope when any
/// configured matcher accepts its name.
pub struct TableFilter {
    matchers: Vec<Box<dyn NameMatcher>>,
}

/// Result of applying a [`TableFilter`] to a table listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableScope {
    /// Tables to extract, ascending by name
    pub included: Vec<TableName>,
    /// Tables removed by an exclusion pattern, ascending by name
    pub excluded: Vec<TableName>,
}

impl TableScope {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

impl TableFilter {
    /// Build a filter from glob patterns
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let matchers = patterns
            .iter()
            .map(|p| Box::new(GlobPattern::new(p.as_ref())) as Box<dyn NameMatcher>)
            .collect();
        Self { matchers }
    }

    /// Build a filter from arbitrary matchers
    pub fn with_matchers(matchers: Vec<Box<dyn NameMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn patterns(&self) -> Vec<&str> {
        self.matchers.iter().map(|m| m.source()).collect()
    }

    pub fn is_excluded(&self, table_name: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(table_name))
    }

    /// Split a table listing into included and excluded names.
    ///
    /// Duplicates collapse and both halves come back sorted, so the result
    /// does not depend on listing order or pattern order.
    pub fn apply<I, S>(&self, tables: I) -> TableScope
    where
        I: IntoIterator<Item = S>,
        S: Into<TableName>,
    {
        let mut included = BTreeSet::new();
        let mut excluded = BTreeSet::new();

        for table in tables {
            let table = table.into();
            if self.is_excluded(&table) {
                debug!(table = %table, "Excluding table");
                excluded.insert(table);
            } else {
                included.insert(table);
            }
        }

        TableScope {
            included: included.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for TableFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableFilter")
            .field("patterns", &self.patterns())
            .finish()
    }
}

use super::*;
use crate::catalog::StaticCatalog;
use crate::types::{ColumnDefinition, ColumnRow, ConstraintColumnRow};
use std::cell::RefCell;

/// Sink that keeps every artifact in memory
#[derive(Default)]
struct RecordingSink {
    writes: RefCell<Vec<String>>,
}

impl ArtifactSink for RecordingSink {
    fn write_artifact(&self, content: &str) -> DdlResult<()> {
        self.writes.borrow_mut().push(content.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Catalog whose metadata query always fails
struct FailingCatalog;

impl CatalogSource for FailingCatalog {
    async fn list_base_tables(&self) -> DdlResult<Vec<TableName>> {
        Ok(vec!["orders".to_string()])
    }

    async fn fetch_metadata(&self, _tables: &[TableName]) -> DdlResult<CatalogMetadata> {
        Err(DdlError::Query {
            message: "permission denied for table orders".to_string(),
            detail: Some("role lacks SELECT".to_string()),
        })
    }
}

fn column(table: &str, name: &str, data_type: &str, ordinal: i32, nullable: bool) -> ColumnRow {
    ColumnRow {
        table_name: table.to_string(),
        column: ColumnDefinition {
            name: name.to_string(),
            data_type: data_type.to_string(),
            max_length: None,
            default_expression: None,
            nullable,
            ordinal_position: ordinal,
        },
    }
}

fn key(
    table: &str,
    constraint: &str,
    kind: &str,
    column: &str,
    ordinal: i32,
) -> ConstraintColumnRow {
    ConstraintColumnRow {
        table_name: table.to_string(),
        constraint_name: constraint.to_string(),
        constraint_type: kind.to_string(),
        column_name: column.to_string(),
        ordinal_position: ordinal,
        foreign_table_name: None,
        foreign_column_name: None,
    }
}

/// Catalog from the usage example, rows deliberately out of order
fn example_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_table("users")
        .with_table("checkpoint_a")
        .with_table("orders")
        .with_column(column("users", "email", "text", 2, false))
        .with_column(column("orders", "user_id", "integer", 2, true))
        .with_column(column("checkpoint_a", "blob", "bytea", 1, true))
        .with_column(column("users", "id", "integer", 1, false))
        .with_column(column("orders", "id", "integer", 1, false))
        .with_constraint(key("orders", "orders_pkey", "PRIMARY KEY", "id", 1))
        .with_constraint(key("users", "users_pkey", "PRIMARY KEY", "id", 1))
}

fn extractor(catalog: StaticCatalog) -> DdlExtractor<StaticCatalog> {
    DdlExtractor::new(catalog, TableFilter::new(&["checkpoint*"]), DdlComposer::new("public"))
}

const EXAMPLE_ARTIFACT: &str = "-- Table: orders\n\
CREATE TABLE public.orders (id integer NOT NULL, user_id integer, CONSTRAINT orders_pkey PRIMARY KEY (id));\n\
\n\
-- Table: users\n\
CREATE TABLE public.users (id integer NOT NULL, email text NOT NULL, CONSTRAINT users_pkey PRIMARY KEY (id));\n\
\n";

#[cfg(test)]
mod extract_tests {
    use super::*;

    #[tokio::test]
    async fn test_example_scenario() {
        let extraction = extractor(example_catalog()).extract().await.unwrap();

        let Extraction::Snapshot(snapshot) = extraction else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.scope.included, vec!["orders", "users"]);
        assert_eq!(snapshot.scope.excluded, vec!["checkpoint_a"]);
        assert_eq!(snapshot.render(ArtifactFormat::Sql).unwrap(), EXAMPLE_ARTIFACT);
    }

    #[tokio::test]
    async fn test_empty_scope_short_circuits() {
        let catalog = StaticCatalog::new()
            .with_table("checkpoint_a")
            .with_table("checkpoint_b");

        let extraction = extractor(catalog).extract().await.unwrap();
        assert!(matches!(
            extraction,
            Extraction::EmptyScope(ref scope) if scope.excluded.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_no_tables_at_all_is_empty_scope() {
        let extraction = extractor(StaticCatalog::new()).extract().await.unwrap();
        assert!(matches!(extraction, Extraction::EmptyScope(_)));
    }

    #[tokio::test]
    async fn test_table_without_constraints() {
        let catalog = StaticCatalog::new()
            .with_table("events")
            .with_column(column("events", "payload", "jsonb", 2, true))
            .with_column(column("events", "id", "bigint", 1, false));

        let extraction = extractor(catalog).extract().await.unwrap();
        let Extraction::Snapshot(snapshot) = extraction else {
            panic!("expected a snapshot");
        };
        assert_eq!(
            snapshot.tables[0].statement,
            "CREATE TABLE public.events (id bigint NOT NULL, payload jsonb);"
        );
    }

    #[tokio::test]
    async fn test_only_unrendered_constraints_leave_no_comma() {
        let catalog = StaticCatalog::new()
            .with_table("orders")
            .with_column(column("orders", "total", "numeric", 1, true))
            .with_constraint(key("orders", "orders_total_check", "CHECK", "total", 1));

        let extraction = extractor(catalog).extract().await.unwrap();
        let Extraction::Snapshot(snapshot) = extraction else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.tables[0].statement, "CREATE TABLE public.orders (total numeric);");
    }

    #[tokio::test]
    async fn test_query_error_propagates_with_detail() {
        let extractor = DdlExtractor::new(
            FailingCatalog,
            TableFilter::new::<&str>(&[]),
            DdlComposer::new("public"),
        );
        let sink = RecordingSink::default();

        let err = extractor.run(&sink, ArtifactFormat::Sql).await.unwrap_err();
        assert!(matches!(err, DdlError::Query { .. }));
        assert_eq!(err.detail(), Some("role lacks SELECT"));
        assert!(sink.writes.borrow().is_empty());
    }
}

#[cfg(test)]
mod run_tests {
    use super::*;

    #[tokio::test]
    async fn test_run_writes_one_artifact() {
        let sink = RecordingSink::default();
        let summary = extractor(example_catalog())
            .run(&sink, ArtifactFormat::Sql)
            .await
            .unwrap();

        assert_eq!(sink.writes.borrow().as_slice(), [EXAMPLE_ARTIFACT.to_string()]);
        assert_eq!(summary.tables_listed, 3);
        assert_eq!(summary.tables_excluded, 1);
        assert_eq!(summary.tables_extracted, 2);
        assert_eq!(summary.destination.as_deref(), Some("memory"));
    }

    #[tokio::test]
    async fn test_run_on_empty_scope_writes_nothing() {
        let sink = RecordingSink::default();
        let catalog = StaticCatalog::new().with_table("checkpoint_a");

        let summary = extractor(catalog).run(&sink, ArtifactFormat::Sql).await.unwrap();

        assert!(sink.writes.borrow().is_empty());
        assert_eq!(summary.tables_extracted, 0);
        assert_eq!(summary.destination, None);
    }

    #[tokio::test]
    async fn test_rerun_is_byte_identical() {
        let sink = RecordingSink::default();
        let extractor = extractor(example_catalog());

        extractor.run(&sink, ArtifactFormat::Sql).await.unwrap();
        extractor.run(&sink, ArtifactFormat::Sql).await.unwrap();

        let writes = sink.writes.borrow();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], writes[1]);
    }

    #[tokio::test]
    async fn test_file_sink_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("latest-ddl.sql");
        let sink = FileSink::new(&path);

        extractor(example_catalog())
            .run(&sink, ArtifactFormat::Sql)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), EXAMPLE_ARTIFACT);
        assert_eq!(sink.path(), path.as_path());
    }

    #[tokio::test]
    async fn test_file_sink_not_touched_on_empty_scope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("latest-ddl.sql");
        let sink = FileSink::new(&path);

        extractor(StaticCatalog::new().with_table("checkpoint_a"))
            .run(&sink, ArtifactFormat::Sql)
            .await
            .unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_file_sink_reports_write_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let sink = FileSink::new(blocker.join("latest-ddl.sql"));
        let err = sink.write_artifact("-- nothing\n").unwrap_err();
        assert!(matches!(err, DdlError::ArtifactWrite { .. }));
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_connectivity_error() {
        let err = match Session::connect("postgresql://nobody@127.0.0.1:1/none").await {
            Ok(_) => panic!("nothing listens on port 1"),
            Err(err) => err,
        };

        let DdlError::Connectivity { message, .. } = err else {
            panic!("expected a connectivity error");
        };
        assert!(message.starts_with("connecting to database: "));
    }
}

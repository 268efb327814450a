// Extraction pipeline: list, filter, fetch, compose, emit
pub mod session;
pub mod sink;

#[cfg(test)]
mod tests;

pub use session::Session;
pub use sink::{ArtifactSink, FileSink, StdoutSink};

use crate::aggregate::{aggregate_constraints, constraint_fragment};
use crate::catalog::{column_fragments, CatalogMetadata, CatalogSource, PostgresCatalog};
use crate::config::{ExtractConfig, OutputTarget};
use crate::ddl::{check_statements, render_artifact, ArtifactFormat, DdlComposer};
use crate::error::{DdlError, DdlResult};
use crate::filter::{TableFilter, TableScope};
use crate::types::{TableDdl, TableName};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::GenericClient;
use tracing::{debug, info, warn};

/// Outcome of the catalog pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Every listed table was excluded; nothing is emitted
    EmptyScope(TableScope),
    Snapshot(SchemaSnapshot),
}

/// Rendered statements for every in-scope table, ascending by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub scope: TableScope,
    pub tables: Vec<TableDdl>,
}

impl SchemaSnapshot {
    pub fn render(&self, format: ArtifactFormat) -> DdlResult<String> {
        render_artifact(&self.tables, format)
    }
}

impl Extraction {
    pub fn scope(&self) -> &TableScope {
        match self {
            Extraction::EmptyScope(scope) => scope,
            Extraction::Snapshot(snapshot) => &snapshot.scope,
        }
    }

    /// Hand the snapshot to `sink`. Returns whether an artifact was written;
    /// an empty scope writes nothing.
    pub fn emit<S: ArtifactSink>(&self, sink: &S, format: ArtifactFormat) -> DdlResult<bool> {
        match self {
            Extraction::EmptyScope(_) => {
                info!("No tables to extract, skipping artifact");
                Ok(false)
            }
            Extraction::Snapshot(snapshot) => {
                let content = snapshot.render(format)?;
                sink.write_artifact(&content)?;
                info!(
                    destination = %sink.describe(),
                    tables = snapshot.tables.len(),
                    "DDL snapshot written"
                );
                Ok(true)
            }
        }
    }
}

/// What a run did, logged when it finishes
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub tables_listed: usize,
    pub tables_excluded: usize,
    pub tables_extracted: usize,
    /// Artifact destination, `None` when nothing was written
    pub destination: Option<String>,
}

impl RunSummary {
    fn new(
        started_at: DateTime<Utc>,
        extraction: &Extraction,
        destination: Option<String>,
    ) -> Self {
        let scope = extraction.scope();
        let tables_extracted = match extraction {
            Extraction::EmptyScope(_) => 0,
            Extraction::Snapshot(snapshot) => snapshot.tables.len(),
        };

        Self {
            started_at,
            duration_ms: Utc::now()
                .signed_duration_since(started_at)
                .num_milliseconds()
                .max(0) as u64,
            tables_listed: scope.included.len() + scope.excluded.len(),
            tables_excluded: scope.excluded.len(),
            tables_extracted,
            destination,
        }
    }
}

/// Sequences the catalog reader, table filter, constraint aggregation and
/// DDL composition for one schema
pub struct DdlExtractor<C> {
    catalog: C,
    filter: TableFilter,
    composer: DdlComposer,
    check_statements: bool,
}

impl<C: CatalogSource> DdlExtractor<C> {
    pub fn new(catalog: C, filter: TableFilter, composer: DdlComposer) -> Self {
        Self {
            catalog,
            filter,
            composer,
            check_statements: false,
        }
    }

    /// Parse every rendered statement and log the ones that do not parse
    pub fn with_statement_check(mut self, enabled: bool) -> Self {
        self.check_statements = enabled;
        self
    }

    /// List the base tables and apply the exclusion filter
    pub async fn scope(&self) -> DdlResult<TableScope> {
        let listed = self.catalog.list_base_tables().await?;
        let scope = self.filter.apply(listed);

        debug!(
            included = scope.included.len(),
            excluded = scope.excluded.len(),
            patterns = ?self.filter.patterns(),
            "Resolved table scope"
        );
        Ok(scope)
    }

    /// Run the catalog pass without emitting anything
    pub async fn extract(&self) -> DdlResult<Extraction> {
        let scope = self.scope().await?;

        if scope.is_empty() {
            info!(
                excluded = scope.excluded.len(),
                "No tables left to extract after exclusions"
            );
            return Ok(Extraction::EmptyScope(scope));
        }

        info!(tables = ?scope.included, "Extracting table definitions");
        let metadata = self.catalog.fetch_metadata(&scope.included).await?;
        let tables = self.compose_all(&scope.included, metadata);

        if self.check_statements {
            for issue in check_statements(&tables) {
                warn!(
                    table = %issue.table_name,
                    issue = %issue.message,
                    "Rendered statement does not parse as PostgreSQL DDL"
                );
            }
        }

        Ok(Extraction::Snapshot(SchemaSnapshot { scope, tables }))
    }

    /// Extract and hand the result to `sink`
    pub async fn run<S: ArtifactSink>(
        &self,
        sink: &S,
        format: ArtifactFormat,
    ) -> DdlResult<RunSummary> {
        let started_at = Utc::now();
        let extraction = self.extract().await?;
        let written = extraction.emit(sink, format)?;

        Ok(RunSummary::new(
            started_at,
            &extraction,
            written.then(|| sink.describe()),
        ))
    }

    fn compose_all(&self, tables: &[TableName], metadata: CatalogMetadata) -> Vec<TableDdl> {
        let columns = column_fragments(metadata.columns);
        let constraints = aggregate_constraints(metadata.constraints);

        tables
            .iter()
            .map(|table| {
                let column_fragment = match columns.get(table) {
                    Some(fragment) => fragment.as_str(),
                    None => {
                        warn!(table = %table, "Table has no visible columns");
                        ""
                    }
                };
                let constraint_clause = constraints
                    .get(table)
                    .and_then(|defs| constraint_fragment(defs));

                self.composer
                    .compose(table, column_fragment, constraint_clause.as_deref())
            })
            .collect()
    }
}

/// Resolve the scope only, inside one read-only snapshot
pub async fn preview_scope(config: &ExtractConfig) -> DdlResult<TableScope> {
    config.validate()?;
    let mut session = Session::connect(&config.database_url).await?;
    let result = preview_in_session(&mut session, config).await;
    session.close().await;
    result
}

async fn preview_in_session(
    session: &mut Session,
    config: &ExtractConfig,
) -> DdlResult<TableScope> {
    let snapshot = session.read_snapshot().await?;
    let scope = {
        let extractor = extractor_for(&snapshot, config);
        extractor.scope().await?
    };
    snapshot
        .commit()
        .await
        .map_err(|e| DdlError::from_postgres(e, "closing read-only snapshot"))?;
    Ok(scope)
}

/// Full run against the configured database.
///
/// The connection is acquired once and released on every path, including
/// the empty-scope stop and any failure. The artifact is only emitted after
/// the catalog snapshot has been closed.
pub async fn run_extraction(config: &ExtractConfig) -> DdlResult<RunSummary> {
    config.validate()?;
    let started_at = Utc::now();

    let mut session = Session::connect(&config.database_url).await?;
    let extraction = extract_in_session(&mut session, config).await;
    session.close().await;
    let extraction = extraction?;

    let destination = match &config.output {
        OutputTarget::File(path) => {
            let sink = FileSink::new(path);
            extraction.emit(&sink, config.format)?.then(|| sink.describe())
        }
        OutputTarget::Stdout => {
            let sink = StdoutSink;
            extraction.emit(&sink, config.format)?.then(|| sink.describe())
        }
    };

    Ok(RunSummary::new(started_at, &extraction, destination))
}

async fn extract_in_session(
    session: &mut Session,
    config: &ExtractConfig,
) -> DdlResult<Extraction> {
    let snapshot = session.read_snapshot().await?;
    let extraction = {
        let extractor = extractor_for(&snapshot, config);
        extractor.extract().await?
    };
    snapshot
        .commit()
        .await
        .map_err(|e| DdlError::from_postgres(e, "closing read-only snapshot"))?;
    Ok(extraction)
}

fn extractor_for<'a, C>(
    snapshot: &'a C,
    config: &ExtractConfig,
) -> DdlExtractor<PostgresCatalog<'a, C>>
where
    C: GenericClient + Sync,
{
    DdlExtractor::new(
        PostgresCatalog::new(snapshot, config.schema.clone()),
        TableFilter::new(&config.exclude_patterns),
        DdlComposer::new(config.schema.clone()),
    )
    .with_statement_check(config.check_statements)
}

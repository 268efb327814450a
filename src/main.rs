use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use catalog_ddl::config::{self, ExtractConfig, OutputTarget};
use catalog_ddl::ddl::ArtifactFormat;
use catalog_ddl::error::{DdlError, DdlResult};
use catalog_ddl::filter::TableScope;
use catalog_ddl::pipeline;

#[derive(Parser)]
#[command(name = "catalog-ddl")]
#[command(about = "Reconstruct CREATE TABLE statements from PostgreSQL catalog metadata")]
#[command(version)]
#[command(long_about = "catalog-ddl reads column and constraint metadata from a PostgreSQL \
catalog and writes an approximate CREATE TABLE statement for every base table in a schema. \
It is a read-only point-in-time snapshot, not a migration tool: indexes, triggers, views, \
check constraints and sequences are not reconstructed.")]
#[command(after_help = "EXAMPLES:
    # Write docs/latest-ddl.sql using DATABASE_URL from the environment or .env
    catalog-ddl extract

    # Another schema, extra exclusions, printed to stdout
    catalog-ddl extract --schema billing -e 'tmp_*' -e '*_backup' --stdout

    # Preview which tables are in scope
    catalog-ddl tables --format json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Set log level explicitly
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,
}

/// Threshold for log events; fatal errors are logged at `error`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl Cli {
    /// `--log-level` wins over `--verbose`; the default is `info`
    fn default_log_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }
}

/// Connection and scope options shared by every command
#[derive(Args, Debug)]
struct CatalogArgs {
    /// PostgreSQL URL or key=value connection string (falls back to
    /// SUPABASE_POSTGRES_URL)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, value_name = "URL")]
    database_url: Option<String>,

    /// Schema to introspect
    #[arg(long, default_value = config::DEFAULT_SCHEMA)]
    schema: String,

    /// Glob pattern of tables to exclude, may be repeated
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Do not apply the built-in exclusions (checkpoint*)
    #[arg(long)]
    no_default_excludes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract CREATE TABLE statements into a snapshot file
    Extract {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output file path
        #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Print the snapshot to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,

        /// Snapshot format
        #[arg(long, value_enum, default_value = "sql")]
        format: SnapshotFormat,

        /// Parse every statement and warn about ones that are not valid DDL
        #[arg(long)]
        check: bool,
    },

    /// List in-scope and excluded tables without extracting anything
    Tables {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Output format for the listing
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SnapshotFormat {
    Sql,
    Json,
}

impl From<SnapshotFormat> for ArtifactFormat {
    fn from(format: SnapshotFormat) -> Self {
        match format {
            SnapshotFormat::Sql => ArtifactFormat::Sql,
            SnapshotFormat::Json => ArtifactFormat::Json,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env has to be loaded before clap reads DATABASE_URL
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    info!("Starting catalog-ddl v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Commands::Extract {
            catalog,
            output,
            stdout,
            format,
            check,
        } => {
            let target = if stdout {
                OutputTarget::Stdout
            } else {
                OutputTarget::File(output)
            };
            execute_extract(catalog, target, format.into(), check).await
        }
        Commands::Tables { catalog, format } => execute_tables(catalog, format).await,
    };

    if let Err(e) = outcome {
        report_failure(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Build a validated configuration from the shared arguments
fn build_config(args: CatalogArgs) -> DdlResult<ExtractConfig> {
    let database_url = config::resolve_database_url(args.database_url)?;

    let mut config = ExtractConfig::new(database_url);
    config.schema = args.schema;
    if args.no_default_excludes {
        config.exclude_patterns.clear();
    }
    config.exclude_patterns.extend(args.exclude);

    config.validate()?;
    Ok(config)
}

async fn execute_extract(
    args: CatalogArgs,
    output: OutputTarget,
    format: ArtifactFormat,
    check: bool,
) -> DdlResult<()> {
    let mut config = build_config(args)?;
    config.output = output;
    config.format = format;
    config.check_statements = check;

    info!(
        schema = %config.schema,
        exclude = ?config.exclude_patterns,
        format = ?config.format,
        "Extracting DDL snapshot"
    );

    let summary = pipeline::run_extraction(&config).await?;

    info!(
        tables_listed = summary.tables_listed,
        tables_excluded = summary.tables_excluded,
        tables_extracted = summary.tables_extracted,
        duration_ms = summary.duration_ms,
        destination = summary.destination.as_deref().unwrap_or("none"),
        "Extraction finished"
    );
    Ok(())
}

async fn execute_tables(args: CatalogArgs, format: OutputFormat) -> DdlResult<()> {
    let config = build_config(args)?;
    let scope = pipeline::preview_scope(&config).await?;

    match format {
        OutputFormat::Text => print!("{}", format_scope(&scope)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scope)?),
    }
    Ok(())
}

fn format_scope(scope: &TableScope) -> String {
    let mut out = format!("In scope ({}):\n", scope.included.len());
    for table in &scope.included {
        out.push_str(&format!("  {}\n", table));
    }
    out.push_str(&format!("Excluded ({}):\n", scope.excluded.len()));
    for table in &scope.excluded {
        out.push_str(&format!("  {}\n", table));
    }
    out
}

fn report_failure(err: &DdlError) {
    match err.detail() {
        Some(detail) => error!(error = %err, detail = detail, "Extraction failed"),
        None => error!(error = %err, "Extraction failed"),
    }
}

/// Initialize logging based on CLI configuration.
///
/// Logs go to stderr so `extract --stdout` output stays clean. `RUST_LOG`
/// overrides the level flags when set.
fn initialize_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.default_log_filter().into())
        .from_env_lossy();

    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(cli.verbose)
            .with_line_number(cli.verbose)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(cli.verbose)
            .with_line_number(cli.verbose)
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Log writer that appends to a shared buffer
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || CapturedLogs(writer.clone()))
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "catalog-ddl",
            "extract",
            "--database-url",
            "postgresql://localhost/app",
        ])
        .unwrap();

        let Commands::Extract { catalog, output, stdout, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(catalog.schema, "public");
        assert_eq!(output, PathBuf::from("docs/latest-ddl.sql"));
        assert!(!stdout);
    }

    #[test]
    fn test_exclusions_extend_defaults() {
        let args = CatalogArgs {
            database_url: Some("postgresql://localhost/app".to_string()),
            schema: "public".to_string(),
            exclude: vec!["tmp_*".to_string()],
            no_default_excludes: false,
        };
        let config = build_config(args).unwrap();
        assert_eq!(config.exclude_patterns, vec!["checkpoint*", "tmp_*"]);
    }

    #[test]
    fn test_default_exclusions_can_be_dropped() {
        let args = CatalogArgs {
            database_url: Some("postgresql://localhost/app".to_string()),
            schema: "public".to_string(),
            exclude: vec![],
            no_default_excludes: true,
        };
        assert!(build_config(args).unwrap().exclude_patterns.is_empty());
    }

    #[test]
    fn test_stdout_conflicts_with_output() {
        let parsed = Cli::try_parse_from([
            "catalog-ddl",
            "extract",
            "--database-url",
            "postgresql://localhost/app",
            "--stdout",
            "-o",
            "x.sql",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_scope_listing() {
        let scope = TableScope {
            included: vec!["orders".to_string(), "users".to_string()],
            excluded: vec!["checkpoint_a".to_string()],
        };
        assert_eq!(
            format_scope(&scope),
            "In scope (2):\n  orders\n  users\nExcluded (1):\n  checkpoint_a\n"
        );
    }

    #[test]
    fn test_log_filter_precedence() {
        let quiet = Cli::try_parse_from(["catalog-ddl", "tables"]).unwrap();
        assert_eq!(quiet.default_log_filter(), LevelFilter::INFO);

        let verbose = Cli::try_parse_from(["catalog-ddl", "tables", "-v"]).unwrap();
        assert_eq!(verbose.default_log_filter(), LevelFilter::DEBUG);

        let explicit =
            Cli::try_parse_from(["catalog-ddl", "-v", "--log-level", "warn", "tables"]).unwrap();
        assert_eq!(explicit.log_level, Some(LogLevel::Warn));
        assert_eq!(explicit.default_log_filter(), LevelFilter::WARN);
    }

    #[test]
    fn test_failure_reported_once_with_detail() {
        let err = DdlError::Query {
            message: "permission denied for table orders".to_string(),
            detail: Some("role lacks SELECT".to_string()),
        };

        let logs = capture_logs(|| report_failure(&err));

        assert_eq!(logs.lines().count(), 1);
        assert_eq!(logs.matches("permission denied for table orders").count(), 1);
        assert!(logs.contains("role lacks SELECT"));
    }
}

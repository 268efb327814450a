use crate::ddl::ArtifactFormat;
use crate::error::{DdlError, DdlResult};
use std::path::PathBuf;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_OUTPUT_PATH: &str = "docs/latest-ddl.sql";
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["checkpoint*"];

/// Environment variables consulted for the connection string, in order
pub const DATABASE_URL_VARS: &[&str] = &["DATABASE_URL", "SUPABASE_POSTGRES_URL"];

/// Where the artifact is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

/// Validated settings for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub database_url: String,
    pub schema: String,
    pub exclude_patterns: Vec<String>,
    pub output: OutputTarget,
    pub format: ArtifactFormat,
    /// Parse rendered statements and warn about the ones that do not parse
    pub check_statements: bool,
}

impl ExtractConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            output: OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT_PATH)),
            format: ArtifactFormat::Sql,
            check_statements: false,
        }
    }

    pub fn validate(&self) -> DdlResult<()> {
        validate_database_url(&self.database_url)?;

        if self.schema.trim().is_empty() {
            return Err(DdlError::configuration("schema name must not be empty"));
        }
        if let OutputTarget::File(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(DdlError::configuration("output path must not be empty"));
            }
        }

        Ok(())
    }
}

/// Pick the connection string from an explicit value or the environment
pub fn resolve_database_url(explicit: Option<String>) -> DdlResult<String> {
    explicit
        .filter(|url| !url.trim().is_empty())
        .or_else(|| {
            DATABASE_URL_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        })
        .ok_or_else(|| {
            DdlError::configuration(format!(
                "no database URL given; pass --database-url or set one of {}",
                DATABASE_URL_VARS.join(", ")
            ))
        })
}

/// Accept anything `tokio-postgres` can connect with: a `postgres://` or
/// `postgresql://` URL, or a `key=value` string like `host=db dbname=app`
pub fn validate_database_url(url: &str) -> DdlResult<()> {
    if url.trim().is_empty() {
        return Err(DdlError::configuration("database connection string is empty"));
    }

    url.parse::<tokio_postgres::Config>().map(|_| ()).map_err(|e| {
        DdlError::configuration(format!("invalid PostgreSQL connection string: {}", e))
    })
}

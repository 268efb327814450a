use std::path::Path;
use thiserror::Error;

/// Main error type for catalog introspection and DDL extraction
#[derive(Error, Debug)]
pub enum DdlError {
    #[error("Connectivity error: {message}")]
    Connectivity {
        message: String,
        detail: Option<String>,
    },

    #[error("Query error: {message}")]
    Query {
        message: String,
        detail: Option<String>,
    },

    #[error("Artifact write error: {message}")]
    ArtifactWrite {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DdlResult<T> = Result<T, DdlError>;

impl DdlError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn artifact_write(path: &Path, source: std::io::Error) -> Self {
        Self::ArtifactWrite {
            message: format!("cannot write {}", path.display()),
            source,
        }
    }

    /// Reclassify a query failure as a connectivity failure, for errors
    /// raised before any statement ran
    pub fn into_connectivity(self) -> Self {
        match self {
            Self::Query { message, detail } => Self::Connectivity { message, detail },
            other => other,
        }
    }

    /// Classify a driver error raised while running `context`.
    ///
    /// A closed connection is a connectivity failure; anything else the
    /// server rejected is a query failure. The server's DETAIL field, when
    /// present, is kept so it can be logged next to the message.
    pub fn from_postgres(err: tokio_postgres::Error, context: &str) -> Self {
        let detail = err
            .as_db_error()
            .and_then(|db| db.detail().map(str::to_string));
        let message = format!("{}: {}", context, err);

        if err.is_closed() {
            Self::Connectivity { message, detail }
        } else {
            Self::Query { message, detail }
        }
    }

    /// Structured detail reported alongside the short message, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Connectivity { detail, .. } | Self::Query { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_only_for_database_errors() {
        let err = DdlError::Query {
            message: "relation missing".to_string(),
            detail: Some("Key (id)=(1) is not present".to_string()),
        };
        assert_eq!(err.detail(), Some("Key (id)=(1) is not present"));
        assert_eq!(DdlError::configuration("bad url").detail(), None);
    }

    #[test]
    fn test_artifact_write_message_names_path() {
        let err = DdlError::artifact_write(
            Path::new("docs/latest-ddl.sql"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Artifact write error: cannot write docs/latest-ddl.sql");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_into_connectivity_keeps_detail() {
        let err = DdlError::Query {
            message: "connecting to database: password authentication failed".to_string(),
            detail: Some("role app".to_string()),
        }
        .into_connectivity();

        assert!(matches!(err, DdlError::Connectivity { .. }));
        assert_eq!(err.detail(), Some("role app"));
        assert!(matches!(
            DdlError::configuration("bad url").into_connectivity(),
            DdlError::Configuration { .. }
        ));
    }
}

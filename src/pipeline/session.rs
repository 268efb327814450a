use crate::error::{DdlError, DdlResult};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, IsolationLevel, NoTls, Transaction};
use tracing::{debug, error, warn};

/// The run's single database connection
///
/// The connection driver runs on a spawned task owned by the session.
/// [`Session::close`] drops the client and waits for the driver to finish;
/// dropping the session without closing still ends the connection.
pub struct Session {
    client: Client,
    driver: JoinHandle<()>,
}

impl Session {
    pub async fn connect(database_url: &str) -> DdlResult<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| {
                DdlError::from_postgres(e, "connecting to database").into_connectivity()
            })?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection error");
            }
        });

        debug!("Database connection established");
        Ok(Self { client, driver })
    }

    /// Start a read-only REPEATABLE READ transaction so every catalog query
    /// of the run sees the same state.
    pub async fn read_snapshot(&mut self) -> DdlResult<Transaction<'_>> {
        self.client
            .build_transaction()
            .isolation_level(IsolationLevel::RepeatableRead)
            .read_only(true)
            .start()
            .await
            .map_err(|e| DdlError::from_postgres(e, "starting read-only snapshot"))
    }

    pub async fn close(self) {
        drop(self.client);
        if let Err(e) = self.driver.await {
            warn!(error = %e, "Connection driver did not shut down cleanly");
        }
        debug!("Database connection released");
    }
}

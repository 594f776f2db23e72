// Connection manager
// Owns one engine handle: opened at construction, reused for every query,
// released exactly once at disconnect

use std::sync::Arc;

use uuid::Uuid;

use crate::config::{ConnectOptions, ConnectionConfig};
use crate::credentials::{CredentialSource, EnvCredentials};
use crate::error::DatabaseError;
use crate::logging::{self, LogSink};
use crate::query::{ExecSummary, QueryResult};
use crate::registry::DriverRegistry;
use crate::traits::{Connection, DatabaseDriver};

const MAX_LOGGED_SQL: usize = 160;

/// Manages a single database connection: resolves a driver and credentials,
/// opens the handle immediately, executes queries against it, and releases it
/// on [`disconnect`](Self::disconnect).
///
/// One instance, one handle. Operations take `&mut self`, so a single instance
/// cannot be driven concurrently; multiple instances coexist independently and
/// share only the process-wide log sink.
pub struct DatabaseManager {
    config: ConnectionConfig,
    driver: Arc<dyn DatabaseDriver>,
    connection: Option<Box<dyn Connection>>,
    log: Arc<dyn LogSink>,
}

impl DatabaseManager {
    /// Connect with the default driver registry, `SQLUID`/`SQLPWD` credential
    /// fallback, and the process-wide log sink.
    pub async fn connect(options: ConnectOptions) -> Result<Self, DatabaseError> {
        let registry = DriverRegistry::with_defaults();
        let credentials = EnvCredentials::new();
        Self::connect_with(options, &registry, &credentials, logging::default_sink()).await
    }

    /// Connect with explicit collaborators. The seams tests substitute.
    pub async fn connect_with(
        options: ConnectOptions,
        registry: &DriverRegistry,
        credentials: &dyn CredentialSource,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, DatabaseError> {
        let (driver, config) = match resolve(&options, registry, credentials) {
            Ok(resolved) => resolved,
            Err(e) => {
                log.error(&format!(
                    "connection setup for {}/{} failed: {e}",
                    options.server, options.database
                ));
                return Err(e);
            }
        };

        match driver.connect(&config).await {
            Ok(connection) => {
                log.info(&format!(
                    "connected to {} via {}",
                    config.target(),
                    config.driver
                ));
                Ok(Self {
                    config,
                    driver,
                    connection: Some(connection),
                    log,
                })
            }
            Err(e) => {
                log.error(&format!("connection to {} failed: {e}", config.target()));
                Err(e)
            }
        }
    }

    /// Probe a configuration without keeping a manager around.
    pub async fn test_connection(options: ConnectOptions) -> Result<(), DatabaseError> {
        let registry = DriverRegistry::with_defaults();
        let credentials = EnvCredentials::new();
        let (driver, config) = resolve(&options, &registry, &credentials)?;
        driver.test_connection(&config).await
    }

    /// Execute a mutating statement.
    ///
    /// With `commit` the transaction is finalized after execution, on the same
    /// underlying connection; otherwise transaction state is left to the
    /// engine's default mode. The returned [`ExecSummary`] is opaque — it
    /// carries no result rows; use [`query_table`](Self::query_table) for reads.
    ///
    /// Failures are logged and returned; there is no retry and no automatic
    /// rollback beyond what the engine itself does.
    pub async fn run_query(&mut self, sql: &str, commit: bool) -> Result<ExecSummary, DatabaseError> {
        let connection = self.connection.as_deref().ok_or(DatabaseError::NotConnected)?;
        let query_id = Uuid::new_v4();
        self.log
            .info(&format!("query_id={query_id} executing: {}", summarize_sql(sql)));

        match self.driver.execute(connection, sql, commit).await {
            Ok(summary) => {
                self.log.info(&format!(
                    "query_id={query_id} done, {} rows affected",
                    summary.total()
                ));
                Ok(summary)
            }
            Err(e) => {
                self.log.error(&format!(
                    "query_id={query_id} failed on {}: {e}",
                    self.config.target()
                ));
                Err(e)
            }
        }
    }

    /// Execute a read query and materialize the entire result set in memory,
    /// with column names taken from the result metadata.
    pub async fn query_table(&mut self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let connection = self.connection.as_deref().ok_or(DatabaseError::NotConnected)?;
        let query_id = Uuid::new_v4();
        self.log
            .info(&format!("query_id={query_id} fetching: {}", summarize_sql(sql)));

        match self.driver.query(connection, sql).await {
            Ok(result) => {
                self.log.info(&format!(
                    "query_id={query_id} done, {} rows in {} ms",
                    result.row_count, result.execution_time_ms
                ));
                Ok(result)
            }
            Err(e) => {
                self.log.error(&format!(
                    "query_id={query_id} failed on {}: {e}",
                    self.config.target()
                ));
                Err(e)
            }
        }
    }

    /// Release the engine handle. No-op when already disconnected; there is no
    /// way back to Open — build a new manager to reconnect.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            drop(connection);
            self.log
                .info(&format!("disconnected from {}", self.config.target()));
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The resolved, immutable configuration this manager was built from.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The held handle, for collaborators that work on the raw connection
    /// (e.g. bulk table write-back). None once disconnected.
    pub fn connection(&self) -> Option<&dyn Connection> {
        self.connection.as_deref()
    }
}

fn resolve(
    options: &ConnectOptions,
    registry: &DriverRegistry,
    credentials: &dyn CredentialSource,
) -> Result<(Arc<dyn DatabaseDriver>, ConnectionConfig), DatabaseError> {
    let driver = registry.resolve(options.database_type)?;
    let config = ConnectionConfig::resolve(options, driver.driver_name().to_string(), credentials)?;
    Ok((driver, config))
}

/// One-line form of a statement for the log: whitespace collapsed, long text
/// truncated with the original length noted.
fn summarize_sql(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= MAX_LOGGED_SQL {
        return flat;
    }
    let mut cut = MAX_LOGGED_SQL;
    while !flat.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... ({} chars)", &flat[..cut], flat.len())
}

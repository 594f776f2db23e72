// Database driver traits
// The abstraction the registry hands out and the manager drives

use serde::{Deserialize, Serialize};

use crate::config::ConnectionConfig;
use crate::error::DatabaseError;
use crate::query::{ExecSummary, QueryResult};

/// Supported database engines.
///
/// Only SQL Server ships with a driver; resolving any other engine against the
/// default registry fails with [`DatabaseError::DriverNotFound`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    Mssql,
    Postgresql,
    Mysql,
    Sqlite,
}

impl DatabaseType {
    /// Display name for logs and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::Mssql => "Microsoft SQL Server",
            DatabaseType::Postgresql => "PostgreSQL",
            DatabaseType::Mysql => "MySQL",
            DatabaseType::Sqlite => "SQLite",
        }
    }

    /// Default port for the engine.
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseType::Mssql => 1433,
            DatabaseType::Postgresql => 5432,
            DatabaseType::Mysql => 3306,
            DatabaseType::Sqlite => 0, // File-based, no port
        }
    }

    /// Driver-name fragments accepted for this engine, highest priority first.
    /// A registered driver whose name contains one of these fragments can serve
    /// connections for the engine.
    pub fn driver_candidates(&self) -> &'static [&'static str] {
        match self {
            DatabaseType::Mssql => &["SQL Server"],
            DatabaseType::Postgresql => &["PostgreSQL"],
            DatabaseType::Mysql => &["MySQL"],
            DatabaseType::Sqlite => &["SQLite"],
        }
    }
}

/// A live engine handle, owned by exactly one manager instance.
#[async_trait::async_trait]
pub trait Connection: Send + Sync {
    /// Test if the connection is alive.
    async fn is_alive(&self) -> bool;

    /// Allow downcasting for driver-specific operations.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// A database driver: opens connections and executes statements on them.
#[async_trait::async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// The engine this driver serves.
    fn database_type(&self) -> DatabaseType;

    /// Installed-driver name, matched against
    /// [`DatabaseType::driver_candidates`] during resolution.
    fn driver_name(&self) -> &'static str;

    /// Probe a configuration without keeping a connection open.
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<(), DatabaseError>;

    /// Open a live handle from a configuration.
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, DatabaseError>;

    /// Execute a mutating statement. With `commit` the transaction is finalized
    /// on the same underlying connection; otherwise transaction state is left to
    /// the engine's default mode.
    async fn execute(
        &self,
        conn: &dyn Connection,
        sql: &str,
        commit: bool,
    ) -> Result<ExecSummary, DatabaseError>;

    /// Execute a read query and materialize the first result set.
    async fn query(&self, conn: &dyn Connection, sql: &str) -> Result<QueryResult, DatabaseError>;
}

// MS-SQL driver
// Connects with tiberius; the engine handle is a bb8 pool over TDS clients

use std::sync::Arc;
use std::time::Instant;

use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use tiberius::ColumnType;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::config::ConnectionConfig;
use crate::error::DatabaseError;
use crate::query::{CellValue, ColumnInfo, ExecSummary, QueryResult};
use crate::traits::{Connection, DatabaseDriver, DatabaseType};

/// Connection pool over tiberius clients.
pub type MssqlPool = Pool<ConnectionManager>;

/// Issued after a mutating statement when the caller asked for finalization.
/// A no-op under autocommit, a real commit under implicit-transaction modes.
const COMMIT_STATEMENT: &str = "IF @@TRANCOUNT > 0 COMMIT TRANSACTION";

/// The live SQL Server engine handle.
pub struct MssqlConnection {
    pool: Arc<MssqlPool>,
}

impl MssqlConnection {
    /// Direct access to the underlying pool, for collaborators that need the
    /// raw handle (bulk write-back, schema tooling).
    pub fn pool(&self) -> Arc<MssqlPool> {
        Arc::clone(&self.pool)
    }
}

#[async_trait::async_trait]
impl Connection for MssqlConnection {
    async fn is_alive(&self) -> bool {
        self.pool.get().await.is_ok()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// SQL Server driver backed by tiberius.
pub struct MssqlDriver;

impl MssqlDriver {
    pub fn new() -> Self {
        Self
    }

    fn downcast<'a>(conn: &'a dyn Connection) -> Result<&'a MssqlConnection, DatabaseError> {
        conn.as_any()
            .downcast_ref::<MssqlConnection>()
            .ok_or(DatabaseError::InvalidConnection)
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DatabaseDriver for MssqlDriver {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    fn driver_name(&self) -> &'static str {
        "Microsoft SQL Server"
    }

    /// Open a dedicated, non-pooled connection and drop it. Surfaces the
    /// underlying error directly instead of a pool timeout.
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<(), DatabaseError> {
        let client_config = config.to_client_config()?;

        let tcp = tokio::net::TcpStream::connect((config.server.as_str(), config.port))
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(format!("TCP connection failed: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("failed to set TCP_NODELAY: {e}")))?;

        let _client = tiberius::Client::connect(client_config, tcp.compat_write())
            .await
            .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, DatabaseError> {
        // Probe first: a failed handshake reports the real cause, where the
        // pool would only time out.
        self.test_connection(config).await?;

        let manager = ConnectionManager::build(config.to_client_config()?)
            .map_err(|e| DatabaseError::InvalidConfig(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(5)
            .min_idle(Some(1))
            .build(manager)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        Ok(Box::new(MssqlConnection {
            pool: Arc::new(pool),
        }))
    }

    async fn execute(
        &self,
        conn: &dyn Connection,
        sql: &str,
        commit: bool,
    ) -> Result<ExecSummary, DatabaseError> {
        let mssql_conn = Self::downcast(conn)?;

        // One checkout for the statement and its finalization: a COMMIT on a
        // different pooled connection would not see the transaction.
        let mut client = mssql_conn.pool.get().await?;

        let start = Instant::now();
        let result = client
            .execute(sql, &[])
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let rows_affected = result.rows_affected().to_vec();

        if commit {
            client
                .simple_query(COMMIT_STATEMENT)
                .await
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                .into_results()
                .await
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        }

        Ok(ExecSummary::new(
            rows_affected,
            start.elapsed().as_millis() as u64,
        ))
    }

    async fn query(&self, conn: &dyn Connection, sql: &str) -> Result<QueryResult, DatabaseError> {
        let mssql_conn = Self::downcast(conn)?;
        let mut client = mssql_conn.pool.get().await?;

        let start = Instant::now();
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        // Column metadata is available before any row, so empty result sets
        // still come back with named columns.
        let (columns, col_types): (Vec<ColumnInfo>, Vec<ColumnType>) = match stream
            .columns()
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
        {
            Some(cols) => (
                cols.iter().map(ColumnInfo::from).collect(),
                cols.iter().map(|c| c.column_type()).collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        let rows = stream
            .into_first_result()
            .await
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let converted: Vec<Vec<CellValue>> = rows
            .iter()
            .map(|row| {
                (0..col_types.len())
                    .map(|idx| CellValue::from_row(row, idx, &col_types[idx]))
                    .collect()
            })
            .collect();

        Ok(QueryResult::new(
            columns,
            converted,
            start.elapsed().as_millis() as u64,
        ))
    }
}

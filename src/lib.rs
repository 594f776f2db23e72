//! mssql-bridge
//!
//! A thin connection manager for Microsoft SQL Server: resolves a driver,
//! assembles the connection descriptor from explicit or environment-sourced
//! credentials, opens the engine handle up front, and runs statements against
//! it until [`DatabaseManager::disconnect`]. The wire protocol and pooling are
//! delegated to tiberius and bb8.
//!
//! ```no_run
//! use mssql_bridge::{ConnectOptions, DatabaseManager};
//!
//! # async fn example() -> Result<(), mssql_bridge::DatabaseError> {
//! let options = ConnectOptions::new("sales", "db.example.com")
//!     .user("reader")
//!     .password("s3cret");
//! let mut db = DatabaseManager::connect(options).await?;
//!
//! db.run_query("UPDATE orders SET shipped = 1 WHERE id = 42", true).await?;
//! let table = db.query_table("SELECT id, total FROM orders").await?;
//! println!("{} rows", table.row_count);
//!
//! db.disconnect();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod manager;
pub mod query;
pub mod registry;
pub mod traits;

pub use config::{AuthMode, ConnectOptions, ConnectionConfig};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use drivers::{MssqlConnection, MssqlDriver, MssqlPool};
pub use error::DatabaseError;
pub use logging::{FileSink, LogLevel, LogSink, MemorySink, NoopSink, TracingSink};
pub use manager::DatabaseManager;
pub use query::{CellValue, ColumnInfo, ExecSummary, QueryResult};
pub use registry::{resolve_driver, DriverRegistry};
pub use traits::{Connection, DatabaseDriver, DatabaseType};

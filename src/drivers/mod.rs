// Driver implementations

pub mod mssql;

pub use mssql::{MssqlConnection, MssqlDriver, MssqlPool};

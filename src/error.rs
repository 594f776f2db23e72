// Error types shared across the crate

use thiserror::Error;

use crate::traits::DatabaseType;

/// Errors raised by connection management and query execution.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no installed driver matches {0:?}")]
    DriverNotFound(DatabaseType),

    #[error("missing credentials: pass user/password or set the SQLUID and SQLPWD environment variables")]
    MissingCredentials,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("query execution failed: {0}")]
    QueryFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid connection type")]
    InvalidConnection,

    #[error("not connected")]
    NotConnected,

    #[error("password expired; change it with another tool before connecting")]
    PasswordExpired,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tiberius::error::Error> for DatabaseError {
    fn from(err: tiberius::error::Error) -> Self {
        // SQL Server reports an expired login as server error 18488
        if let tiberius::error::Error::Server(e) = &err {
            if e.code() == 18488 {
                return DatabaseError::PasswordExpired;
            }
        }
        DatabaseError::ConnectionFailed(err.to_string())
    }
}

impl<E: std::error::Error + 'static> From<bb8::RunError<E>> for DatabaseError {
    fn from(err: bb8::RunError<E>) -> Self {
        DatabaseError::ConnectionFailed(err.to_string())
    }
}

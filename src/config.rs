// Connection configuration and descriptor assembly

use serde::{Deserialize, Serialize};

use crate::credentials::{resolve_credentials, CredentialSource};
use crate::error::DatabaseError;
use crate::traits::DatabaseType;

/// Inputs for opening a connection.
///
/// `database` and `server` are required; everything else has a usable default.
/// When `trusted_connection` is false and `user`/`password` are not given, they
/// are resolved from the credential source at connect time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub database: String,
    pub server: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub trusted_connection: bool,
    pub database_type: DatabaseType,
    pub trust_certificate: bool,
    pub encrypt: bool,
}

impl ConnectOptions {
    pub fn new(database: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            server: server.into(),
            port: DatabaseType::Mssql.default_port(),
            user: None,
            password: None,
            trusted_connection: false,
            database_type: DatabaseType::Mssql,
            trust_certificate: true,
            encrypt: false,
        }
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn trusted_connection(mut self, trusted: bool) -> Self {
        self.trusted_connection = trusted;
        self
    }

    pub fn validate(&self) -> Result<(), DatabaseError> {
        if self.server.is_empty() {
            return Err(DatabaseError::InvalidConfig("server is required".to_string()));
        }
        if self.database.is_empty() {
            return Err(DatabaseError::InvalidConfig("database name is required".to_string()));
        }
        Ok(())
    }
}

/// How the connection authenticates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthMode {
    /// Authenticate as the OS identity of the calling process.
    Trusted,
    /// SQL Server authentication with explicit credentials.
    SqlServer {
        user: String,
        #[serde(skip_serializing)]
        password: String,
    },
}

/// Resolved, immutable connection configuration.
///
/// Built once at construction time; a manager never mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub auth: AuthMode,
    /// Resolved driver name, as reported by the registry.
    pub driver: String,
    pub trust_certificate: bool,
    pub encrypt: bool,
}

impl ConnectionConfig {
    /// Resolve options into a full configuration.
    ///
    /// Trusted connections carry no credential fields at all. Otherwise explicit
    /// user/password win, then the credential source; if either is still missing
    /// this fails with [`DatabaseError::MissingCredentials`].
    pub fn resolve(
        options: &ConnectOptions,
        driver: String,
        credentials: &dyn CredentialSource,
    ) -> Result<Self, DatabaseError> {
        options.validate()?;

        let auth = if options.trusted_connection {
            AuthMode::Trusted
        } else {
            let (user, password) = resolve_credentials(
                options.user.clone(),
                options.password.clone(),
                credentials,
            )?;
            AuthMode::SqlServer { user, password }
        };

        Ok(Self {
            server: options.server.clone(),
            port: options.port,
            database: options.database.clone(),
            auth,
            driver,
            trust_certificate: options.trust_certificate,
            encrypt: options.encrypt,
        })
    }

    /// Assemble the ADO.NET-style connection descriptor consumed by
    /// `tiberius::Config::from_ado_string`.
    ///
    /// Field order is fixed: server, database, authentication (the integrated
    /// security marker or the user/password pair), certificate trust,
    /// encryption. Values are passed through verbatim.
    pub fn descriptor(&self) -> String {
        let mut descriptor = format!(
            "server=tcp:{},{};database={};",
            self.server, self.port, self.database
        );

        match &self.auth {
            AuthMode::Trusted => descriptor.push_str("IntegratedSecurity=true;"),
            AuthMode::SqlServer { user, password } => {
                descriptor.push_str(&format!("user={};password={};", user, password));
            }
        }

        if self.trust_certificate {
            descriptor.push_str("TrustServerCertificate=true;");
        }
        descriptor.push_str(if self.encrypt { "encrypt=true" } else { "encrypt=false" });

        descriptor
    }

    /// Build the tiberius client configuration from the descriptor.
    pub fn to_client_config(&self) -> Result<tiberius::Config, DatabaseError> {
        tiberius::Config::from_ado_string(&self.descriptor())
            .map_err(|e| DatabaseError::InvalidConfig(e.to_string()))
    }

    /// `server/database` label used in log lines.
    pub fn target(&self) -> String {
        format!("{}/{}", self.server, self.database)
    }
}

// Credential resolution: explicit arguments, then a lookup source, then fail

use crate::error::DatabaseError;

/// Environment variable holding the fallback username.
pub const USER_ENV_VAR: &str = "SQLUID";
/// Environment variable holding the fallback password.
pub const PASSWORD_ENV_VAR: &str = "SQLPWD";

/// Where fallback credentials come from when none are passed explicitly.
pub trait CredentialSource: Send + Sync {
    fn user(&self) -> Option<String>;
    fn password(&self) -> Option<String>;
}

/// Reads credentials from environment variables (`SQLUID`/`SQLPWD` by default).
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    user_var: String,
    password_var: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_vars(USER_ENV_VAR, PASSWORD_ENV_VAR)
    }

    /// Read from custom variable names. Mostly useful in tests.
    pub fn with_vars(user_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            user_var: user_var.into(),
            password_var: password_var.into(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentials {
    fn user(&self) -> Option<String> {
        std::env::var(&self.user_var).ok().filter(|v| !v.is_empty())
    }

    fn password(&self) -> Option<String> {
        std::env::var(&self.password_var).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed credentials, for tests and programmatic wiring.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    user: Option<String>,
    password: Option<String>,
}

impl StaticCredentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
        }
    }

    /// A source that never resolves anything.
    pub fn empty() -> Self {
        Self {
            user: None,
            password: None,
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn user(&self) -> Option<String> {
        self.user.clone()
    }

    fn password(&self) -> Option<String> {
        self.password.clone()
    }
}

/// Resolve a user/password pair: explicit arguments win, then the source.
/// Fails with [`DatabaseError::MissingCredentials`] if either half is missing.
pub fn resolve_credentials(
    user: Option<String>,
    password: Option<String>,
    source: &dyn CredentialSource,
) -> Result<(String, String), DatabaseError> {
    let user = user.or_else(|| source.user());
    let password = password.or_else(|| source.password());

    match (user, password) {
        (Some(user), Some(password)) => Ok((user, password)),
        _ => Err(DatabaseError::MissingCredentials),
    }
}

// Driver registry
// Registered drivers are the "installed drivers" list; resolution matches
// per-engine candidate name fragments against it, first match in priority
// order wins.

use std::sync::Arc;

use crate::drivers::MssqlDriver;
use crate::error::DatabaseError;
use crate::traits::{DatabaseDriver, DatabaseType};

/// Pure resolution helper: the first priority fragment contained in any
/// installed name wins; ties within one fragment go to installation order.
pub fn resolve_driver<'a>(installed: &'a [String], priority: &[&str]) -> Option<&'a str> {
    priority.iter().find_map(|fragment| {
        installed
            .iter()
            .find(|name| name.contains(fragment))
            .map(String::as_str)
    })
}

/// Registry of available database drivers, in registration order.
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Registry with the drivers this crate ships: the tiberius-backed
    /// SQL Server driver.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MssqlDriver::new()));
        registry
    }

    /// Register a driver.
    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        self.drivers.push(driver);
    }

    /// Remove all drivers whose name contains `fragment`.
    pub fn unregister(&mut self, fragment: &str) {
        self.drivers.retain(|d| !d.driver_name().contains(fragment));
    }

    /// Names of all registered drivers, in registration order.
    pub fn installed_drivers(&self) -> Vec<String> {
        self.drivers
            .iter()
            .map(|d| d.driver_name().to_string())
            .collect()
    }

    pub fn has_driver(&self, db_type: DatabaseType) -> bool {
        self.resolve(db_type).is_ok()
    }

    /// Resolve the driver serving `db_type`, or fail with
    /// [`DatabaseError::DriverNotFound`].
    pub fn resolve(&self, db_type: DatabaseType) -> Result<Arc<dyn DatabaseDriver>, DatabaseError> {
        let installed = self.installed_drivers();
        let name = resolve_driver(&installed, db_type.driver_candidates())
            .ok_or(DatabaseError::DriverNotFound(db_type))?;

        self.drivers
            .iter()
            .find(|d| d.driver_name() == name)
            .cloned()
            .ok_or(DatabaseError::DriverNotFound(db_type))
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::query::{ExecSummary, QueryResult};
    use crate::traits::Connection;

    // Mock driver for testing resolution against fabricated installed names
    struct MockDriver {
        name: &'static str,
        db_type: DatabaseType,
    }

    #[async_trait::async_trait]
    impl DatabaseDriver for MockDriver {
        fn database_type(&self) -> DatabaseType {
            self.db_type
        }

        fn driver_name(&self) -> &'static str {
            self.name
        }

        async fn test_connection(&self, _config: &ConnectionConfig) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn connect(
            &self,
            _config: &ConnectionConfig,
        ) -> Result<Box<dyn Connection>, DatabaseError> {
            Err(DatabaseError::ConnectionFailed("mock".to_string()))
        }

        async fn execute(
            &self,
            _conn: &dyn Connection,
            _sql: &str,
            _commit: bool,
        ) -> Result<ExecSummary, DatabaseError> {
            Err(DatabaseError::QueryFailed("mock".to_string()))
        }

        async fn query(
            &self,
            _conn: &dyn Connection,
            _sql: &str,
        ) -> Result<QueryResult, DatabaseError> {
            Err(DatabaseError::QueryFailed("mock".to_string()))
        }
    }

    fn mock(name: &'static str) -> Arc<dyn DatabaseDriver> {
        Arc::new(MockDriver {
            name,
            db_type: DatabaseType::Mssql,
        })
    }

    #[test]
    fn resolve_driver_picks_first_priority_fragment() {
        let installed = vec![
            "SQL Server".to_string(),
            "ODBC Driver 13 for SQL Server".to_string(),
            "ODBC Driver 17 for SQL Server".to_string(),
        ];
        let priority = ["ODBC Driver 17", "ODBC Driver 13", "SQL Server"];

        assert_eq!(
            resolve_driver(&installed, &priority),
            Some("ODBC Driver 17 for SQL Server")
        );
    }

    #[test]
    fn resolve_driver_is_deterministic() {
        let installed = vec![
            "ODBC Driver 13 for SQL Server".to_string(),
            "ODBC Driver 17 for SQL Server".to_string(),
        ];
        let priority = ["SQL Server"];

        // Same inputs, same pick, every time; ties go to installation order.
        for _ in 0..10 {
            assert_eq!(
                resolve_driver(&installed, &priority),
                Some("ODBC Driver 13 for SQL Server")
            );
        }
    }

    #[test]
    fn resolve_driver_without_match_is_none() {
        let installed = vec!["PostgreSQL Unicode".to_string()];
        assert_eq!(resolve_driver(&installed, &["SQL Server"]), None);
        assert_eq!(resolve_driver(&[], &["SQL Server"]), None);
    }

    #[test]
    fn registry_resolves_registered_driver() {
        let mut registry = DriverRegistry::new();
        registry.register(mock("ODBC Driver 17 for SQL Server"));

        assert!(registry.has_driver(DatabaseType::Mssql));
        let driver = registry.resolve(DatabaseType::Mssql).unwrap();
        assert_eq!(driver.driver_name(), "ODBC Driver 17 for SQL Server");
    }

    #[test]
    fn registry_without_match_fails_with_driver_not_found() {
        let mut registry = DriverRegistry::new();
        registry.register(mock("ODBC Driver 17 for SQL Server"));

        let err = registry.resolve(DatabaseType::Postgresql).err().unwrap();
        assert!(matches!(
            err,
            DatabaseError::DriverNotFound(DatabaseType::Postgresql)
        ));
    }

    #[test]
    fn unregister_removes_driver() {
        let mut registry = DriverRegistry::new();
        registry.register(mock("ODBC Driver 17 for SQL Server"));
        assert!(registry.has_driver(DatabaseType::Mssql));

        registry.unregister("ODBC Driver 17");
        assert!(!registry.has_driver(DatabaseType::Mssql));
    }

    #[test]
    fn default_registry_serves_mssql_only() {
        let registry = DriverRegistry::with_defaults();
        assert!(registry.has_driver(DatabaseType::Mssql));
        assert!(!registry.has_driver(DatabaseType::Postgresql));
        assert_eq!(registry.installed_drivers().len(), 1);
    }
}
